//! # Symbol Span Buffer

use crate::types::{Pair, TokenId};

/// The symbol ids of one distinct corpus span.
///
/// Iteratively rewritten during BPE training.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolSpanBuf {
    symbols: Vec<TokenId>,
}

impl<S: AsRef<[TokenId]>> From<S> for SymbolSpanBuf {
    fn from(symbols: S) -> Self {
        Self {
            symbols: symbols.as_ref().to_vec(),
        }
    }
}

impl SymbolSpanBuf {
    const DEC: i32 = -1;
    const INC: i32 = 1;

    /// View the symbols.
    pub fn symbols(&self) -> &[TokenId] {
        &self.symbols
    }

    /// The number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Is the span empty?
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over adjacent pairs, left to right.
    pub fn pairs(&self) -> impl Iterator<Item = Pair<TokenId>> + '_ {
        self.symbols.windows(2).map(|w| (w[0], w[1]))
    }

    /// Merge all non-overlapping occurrences of `pair`, left to right.
    ///
    /// `on_delta(pair, delta)` is called for every adjacent pair removed
    /// (`-1`) or created (`+1`), in left-to-right order.
    pub fn merge_pair_cb<F>(
        &mut self,
        pair: Pair<TokenId>,
        replacement: TokenId,
        on_delta: &mut F,
    ) where
        F: FnMut(Pair<TokenId>, i32),
    {
        let (a, b) = pair;
        let n = self.symbols.len();
        if n < 2 {
            return;
        }

        let mut merged: Vec<TokenId> = Vec::with_capacity(n);
        let mut i = 0;
        while i < n {
            let current = self.symbols[i];

            if i + 1 < n && (current, self.symbols[i + 1]) == pair {
                if let Some(&x) = merged.last() {
                    on_delta((x, a), Self::DEC);
                    on_delta((x, replacement), Self::INC);
                }

                on_delta(pair, Self::DEC);

                if i + 2 < n {
                    let y = self.symbols[i + 2];
                    on_delta((b, y), Self::DEC);
                    on_delta((replacement, y), Self::INC);
                }

                merged.push(replacement);
                i += 2;
            } else {
                merged.push(current);
                i += 1;
            }
        }

        self.symbols = merged;
    }

    /// Merge all non-overlapping occurrences of `pair`.
    ///
    /// ## Returns
    /// The `(pair, delta)` list, see [`SymbolSpanBuf::merge_pair_cb`].
    pub fn merge_pair(
        &mut self,
        pair: Pair<TokenId>,
        replacement: TokenId,
    ) -> Vec<(Pair<TokenId>, i32)> {
        let mut deltas = Vec::with_capacity(6);
        self.merge_pair_cb(pair, replacement, &mut |p, d| deltas.push((p, d)));
        deltas
    }
}
