//! # Span Encoder Trait

use core::ops::Range;

use crate::{
    types::{Pair, TokenId},
    vocab::{MergeTable, MergeTarget},
};

/// A symbol of a span being encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The vocabulary id; `None` for symbols outside the vocabulary.
    ///
    /// Unknown symbols never take part in a merge.
    pub id: Option<TokenId>,

    /// The start byte offset, local to the span.
    pub start: usize,

    /// The end byte offset, local to the span.
    pub end: usize,
}

impl Symbol {
    /// The local byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Look up the merge for two adjacent symbols.
pub fn lookup_symbols(
    merges: &MergeTable,
    left: &Symbol,
    right: &Symbol,
) -> Option<MergeTarget> {
    let pair: Pair<TokenId> = (left.id?, right.id?);
    merges.lookup(pair)
}

/// A trait for applying merges to the symbols of a span.
///
/// Implementations must agree exactly: while any adjacent pair has a merge,
/// the pair with the lowest `(rank, position)` is merged.
pub trait SpanEncoder: Send {
    /// Merge `symbols` in place until no adjacent pair has a merge.
    ///
    /// ## Arguments
    /// * `merges` - The merge table.
    /// * `symbols` - The atomic symbols of one span, in order.
    fn merge_symbols(
        &mut self,
        merges: &MergeTable,
        symbols: &mut Vec<Symbol>,
    );
}
