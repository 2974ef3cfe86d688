//! # Rank Scan [`SpanEncoder`]

use crate::{
    models::span_encoders::{SpanEncoder, Symbol, lookup_symbols},
    vocab::MergeTable,
};

/// A [`SpanEncoder`] which rescans the whole span for every merge.
///
/// Each sweep finds the lowest ranked adjacent pair (leftmost on ties)
/// and merges it, until no pair has a merge.
///
/// Quadratic in the span length; this is the reference implementation.
#[derive(Default, Debug, Clone)]
pub struct RankScanSpanEncoder;

impl SpanEncoder for RankScanSpanEncoder {
    fn merge_symbols(
        &mut self,
        merges: &MergeTable,
        symbols: &mut Vec<Symbol>,
    ) {
        while symbols.len() > 1 {
            let Some((target, idx)) = symbols
                .windows(2)
                .enumerate()
                .filter_map(|(idx, w)| lookup_symbols(merges, &w[0], &w[1]).map(|t| (t, idx)))
                .min_by_key(|&(target, idx)| (target.rank, idx))
            else {
                // No more merges possible
                break;
            };

            // sym[idx..=idx+1] (a, b) -> sym[idx] t
            let right = symbols.remove(idx + 1);
            let left = &mut symbols[idx];
            left.id = Some(target.token);
            left.end = right.end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::span_encoders::testing::{sample_merges, symbols_of};

    #[test]
    fn test_rank_scan() {
        let (vocab, merges) = sample_merges();
        let mut encoder = RankScanSpanEncoder;

        let mut symbols = symbols_of(&vocab, &["a", "b", "c", "a", "b"]);
        encoder.merge_symbols(&merges, &mut symbols);
        let ids: Vec<_> = symbols.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![vocab.get_id("abc"), vocab.get_id("ab")]);
        assert_eq!(symbols[0].range(), 0..3);
        assert_eq!(symbols[1].range(), 3..5);
    }
}
