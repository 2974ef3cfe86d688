//! # Span Encoder Selector

use serde::{Deserialize, Serialize};

use crate::models::span_encoders::{MergeHeapSpanEncoder, RankScanSpanEncoder, SpanEncoder};

/// Policy enum for selecting a [`SpanEncoder`].
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpanEncoderSelector {
    /// The canonical best encoder.
    ///
    /// This is the evergreen label for "the good one"; a saved config that
    /// says `default` keeps meaning "use the default".
    ///
    /// This is currently an alias for: [`MergeHeap`](`Self::MergeHeap`)
    #[default]
    Default,

    /// The canonical reference encoder.
    ///
    /// As simple as possible, not optimized for performance.
    ///
    /// This is currently an alias for: [`RankScan`](`Self::RankScan`)
    Reference,

    /// Use the [`MergeHeapSpanEncoder`] encoder.
    MergeHeap,

    /// Use the [`RankScanSpanEncoder`] encoder.
    RankScan,
}

impl SpanEncoderSelector {
    /// Build a fresh instance of the selected [`SpanEncoder`].
    pub fn build(&self) -> Box<dyn SpanEncoder> {
        use SpanEncoderSelector::*;
        match self {
            Default | MergeHeap => Box::new(MergeHeapSpanEncoder::default()),
            Reference | RankScan => Box::new(RankScanSpanEncoder),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::models::span_encoders::{
        Symbol,
        testing::{sample_merges, symbols_of},
    };

    #[test]
    fn test_names() {
        assert_eq!(SpanEncoderSelector::MergeHeap.to_string(), "merge_heap");
        assert_eq!(
            SpanEncoderSelector::from_str("RANK_SCAN").unwrap(),
            SpanEncoderSelector::RankScan
        );
        assert!(SpanEncoderSelector::from_str("bogus").is_err());
    }

    #[test]
    fn test_all_selectors_agree() {
        let (vocab, merges) = sample_merges();
        let input = ["c", "a", "b", "c", "b", "a", "b"];

        let results: Vec<Vec<Symbol>> = SpanEncoderSelector::iter()
            .map(|selector| {
                let mut symbols = symbols_of(&vocab, &input);
                selector.build().merge_symbols(&merges, &mut symbols);
                symbols
            })
            .collect();
        for result in &results[1..] {
            assert_eq!(result, &results[0]);
        }
    }
}
