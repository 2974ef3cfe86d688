//! Shared fixtures for [`SpanEncoder`](super::SpanEncoder) tests.

use crate::{
    models::span_encoders::Symbol,
    vocab::{MergeRule, MergeTable, Vocabulary},
};

/// `a b c ab abc bc` with merges `(a, b)`, `(ab, c)`, `(b, c)`.
pub fn sample_merges() -> (Vocabulary, MergeTable) {
    let vocab = Vocabulary::from_token_list(["a", "b", "c", "ab", "abc", "bc"]).unwrap();
    let merges = MergeTable::from_rules(
        vec![
            MergeRule::new("a", "b"),
            MergeRule::new("ab", "c"),
            MergeRule::new("b", "c"),
        ],
        &vocab,
    )
    .unwrap();
    (vocab, merges)
}

/// Lay out `parts` as consecutive symbols.
pub fn symbols_of(
    vocab: &Vocabulary,
    parts: &[&str],
) -> Vec<Symbol> {
    let mut offset = 0;
    parts
        .iter()
        .map(|part| {
            let start = offset;
            offset += part.len();
            Symbol {
                id: vocab.get_id(part),
                start,
                end: offset,
            }
        })
        .collect()
}
