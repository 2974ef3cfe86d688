//! # Vocabulary
//!
//! * [`Vocabulary`] - the `{ token <-> id }` table.
//! * [`MergeTable`] - rank-ordered [`MergeRule`]s.
//! * [`SpecialVocab`] - the special token registry.

pub mod merges;
pub mod special_vocab;
pub mod symbols;
pub mod vocabulary;

#[doc(inline)]
pub use merges::{MergeRule, MergeTable, MergeTarget};
#[doc(inline)]
pub use special_vocab::{
    DEFAULT_SPECIAL_TOKENS, InputSegment, SpecialMatcher, SpecialToken, SpecialVocab,
};
#[doc(inline)]
pub use symbols::{DEFAULT_END_OF_WORD_SUFFIX, atomic_symbols, strip_end_of_word};
#[doc(inline)]
pub use vocabulary::Vocabulary;
