//! # Pre-Tokenizers
//!
//! Splits normalized text into spans; merges never cross a span boundary.

mod pre_tokenizer;
mod regex_wrapper;

#[doc(inline)]
pub use pre_tokenizer::{PreTokenSpan, PreTokenizer, PreTokenizerConfig, is_punctuation};
#[doc(inline)]
pub use regex_wrapper::{MatchRanges, RegexPattern, RegexWrapper};
