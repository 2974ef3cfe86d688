//! # Tokenizer Persistence
//!
//! A tokenizer persists as one JSON [`TokenizerDocument`]: format version,
//! configuration, the id-ordered vocabulary, the special token registry, and
//! the rank-ordered merges. Callers own the files; these functions only see
//! readers and writers.

mod tokenizer_io;

#[doc(inline)]
pub use tokenizer_io::*;
