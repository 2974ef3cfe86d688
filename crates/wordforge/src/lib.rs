//! # `wordforge` Subword Tokenizer
//!
//! `wordforge` is a trainable BPE (byte-pair-encoding) subword tokenizer.
//!
//! A [`Tokenizer`] runs a five stage pipeline:
//! * [`normalizers`] clean up the input text, tracking offsets.
//! * [`pretokenizers`] split the text into words and punctuation.
//! * [`models`] encode each word into subword tokens with the learned merges.
//! * [`processors`] wrap sequences in special tokens (`[CLS] ... [SEP]`).
//! * [`decoders`] reassemble text from token ids.
//!
//! See also:
//! * [`training`] to learn a vocabulary and merges from a corpus.
//! * [`encoding`] for the [`Encoding`] record, truncation and padding.
//! * [`vocab`] for the vocabulary, merge table and special token registry.
//! * [`io`] to save and load tokenizers as JSON.
//!
//! ## Crate Features
#![doc = document_features::document_features!()]
//!
//! ## Training and Encoding
//!
//! ```rust
//! use wordforge::Tokenizer;
//!
//! let tokenizer = Tokenizer::new()?;
//! tokenizer.train([["Hello world! This is a test corpus."]], 1000, 1)?;
//! tokenizer.set_lowercase(true);
//! tokenizer.create_bert_post_processor(true)?;
//!
//! let encoding = tokenizer.encode("Hello World")?;
//! assert_eq!(encoding.tokens.first().map(|t| t.as_str()), Some("[CLS]"));
//! assert_eq!(encoding.tokens.last().map(|t| t.as_str()), Some("[SEP]"));
//!
//! let text = tokenizer.decode(&encoding.input_ids, true)?;
//! assert_eq!(text, "hello world");
//! # Ok::<(), wordforge::WordforgeError>(())
//! ```
//!
//! A [`Tokenizer`] is shared by reference across threads: readers work on
//! an immutable snapshot, while configuration changes and training publish a
//! new one.
#![warn(missing_docs, unused)]

pub mod compat;
pub mod decoders;
pub mod encoding;
pub mod errors;
pub mod io;
pub mod models;
pub mod normalizers;
pub mod pretokenizers;
pub mod processors;
pub mod tokenizer;
pub mod training;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use encoding::Encoding;
#[doc(inline)]
pub use errors::{WFResult, WordforgeError};
#[doc(inline)]
pub use tokenizer::{Tokenizer, TokenizerConfig};
