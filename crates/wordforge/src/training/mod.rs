//! # Vocabulary Training
//!
//! Learns a subword vocabulary and rank-ordered merge rules from a corpus.
//!
//! Corpus text runs through the same normalizer and pre-tokenizer as
//! encoding (see [`utility::SpanSource`]); distinct spans are tallied, split
//! into character symbols, and the most frequent adjacent pair is merged
//! until the vocabulary reaches its target size.
//!
//! Counting is parallel with the `rayon` feature; the merge loop is serial.
//! Results are deterministic: ties between equally frequent pairs go to the
//! pair first seen in the corpus.
//!
//! Most callers train through [`crate::Tokenizer::train`].
//!
//! ```rust
//! use wordforge::{
//!     training::{BpeTrainer, BpeTrainerOptions, utility::SpanSource},
//!     vocab::Vocabulary,
//! };
//!
//! let mut trainer: BpeTrainer =
//!     BpeTrainer::new(BpeTrainerOptions::new(64), SpanSource::default())?;
//! trainer.update_from_samples(["low lower lowest", "newer wider"]);
//!
//! let results = trainer.train(Vocabulary::new())?;
//! assert!(results.vocab.len() <= 64);
//! # Ok::<(), wordforge::WordforgeError>(())
//! ```

pub mod utility;

mod bpe_trainer;
mod cancel;
mod training_types;

#[doc(inline)]
pub use bpe_trainer::{BpeTrainer, BpeTrainerOptions, MergeJob, TrainResults};
#[doc(inline)]
pub use cancel::CancelToken;
#[doc(inline)]
pub use training_types::{CountType, StringChunkType};
