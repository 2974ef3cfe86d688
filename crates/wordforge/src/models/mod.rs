//! # Subword Models
//!
//! [`BpeModel`] turns one pre-tokenized span into subword tokens.
//! Merge application is delegated to a [`span_encoders::SpanEncoder`],
//! chosen with a [`span_encoders::SpanEncoderSelector`].

pub mod bpe_model;
pub mod span_encoders;

#[doc(inline)]
pub use bpe_model::{BpeModel, BpeModelOptions, ModelToken};
#[doc(inline)]
pub use span_encoders::{SpanEncoder, SpanEncoderSelector};
