//! # Decoders

pub mod word_decoder;

#[doc(inline)]
pub use word_decoder::{DecoderOptions, WordDecoder};
