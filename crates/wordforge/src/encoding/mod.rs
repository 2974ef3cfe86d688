//! # Encodings
//!
//! [`Encoding`] is the caller-owned result of an encode; [`TruncationConfig`]
//! and [`PaddingConfig`] reshape encodings to model input lengths.

#[allow(clippy::module_inception)]
mod encoding;
mod padding;
mod truncation;

#[doc(inline)]
pub use encoding::*;
#[doc(inline)]
pub use padding::*;
#[doc(inline)]
pub use truncation::*;
