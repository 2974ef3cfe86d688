//! # Normalizers
//!
//! Unicode normalization, case folding and accent stripping, with an explicit
//! alignment table from normalized bytes back to the original input.

mod normalization_form;
mod normalized_string;
mod normalizer;

#[doc(inline)]
pub use normalization_form::NormalizationForm;
#[doc(inline)]
pub use normalized_string::NormalizedString;
#[doc(inline)]
pub use normalizer::{Normalizer, NormalizerConfig};
