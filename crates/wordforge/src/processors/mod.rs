//! # Post-processors
//!
//! A [`TemplateProcessor`] arranges encoded sequences and special tokens
//! according to a [`Template`]: a slot list of [`Piece`]s.

pub mod post_processor;
pub mod template;

#[doc(inline)]
pub use post_processor::{PostProcessorConfig, TemplatePreset, TemplateProcessor};
#[doc(inline)]
pub use template::{Piece, SequenceId, Template};
