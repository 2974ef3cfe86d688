//! # [`SpanEncoder`] Implementations

mod merge_heap_encoder;
mod rank_scan_encoder;
mod span_encoder;
mod span_encoder_selector;

#[cfg(test)]
pub(crate) mod testing;

#[doc(inline)]
pub use merge_heap_encoder::*;
#[doc(inline)]
pub use rank_scan_encoder::*;
#[doc(inline)]
pub use span_encoder::*;
#[doc(inline)]
pub use span_encoder_selector::*;
