//! # Trainer Implementation Utilities

mod pair_span_index;
#[doc(inline)]
pub use pair_span_index::{PairCountMap, PairIndexMap, PairSpanIndex, PairStampMap};

mod symbol_span_buffer;
#[doc(inline)]
pub use symbol_span_buffer::SymbolSpanBuf;

mod text_span_counter;
#[doc(inline)]
pub use text_span_counter::{SpanSource, SpanTally, TextSpanCounter};
