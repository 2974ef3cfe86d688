//! # Combined Tokenizer

mod tokenizer_config;
mod tokenizer_impl;
mod tokenizer_state;

#[doc(inline)]
pub use tokenizer_config::*;
#[doc(inline)]
pub use tokenizer_impl::*;
#[doc(inline)]
pub use tokenizer_state::*;
