//! # Compatibility Utilities

pub mod traits;
