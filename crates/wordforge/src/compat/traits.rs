//! # Trait Checks
//!
//! Compile-time assertions used by tests to pin thread-safety guarantees.

/// Check that a value's type is `Send + Sync`.
pub fn assert_send_sync<S: Send + Sync>(_: &S) {}
