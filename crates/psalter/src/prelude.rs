//! Psalter prelude.

/// Result type in Psalter.
pub type Result<T> = std::result::Result<T, Box<crate::error::Error>>;
