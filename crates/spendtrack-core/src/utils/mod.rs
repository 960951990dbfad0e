//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{capitalize, format_amount, kebab_case, truncate_string};
