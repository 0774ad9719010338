//! Utility functions.
//!
//! This module provides CSS selector and regex compilation helpers for
//! statically known patterns.

mod selector;

pub use selector::{compile_regex_unsafe, parse_selector_unsafe};
