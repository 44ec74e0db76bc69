//! Common utilities for the readygate loader.
//!
//! This crate provides shared infrastructure used by the loader and its CLI:
//! - **Warning System** - deduplicated, colored terminal diagnostics
//! - **Resource URLs** - base-prefix concatenation for injected resources

pub mod url;
pub mod warning;
