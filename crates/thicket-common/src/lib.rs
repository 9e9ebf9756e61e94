//! Common utilities for thicket.
//!
//! This crate provides shared infrastructure used by the tree builder and its tools:
//! - **Warning System** - per-build deduplicated warnings routed through the `log` facade

pub mod warning;
