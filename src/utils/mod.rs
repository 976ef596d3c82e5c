//! Utility functions and helpers
//!
//! Paths, logging setup and the debouncer used by the filter input.

pub mod app_paths;
pub mod debouncer;
pub mod logging;
