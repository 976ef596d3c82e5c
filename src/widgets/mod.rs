//! UI widgets for the TUI application
//!
//! Reusable components drawn around the results table.

pub mod column_formatting_popover;
pub mod debounced_input;
