//! User interface layer
//!
//! The results table, its header interactions and the TUI application.

pub mod header_events;
pub mod result_table;
pub mod table_renderer;
pub mod tui_app;
