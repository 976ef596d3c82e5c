pub mod columns;
pub mod config;
pub mod data;
pub mod preferences;
pub mod search_filter;
pub mod services;
pub mod table_display;
pub mod ui;
pub mod utils;
pub mod widgets;
