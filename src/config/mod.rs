//! Configuration module
//!
//! Display tokens, filter timing, preference storage and UI labels.

pub mod config;

pub use config::{Config, DisplayConfig, FilterConfig, PreferenceBackend, PreferencesConfig};
