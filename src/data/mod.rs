//! Data layer
//!
//! Row/value model, file loaders and clipboard serialization.

pub mod data_exporter;
pub mod datatable;
pub mod datatable_loaders;
