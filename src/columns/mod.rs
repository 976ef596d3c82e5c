//! Column descriptors and the temporal display-mode state
//!
//! The builder turns requested column names, type tags, rows and the current
//! display preferences into descriptors the table renderer consumes.

pub mod builder;
pub mod descriptor;
pub mod temporal_toggle;

pub use builder::{ColumnDescriptorBuilder, ColumnInputs};
pub use descriptor::{
    CellContent, CellPolicy, CellRenderFn, CellRenderer, CellTone, ColumnDescriptor,
    ColumnOverride, DisplayTokens, HeaderContent, RenderedCell,
};
pub use temporal_toggle::{ColumnFormattingState, DisplayMode};
