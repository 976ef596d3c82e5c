use crate::columns::temporal_toggle::DisplayMode;
use crate::data::datatable::{DataRow, DataValue, GenericDataType};
use crate::services::{labels, Markup, MarkupRenderer, TimeFormatter};
use std::fmt;
use std::sync::Arc;

/// Fixed display tokens for values that must not go through default coercion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTokens {
    pub true_token: String,
    pub false_token: String,
    pub null_token: String,
}

impl Default for DisplayTokens {
    fn default() -> Self {
        Self {
            true_token: "True".to_string(),
            false_token: "False".to_string(),
            null_token: labels::NOT_APPLICABLE.to_string(),
        }
    }
}

/// What a column header shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderContent {
    Plain(String),
    /// Interactive formatting toggle for a temporal column
    TemporalToggle { column: String, mode: DisplayMode },
}

impl HeaderContent {
    pub fn label(&self) -> &str {
        match self {
            HeaderContent::Plain(label) => label,
            HeaderContent::TemporalToggle { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellTone {
    #[default]
    Normal,
    /// De-emphasized, used for null
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    /// Output of the markup renderer, displayed as-is
    Markup(Markup),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub content: CellContent,
    pub tone: CellTone,
}

impl RenderedCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: CellContent::Text(text.into()),
            tone: CellTone::Normal,
        }
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self {
            content: CellContent::Text(text.into()),
            tone: CellTone::Muted,
        }
    }

    /// Text without styling, e.g. for width calculation or printing
    pub fn plain_text(&self) -> String {
        match &self.content {
            CellContent::Text(text) => text.clone(),
            CellContent::Markup(markup) => markup.plain_text(),
        }
    }
}

pub type CellRenderFn = Arc<dyn Fn(Option<&DataValue>) -> RenderedCell + Send + Sync>;

/// The built-in rendering policy for one column
#[derive(Clone)]
pub struct CellPolicy {
    pub data_type: Option<GenericDataType>,
    /// Column is shown in original mode
    pub original: bool,
    pub allow_html: bool,
    pub tokens: Arc<DisplayTokens>,
    pub time_formatter: Arc<dyn TimeFormatter>,
    pub markup: Arc<dyn MarkupRenderer>,
}

impl CellPolicy {
    pub fn render(&self, value: Option<&DataValue>) -> RenderedCell {
        let Some(value) = value else {
            return RenderedCell::text("");
        };

        match value {
            DataValue::Boolean(true) => RenderedCell::text(self.tokens.true_token.clone()),
            DataValue::Boolean(false) => RenderedCell::text(self.tokens.false_token.clone()),
            DataValue::Null => RenderedCell::muted(self.tokens.null_token.clone()),
            v if self.formats_timestamps() && v.is_numeric() => match v.as_millis() {
                Some(millis) => RenderedCell::text(self.time_formatter.format(millis)),
                None => RenderedCell::text(v.to_string()),
            },
            DataValue::String(s) if self.allow_html => RenderedCell {
                content: CellContent::Markup(self.markup.render(s)),
                tone: CellTone::Normal,
            },
            other => RenderedCell::text(other.to_string()),
        }
    }

    fn formats_timestamps(&self) -> bool {
        self.data_type == Some(GenericDataType::Temporal) && !self.original
    }
}

#[derive(Clone)]
pub enum CellRenderer {
    Policy(CellPolicy),
    Custom(CellRenderFn),
}

impl CellRenderer {
    pub fn render(&self, value: Option<&DataValue>) -> RenderedCell {
        match self {
            CellRenderer::Policy(policy) => policy.render(value),
            CellRenderer::Custom(render) => render(value),
        }
    }
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRenderer::Policy(policy) => f
                .debug_struct("Policy")
                .field("data_type", &policy.data_type)
                .field("original", &policy.original)
                .field("allow_html", &policy.allow_html)
                .finish(),
            CellRenderer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Everything the grid needs to show one column
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Non-empty and unique within the descriptor list
    pub id: String,
    /// Row key the values are read from
    pub accessor: String,
    pub header: HeaderContent,
    pub cell: CellRenderer,
}

impl ColumnDescriptor {
    pub fn value<'a>(&self, row: &'a DataRow) -> Option<&'a DataValue> {
        row.get(&self.accessor)
    }

    pub fn render_cell(&self, row: &DataRow) -> RenderedCell {
        self.cell.render(self.value(row))
    }

    pub fn is_temporal_toggle(&self) -> bool {
        matches!(self.header, HeaderContent::TemporalToggle { .. })
    }
}

/// Caller-supplied replacement fields, applied after the derived ones
#[derive(Clone, Default)]
pub struct ColumnOverride {
    pub id: Option<String>,
    pub accessor: Option<String>,
    pub header: Option<HeaderContent>,
    pub cell: Option<CellRenderFn>,
}

impl ColumnOverride {
    pub fn with_header(mut self, header: HeaderContent) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_cell<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&DataValue>) -> RenderedCell + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(render));
        self
    }

    pub fn apply(&self, descriptor: &mut ColumnDescriptor) {
        if let Some(id) = &self.id {
            descriptor.id = id.clone();
        }
        if let Some(accessor) = &self.accessor {
            descriptor.accessor = accessor.clone();
        }
        if let Some(header) = &self.header {
            descriptor.header = header.clone();
        }
        if let Some(cell) = &self.cell {
            descriptor.cell = CellRenderer::Custom(cell.clone());
        }
    }
}

impl fmt::Debug for ColumnOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnOverride")
            .field("id", &self.id)
            .field("accessor", &self.accessor)
            .field("header", &self.header)
            .field("cell", &self.cell.as_ref().map(|_| ".."))
            .finish()
    }
}
