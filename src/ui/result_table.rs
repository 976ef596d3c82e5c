use crate::columns::{
    ColumnDescriptor, ColumnDescriptorBuilder, ColumnFormattingState, ColumnInputs,
    ColumnOverride, DisplayMode, DisplayTokens,
};
use crate::config::Config;
use crate::data::data_exporter::DataExporter;
use crate::data::datatable::{DataRow, GenericDataType};
use crate::preferences::ColumnDisplayPreferenceStore;
use crate::search_filter::RowFilter;
use crate::services::{
    ClipboardSink, DatabaseDateTimeFormatter, MarkupRenderer, TerminalMarkupRenderer,
    TimeFormatter, Translator,
};
use crate::ui::header_events::{dispatch_header_click, HeaderAction, HeaderClick};
use crate::widgets::column_formatting_popover::ColumnFormattingPopover;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column_id: String,
    pub accessor: String,
    pub ascending: bool,
}

/// The table's data surface: descriptors for the columns plus the rows left
/// after filtering (and optional client-side sort).
pub struct ResultTable {
    inputs: ColumnInputs,
    rows: Arc<Vec<DataRow>>,
    builder: ColumnDescriptorBuilder,
    formatting: ColumnFormattingState,
    popover: ColumnFormattingPopover,
    filter: RowFilter,
    filter_text: String,
    sort: Option<SortState>,
    /// Filtered + sorted row indices; None when stale
    visible: Option<Vec<usize>>,
}

impl ResultTable {
    pub fn new(
        tokens: DisplayTokens,
        allow_html: bool,
        store: Arc<dyn ColumnDisplayPreferenceStore>,
        translator: &dyn Translator,
    ) -> Self {
        Self::with_services(
            tokens,
            allow_html,
            store,
            translator,
            Arc::new(DatabaseDateTimeFormatter::new()),
            Arc::new(TerminalMarkupRenderer::new()),
        )
    }

    pub fn with_services(
        tokens: DisplayTokens,
        allow_html: bool,
        store: Arc<dyn ColumnDisplayPreferenceStore>,
        translator: &dyn Translator,
        time_formatter: Arc<dyn TimeFormatter>,
        markup: Arc<dyn MarkupRenderer>,
    ) -> Self {
        // Null cells and the filter share one translated token
        let tokens = DisplayTokens {
            null_token: translator.t(&tokens.null_token),
            ..tokens
        };
        let filter = RowFilter::new(tokens.null_token.clone());
        Self {
            inputs: ColumnInputs {
                allow_html,
                ..ColumnInputs::default()
            },
            rows: Arc::new(Vec::new()),
            builder: ColumnDescriptorBuilder::new(tokens, time_formatter, markup),
            formatting: ColumnFormattingState::new(store),
            popover: ColumnFormattingPopover::new(),
            filter,
            filter_text: String::new(),
            sort: None,
            visible: None,
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn ColumnDisplayPreferenceStore>,
        translator: &dyn Translator,
    ) -> Self {
        Self::new(
            config.display.tokens(),
            config.display.allow_html,
            store,
            translator,
        )
    }

    /// Replace columns, their types and the rows
    pub fn set_data(
        &mut self,
        columns: Vec<String>,
        column_types: Vec<GenericDataType>,
        rows: Vec<DataRow>,
    ) {
        info!(target: "table", "Loaded {} rows x {} columns", rows.len(), columns.len());
        self.inputs.columns = columns;
        self.inputs.column_types = column_types;
        self.rows = Arc::new(rows);
        self.sort = None;
        self.visible = None;
    }

    pub fn set_data_source(&mut self, data_source: Option<String>) {
        self.inputs.data_source = data_source.clone();
        self.formatting.set_data_source(data_source);
        self.popover.close();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.inputs.visible = visible;
        self.formatting.set_visible(visible);
        if !visible {
            self.popover.close();
        }
    }

    pub fn set_allow_html(&mut self, allow_html: bool) {
        self.inputs.allow_html = allow_html;
    }

    pub fn set_override(&mut self, column: impl Into<String>, column_override: ColumnOverride) {
        self.builder.set_override(column, column_override);
    }

    pub fn rows(&self) -> &Arc<Vec<DataRow>> {
        &self.rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.inputs.columns
    }

    pub fn formatting(&self) -> &ColumnFormattingState {
        &self.formatting
    }

    pub fn popover(&self) -> &ColumnFormattingPopover {
        &self.popover
    }

    pub fn popover_mut(&mut self) -> &mut ColumnFormattingPopover {
        &mut self.popover
    }

    pub fn descriptor_recompute_count(&self) -> usize {
        self.builder.recompute_count()
    }

    /// Column descriptors for the grid (memoized)
    pub fn columns(&mut self) -> &[ColumnDescriptor] {
        self.builder.build(&self.inputs, &self.rows, &self.formatting)
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn set_filter_text(&mut self, text: &str) {
        if self.filter_text != text {
            debug!(target: "table", "Filter text: '{}'", text);
            self.filter_text = text.to_string();
            self.visible = None;
        }
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Sort by a column id; repeating the same column flips the direction
    pub fn sort_by(&mut self, column_id: &str) {
        let accessor = match self.columns().iter().find(|d| d.id == column_id) {
            Some(descriptor) => descriptor.accessor.clone(),
            None => return,
        };
        let ascending = match &self.sort {
            Some(sort) if sort.column_id == column_id => !sort.ascending,
            _ => true,
        };
        self.sort = Some(SortState {
            column_id: column_id.to_string(),
            accessor,
            ascending,
        });
        self.visible = None;
    }

    /// Indices into `rows()` of the rows currently shown, in display order
    pub fn visible_indices(&mut self) -> &[usize] {
        if self.visible.is_none() {
            let mut indices = self.filter.matching_indices(&self.rows, &self.filter_text);
            if let Some(sort) = &self.sort {
                let rows = &self.rows;
                indices.sort_by(|a, b| {
                    let ord = match (rows[*a].get(&sort.accessor), rows[*b].get(&sort.accessor)) {
                        (Some(x), Some(y)) => x.compare(y),
                        (None, Some(_)) => std::cmp::Ordering::Less,
                        (Some(_), None) => std::cmp::Ordering::Greater,
                        (None, None) => std::cmp::Ordering::Equal,
                    };
                    if sort.ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                });
            }
            self.visible = Some(indices);
        }
        self.visible.as_deref().unwrap_or(&[])
    }

    /// The filtered (and sorted) rows handed to the grid
    pub fn filtered_rows(&mut self) -> Vec<&DataRow> {
        self.visible_indices();
        let rows = &self.rows;
        self.visible
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|idx| rows.get(*idx))
            .collect()
    }

    /// TSV payload of the visible rows in column order
    pub fn copy_payload(&mut self) -> String {
        let columns: Vec<String> = self.columns().iter().map(|d| d.accessor.clone()).collect();
        DataExporter::generate_tsv_text(self.filtered_rows(), &columns)
    }

    /// Copy the visible rows; returns how many were copied
    pub fn copy_to(&mut self, sink: &mut dyn ClipboardSink) -> Result<usize> {
        let payload = self.copy_payload();
        let count = self.visible_indices().len();
        sink.copy(&payload)?;
        info!(target: "table", "Copied {} rows to clipboard", count);
        Ok(count)
    }

    /// Route a header click; sort requests are applied here
    pub fn click_header(&mut self, click: HeaderClick) -> Vec<HeaderAction> {
        let descriptors = self
            .builder
            .build(&self.inputs, &self.rows, &self.formatting);
        let actions =
            dispatch_header_click(click, descriptors, &mut self.popover, &mut self.formatting);

        for action in &actions {
            if let HeaderAction::Sort(column_id) = action {
                self.sort_by(column_id);
            }
        }
        actions
    }

    /// Open the formatting overlay for the column at `index`, if it has one
    pub fn open_formatting(&mut self, index: usize) -> bool {
        let column = match self.columns().get(index) {
            Some(descriptor) if descriptor.is_temporal_toggle() => descriptor.accessor.clone(),
            _ => return false,
        };
        let mode = self.formatting.mode_of(&column);
        self.popover.open(column, index, mode);
        true
    }

    /// Apply a display mode choice for a temporal column
    pub fn select_mode(&mut self, column: &str, mode: DisplayMode) -> bool {
        self.formatting.select(column, mode)
    }
}
