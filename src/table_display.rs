use crate::columns::ColumnDescriptor;
use crate::data::datatable::DataRow;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

/// Build a comfy-table from descriptors, using the same cell text the TUI shows
pub fn build_table(descriptors: &[ColumnDescriptor], rows: &[&DataRow]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = descriptors
        .iter()
        .map(|d| Cell::new(d.header.label()).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(headers);

    for row in rows {
        let cells: Vec<String> = descriptors
            .iter()
            .map(|d| d.render_cell(row).plain_text())
            .collect();
        table.add_row(cells);
    }

    table
}

pub fn display_results(descriptors: &[ColumnDescriptor], rows: &[&DataRow]) {
    if descriptors.is_empty() || rows.is_empty() {
        println!("{}", "No results found.".yellow());
        return;
    }

    println!("{}", build_table(descriptors, rows));
    println!("\n{}", format!("{} rows returned", rows.len()).green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{ColumnDescriptorBuilder, ColumnFormattingState, ColumnInputs, DisplayTokens};
    use crate::data::datatable::{DataValue, GenericDataType};
    use crate::preferences::InMemoryPreferenceStore;
    use crate::services::{DatabaseDateTimeFormatter, TerminalMarkupRenderer};
    use std::sync::Arc;

    #[test]
    fn test_print_table_uses_cell_policy() {
        let rows = Arc::new(vec![DataRow::new()
            .with("ts", DataValue::Integer(1_700_000_000_000))
            .with("ok", DataValue::Boolean(true))
            .with("note", DataValue::Null)]);
        let inputs = ColumnInputs {
            columns: vec!["ts".into(), "ok".into(), "note".into()],
            column_types: vec![
                GenericDataType::Temporal,
                GenericDataType::Boolean,
                GenericDataType::String,
            ],
            ..ColumnInputs::default()
        };
        let mut builder = ColumnDescriptorBuilder::new(
            DisplayTokens::default(),
            Arc::new(DatabaseDateTimeFormatter::new()),
            Arc::new(TerminalMarkupRenderer::new()),
        );
        let formatting = ColumnFormattingState::new(Arc::new(InMemoryPreferenceStore::new()));
        let descriptors = builder.build(&inputs, &rows, &formatting).to_vec();

        let row_refs: Vec<&DataRow> = rows.iter().collect();
        let rendered = build_table(&descriptors, &row_refs).to_string();
        assert!(rendered.contains("2023-11-14 22:13:20"));
        assert!(rendered.contains("True"));
        assert!(rendered.contains("N/A"));
    }
}
