use std::sync::Arc;
use table_columns::columns::{
    CellContent, CellTone, ColumnDescriptorBuilder, ColumnFormattingState, ColumnInputs,
    ColumnOverride, DisplayMode, DisplayTokens, HeaderContent, RenderedCell,
};
use table_columns::data::datatable::{DataRow, DataValue, GenericDataType};
use table_columns::preferences::{ColumnDisplayPreferenceStore, InMemoryPreferenceStore};
use table_columns::services::{DatabaseDateTimeFormatter, TerminalMarkupRenderer};

fn builder() -> ColumnDescriptorBuilder {
    ColumnDescriptorBuilder::new(
        DisplayTokens::default(),
        Arc::new(DatabaseDateTimeFormatter::new()),
        Arc::new(TerminalMarkupRenderer::new()),
    )
}

fn formatting(source: Option<&str>) -> (Arc<InMemoryPreferenceStore>, ColumnFormattingState) {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut state = ColumnFormattingState::new(store.clone());
    state.set_data_source(source.map(str::to_string));
    state.set_visible(true);
    (store, state)
}

fn inputs(columns: &[&str], types: &[GenericDataType], source: Option<&str>) -> ColumnInputs {
    ColumnInputs {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        column_types: types.to_vec(),
        data_source: source.map(str::to_string),
        visible: true,
        allow_html: false,
    }
}

fn ts_rows() -> Arc<Vec<DataRow>> {
    Arc::new(vec![DataRow::new().with("ts", DataValue::Integer(1_700_000_000_000))])
}

#[test]
fn test_temporal_column_formats_epoch_millis() {
    let rows = ts_rows();
    let (_, state) = formatting(Some("s1"));
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(&["ts"], &[GenericDataType::Temporal], Some("s1")),
        &rows,
        &state,
    );

    assert_eq!(descriptors.len(), 1);
    assert_eq!(
        descriptors[0].header,
        HeaderContent::TemporalToggle {
            column: "ts".to_string(),
            mode: DisplayMode::Formatted
        }
    );
    assert_eq!(
        descriptors[0].render_cell(&rows[0]),
        RenderedCell::text("2023-11-14 22:13:20")
    );
}

#[test]
fn test_original_mode_shows_raw_value() {
    let rows = ts_rows();
    let (store, mut state) = formatting(Some("s1"));
    assert!(state.select("ts", DisplayMode::Original));
    assert_eq!(store.get("s1"), vec!["ts".to_string()]);

    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(&["ts"], &[GenericDataType::Temporal], Some("s1")),
        &rows,
        &state,
    );
    assert_eq!(
        descriptors[0].render_cell(&rows[0]).plain_text(),
        "1700000000000"
    );
    assert_eq!(
        descriptors[0].header,
        HeaderContent::TemporalToggle {
            column: "ts".to_string(),
            mode: DisplayMode::Original
        }
    );
}

#[test]
fn test_null_and_boolean_tokens() {
    let rows = Arc::new(vec![DataRow::new()
        .with("x", DataValue::Null)
        .with("flag", DataValue::Boolean(false))]);
    let (_, state) = formatting(None);
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(
            &["x", "flag"],
            &[GenericDataType::String, GenericDataType::Boolean],
            None,
        ),
        &rows,
        &state,
    );

    let null_cell = descriptors[0].render_cell(&rows[0]);
    assert_eq!(null_cell.content, CellContent::Text("N/A".to_string()));
    assert_eq!(null_cell.tone, CellTone::Muted);
    assert_eq!(descriptors[1].render_cell(&rows[0]).plain_text(), "False");
}

#[test]
fn test_custom_tokens() {
    let rows = Arc::new(vec![DataRow::new()
        .with("flag", DataValue::Boolean(true))
        .with("x", DataValue::Null)]);
    let (_, state) = formatting(None);
    let mut builder = ColumnDescriptorBuilder::new(
        DisplayTokens {
            true_token: "yes".to_string(),
            false_token: "no".to_string(),
            null_token: "-".to_string(),
        },
        Arc::new(DatabaseDateTimeFormatter::new()),
        Arc::new(TerminalMarkupRenderer::new()),
    );
    let descriptors = builder.build(
        &inputs(&["flag", "x"], &[GenericDataType::Boolean, GenericDataType::String], None),
        &rows,
        &state,
    );
    assert_eq!(descriptors[0].render_cell(&rows[0]).plain_text(), "yes");
    assert_eq!(descriptors[1].render_cell(&rows[0]).plain_text(), "-");
}

#[test]
fn test_columns_missing_from_first_row_are_dropped() {
    let rows = Arc::new(vec![DataRow::new().with("a", DataValue::Integer(1))]);
    let (_, state) = formatting(None);
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(&["a", "b"], &[GenericDataType::Numeric, GenericDataType::Numeric], None),
        &rows,
        &state,
    );
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].id, "a");
}

#[test]
fn test_empty_rows_give_no_descriptors() {
    let rows = Arc::new(Vec::new());
    let (_, state) = formatting(Some("s1"));
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(&["ts"], &[GenericDataType::Temporal], Some("s1")),
        &rows,
        &state,
    );
    assert!(descriptors.is_empty());
}

#[test]
fn test_no_data_source_means_plain_header() {
    let rows = ts_rows();
    let (_, state) = formatting(None);
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(&["ts"], &[GenericDataType::Temporal], None),
        &rows,
        &state,
    );
    assert_eq!(descriptors[0].header, HeaderContent::Plain("ts".to_string()));
    // Still formatted, just not toggleable
    assert_eq!(
        descriptors[0].render_cell(&rows[0]).plain_text(),
        "2023-11-14 22:13:20"
    );
}

#[test]
fn test_string_temporal_values_are_not_toggleable() {
    let rows = Arc::new(vec![DataRow::new().with(
        "created",
        DataValue::String("2024-01-15 10:30:00".to_string()),
    )]);
    let (_, state) = formatting(Some("s1"));
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(&["created"], &[GenericDataType::Temporal], Some("s1")),
        &rows,
        &state,
    );
    assert_eq!(
        descriptors[0].header,
        HeaderContent::Plain("created".to_string())
    );
    assert_eq!(
        descriptors[0].render_cell(&rows[0]).plain_text(),
        "2024-01-15 10:30:00"
    );
}

#[test]
fn test_html_strings_render_as_markup() {
    let rows = Arc::new(vec![DataRow::new().with(
        "note",
        DataValue::String("<b>bold</b> &amp; plain<script>x()</script>".to_string()),
    )]);
    let (_, state) = formatting(None);
    let mut builder = builder();

    let mut with_html = inputs(&["note"], &[GenericDataType::String], None);
    with_html.allow_html = true;
    let cell = builder.build(&with_html, &rows, &state)[0].render_cell(&rows[0]);
    match &cell.content {
        CellContent::Markup(markup) => {
            assert_eq!(markup.plain_text(), "bold & plain");
            assert!(markup.spans()[0].style.bold);
        }
        other => panic!("expected markup, got {:?}", other),
    }

    let without_html = inputs(&["note"], &[GenericDataType::String], None);
    let cell = builder.build(&without_html, &rows, &state)[0].render_cell(&rows[0]);
    assert_eq!(
        cell.plain_text(),
        "<b>bold</b> &amp; plain<script>x()</script>"
    );
}

#[test]
fn test_empty_column_name_uses_position_as_id() {
    let rows = Arc::new(vec![DataRow::new()
        .with("a", DataValue::Integer(1))
        .with("", DataValue::Integer(2))]);
    let (_, state) = formatting(None);
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(&["a", ""], &[GenericDataType::Numeric, GenericDataType::Numeric], None),
        &rows,
        &state,
    );
    assert_eq!(descriptors[1].id, "1");
    assert_eq!(descriptors[1].accessor, "");
    assert_eq!(descriptors[1].render_cell(&rows[0]).plain_text(), "2");
}

#[test]
fn test_overrides_replace_derived_fields() {
    let rows = ts_rows();
    let (_, state) = formatting(Some("s1"));
    let mut builder = builder();
    builder.set_override(
        "ts",
        ColumnOverride::default()
            .with_header(HeaderContent::Plain("Timestamp".to_string()))
            .with_cell(|value| {
                RenderedCell::text(format!("<{}>", value.map(|v| v.to_string()).unwrap_or_default()))
            }),
    );

    let descriptors = builder.build(
        &inputs(&["ts"], &[GenericDataType::Temporal], Some("s1")),
        &rows,
        &state,
    );
    assert_eq!(descriptors[0].id, "ts");
    assert_eq!(
        descriptors[0].header,
        HeaderContent::Plain("Timestamp".to_string())
    );
    assert_eq!(
        descriptors[0].render_cell(&rows[0]).plain_text(),
        "<1700000000000>"
    );
}

#[test]
fn test_descriptors_are_memoized() {
    let rows = ts_rows();
    let (_, mut state) = formatting(Some("s1"));
    let mut builder = builder();
    let request = inputs(&["ts"], &[GenericDataType::Temporal], Some("s1"));

    builder.build(&request, &rows, &state);
    builder.build(&request, &rows, &state);
    assert_eq!(builder.recompute_count(), 1);

    // Equal contents behind a new Arc count as new rows
    let same_contents = Arc::new(rows.as_ref().clone());
    builder.build(&request, &same_contents, &state);
    assert_eq!(builder.recompute_count(), 2);

    // Preference change
    state.select("ts", DisplayMode::Original);
    builder.build(&request, &same_contents, &state);
    assert_eq!(builder.recompute_count(), 3);

    // Scalar input change
    let mut html = request.clone();
    html.allow_html = true;
    builder.build(&html, &same_contents, &state);
    assert_eq!(builder.recompute_count(), 4);

    builder.set_override("ts", ColumnOverride::default());
    builder.build(&html, &same_contents, &state);
    assert_eq!(builder.recompute_count(), 5);
}

#[test]
fn test_descriptor_ids_stay_unique() {
    let rows = Arc::new(vec![DataRow::new()
        .with("1", DataValue::Integer(1))
        .with("", DataValue::Integer(2))
        .with("a", DataValue::Integer(3))]);
    let (_, state) = formatting(None);
    let mut builder = builder();
    let descriptors = builder.build(
        &inputs(
            &["1", "", "a", "a"],
            &[GenericDataType::Numeric; 4],
            None,
        ),
        &rows,
        &state,
    );

    let ids: Vec<&str> = descriptors.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "1_1", "a", "a_3"]);
    // Accessors are untouched
    assert_eq!(descriptors[1].accessor, "");
    assert_eq!(descriptors[3].accessor, "a");
}
