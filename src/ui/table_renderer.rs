// Table rendering from column descriptors.
// Depends only on descriptors, rows and a small view state, not on the app.

use crate::columns::{CellContent, CellTone, ColumnDescriptor, DisplayMode, HeaderContent, RenderedCell};
use crate::data::datatable::DataRow;
use crate::services::Markup;
use crate::ui::header_events::{HeaderClick, HeaderTarget};
use crate::ui::result_table::SortState;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

const MIN_COLUMN_WIDTH: u16 = 3;
const MAX_COLUMN_WIDTH: u16 = 40;
const COLUMN_SPACING: u16 = 1;
/// Rows measured for column widths, centered on the selection
const WIDTH_SAMPLE_ROWS: usize = 100;

/// Selection and presentation state owned by the caller
#[derive(Debug, Clone, Default)]
pub struct TableViewState {
    pub selected_row: usize,
    pub selected_column: usize,
    pub show_row_numbers: bool,
    /// First column drawn; adjusted on render so the selection stays visible
    pub column_offset: usize,
    pub sort: Option<SortState>,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeaderSpan {
    /// Position in the descriptor list
    column: usize,
    x_start: u16,
    x_end: u16,
    /// Columns of the `[F]`/`[O]` marker, when the header has one
    icon: Option<(u16, u16)>,
}

/// Screen positions of the header cells from the last render
#[derive(Debug, Clone, Default)]
pub struct HeaderHitMap {
    header_y: Option<u16>,
    column_offset: usize,
    /// Only the columns that were drawn
    spans: Vec<HeaderSpan>,
}

impl HeaderHitMap {
    /// Map a mouse position to a header click
    pub fn hit(&self, x: u16, y: u16) -> Option<HeaderClick> {
        if self.header_y != Some(y) {
            return None;
        }
        self.spans
            .iter()
            .find(|span| x >= span.x_start && x < span.x_end)
            .map(|span| {
                let target = match span.icon {
                    Some((start, end)) if x >= start && x < end => HeaderTarget::FormattingIcon,
                    _ => HeaderTarget::Label,
                };
                HeaderClick {
                    column: span.column,
                    target,
                }
            })
    }

    /// Screen rect of a header cell, used to anchor the formatting overlay
    pub fn header_rect(&self, column: usize) -> Option<Rect> {
        let y = self.header_y?;
        let span = self.spans.iter().find(|span| span.column == column)?;
        Some(Rect {
            x: span.x_start,
            y,
            width: span.x_end - span.x_start,
            height: 1,
        })
    }

    /// First column drawn by the last render
    pub fn column_offset(&self) -> usize {
        self.column_offset
    }

    /// Descriptor positions that made it on screen
    pub fn visible_columns(&self) -> std::ops::Range<usize> {
        match (self.spans.first(), self.spans.last()) {
            (Some(first), Some(last)) => first.column..last.column + 1,
            _ => 0..0,
        }
    }
}

fn mode_marker(mode: DisplayMode) -> &'static str {
    match mode {
        DisplayMode::Formatted => "[F]",
        DisplayMode::Original => "[O]",
    }
}

fn sort_indicator(descriptor: &ColumnDescriptor, sort: Option<&SortState>) -> &'static str {
    match sort {
        Some(sort) if sort.column_id == descriptor.id => {
            if sort.ascending {
                " ↑"
            } else {
                " ↓"
            }
        }
        _ => "",
    }
}

/// Header text without the toggle marker, and the marker itself
fn header_parts(descriptor: &ColumnDescriptor, sort: Option<&SortState>) -> (String, Option<&'static str>) {
    let label = format!("{}{}", descriptor.header.label(), sort_indicator(descriptor, sort));
    match &descriptor.header {
        HeaderContent::TemporalToggle { mode, .. } => (label, Some(mode_marker(*mode))),
        HeaderContent::Plain(_) => (label, None),
    }
}

pub fn markup_line(markup: &Markup) -> Line<'static> {
    let spans: Vec<Span<'static>> = markup
        .spans()
        .iter()
        .map(|span| {
            let mut style = Style::default();
            if span.style.bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            if span.style.italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            if span.style.underline {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Span::styled(span.text.clone(), style)
        })
        .collect();
    Line::from(spans)
}

fn to_cell(rendered: RenderedCell) -> Cell<'static> {
    let style = match rendered.tone {
        CellTone::Normal => Style::default(),
        CellTone::Muted => Style::default().fg(Color::DarkGray),
    };
    match rendered.content {
        CellContent::Text(text) => Cell::from(text).style(style),
        CellContent::Markup(markup) => Cell::from(markup_line(&markup)).style(style),
    }
}

fn display_width(text: &str) -> u16 {
    text.chars().count().min(u16::MAX as usize) as u16
}

/// Width per column: widest of header and rendered cells, clamped.
/// At most `WIDTH_SAMPLE_ROWS` rows are measured.
pub fn calculate_column_widths(
    descriptors: &[ColumnDescriptor],
    rows: &[&DataRow],
    sort: Option<&SortState>,
) -> Vec<u16> {
    descriptors
        .iter()
        .map(|descriptor| {
            let (label, marker) = header_parts(descriptor, sort);
            let header_width = display_width(&label)
                .saturating_add(marker.map(|m| display_width(m) + 1).unwrap_or(0));
            let cell_width = rows
                .iter()
                .take(WIDTH_SAMPLE_ROWS)
                .map(|row| display_width(&descriptor.render_cell(row).plain_text()))
                .max()
                .unwrap_or(0);
            header_width
                .max(cell_width)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Rows around the selection used for width measurement
fn width_sample<'a>(rows: &'a [&'a DataRow], selected_row: usize) -> &'a [&'a DataRow] {
    let start = selected_row
        .saturating_sub(WIDTH_SAMPLE_ROWS / 2)
        .min(rows.len().saturating_sub(WIDTH_SAMPLE_ROWS));
    let end = start.saturating_add(WIDTH_SAMPLE_ROWS).min(rows.len());
    &rows[start..end]
}

/// First column to draw so that `selected` fits in `available` cells,
/// moving the current offset as little as possible
pub fn first_visible_column(widths: &[u16], offset: usize, selected: usize, available: u16) -> usize {
    let selected = selected.min(widths.len().saturating_sub(1));
    if selected <= offset {
        return selected;
    }

    let spacing = COLUMN_SPACING as usize;
    let mut start = offset;
    while start < selected {
        let used: usize = widths[start..=selected]
            .iter()
            .map(|w| *w as usize + spacing)
            .sum::<usize>()
            - spacing;
        if used <= available as usize {
            break;
        }
        start += 1;
    }
    start
}

/// Render the results table and return where its header cells landed
pub fn render_table(
    f: &mut Frame,
    area: Rect,
    descriptors: &[ColumnDescriptor],
    rows: &[&DataRow],
    view: &TableViewState,
) -> HeaderHitMap {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ({} rows)", view.title, rows.len()));

    if descriptors.is_empty() || rows.is_empty() {
        let empty = Paragraph::new("No results found")
            .block(block)
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(empty, area);
        return HeaderHitMap::default();
    }

    let widths = calculate_column_widths(
        descriptors,
        width_sample(rows, view.selected_row),
        view.sort.as_ref(),
    );
    let row_number_width = if view.show_row_numbers {
        display_width(&rows.len().to_string()).max(1)
    } else {
        0
    };
    let reserved = if view.show_row_numbers {
        row_number_width.saturating_add(COLUMN_SPACING)
    } else {
        0
    };

    // Inside the borders
    let inner_x = area.x.saturating_add(1);
    let inner_right = area.right().saturating_sub(1);
    let header_y = area.y.saturating_add(1);
    let available = inner_right.saturating_sub(inner_x).saturating_sub(reserved);
    let column_offset =
        first_visible_column(&widths, view.column_offset, view.selected_column, available);

    // Header cells and their screen spans, for the columns that fit
    let mut x = inner_x.saturating_add(reserved);
    let mut header_cells: Vec<Cell> = Vec::new();
    let mut spans: Vec<HeaderSpan> = Vec::new();

    if view.show_row_numbers {
        header_cells.push(Cell::from("#").style(Style::default().fg(Color::Magenta)));
    }

    for (idx, descriptor) in descriptors.iter().enumerate().skip(column_offset) {
        if x >= inner_right {
            break;
        }
        // The last column may be cut off at the border
        let width = widths[idx].min(inner_right - x);
        let (label, marker) = header_parts(descriptor, view.sort.as_ref());

        let mut style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        if idx == view.selected_column {
            style = style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
        }

        let icon = marker.map(|m| {
            let icon_width = display_width(m).min(width);
            let start = x.saturating_add(width - icon_width);
            (start, start.saturating_add(icon_width))
        });

        let cell = match marker {
            Some(m) => {
                let padding = width.saturating_sub(display_width(&label).saturating_add(display_width(m)));
                Cell::from(Line::from(vec![
                    Span::styled(label, style),
                    Span::raw(" ".repeat(padding as usize)),
                    Span::styled(m, Style::default().fg(Color::Magenta)),
                ]))
            }
            None => Cell::from(label).style(style),
        };
        header_cells.push(cell);

        spans.push(HeaderSpan {
            column: idx,
            x_start: x,
            x_end: x.saturating_add(width),
            icon,
        });
        x = x.saturating_add(width).saturating_add(COLUMN_SPACING);
    }

    let shown = &descriptors[column_offset..column_offset + spans.len()];

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut cells: Vec<Cell> = Vec::with_capacity(shown.len() + 1);
            if view.show_row_numbers {
                cells.push(
                    Cell::from((row_idx + 1).to_string()).style(Style::default().fg(Color::DarkGray)),
                );
            }
            cells.extend(shown.iter().map(|d| to_cell(d.render_cell(row))));
            Row::new(cells)
        })
        .collect();

    let mut constraints: Vec<Constraint> = Vec::with_capacity(spans.len() + 1);
    if view.show_row_numbers {
        constraints.push(Constraint::Length(row_number_width));
    }
    constraints.extend(spans.iter().map(|s| Constraint::Length(s.x_end - s.x_start)));

    let table = Table::new(data_rows, constraints)
        .header(Row::new(header_cells))
        .block(block)
        .column_spacing(COLUMN_SPACING)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    state.select(Some(view.selected_row.min(rows.len() - 1)));
    f.render_stateful_widget(table, area, &mut state);

    HeaderHitMap {
        header_y: Some(header_y),
        column_offset,
        spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{ColumnDescriptorBuilder, ColumnFormattingState, ColumnInputs, DisplayTokens};
    use crate::data::datatable::{DataValue, GenericDataType};
    use crate::preferences::InMemoryPreferenceStore;
    use crate::services::{
        DatabaseDateTimeFormatter, MarkupSpan, MarkupStyle, TerminalMarkupRenderer,
    };
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn wide_table(columns: usize) -> (Vec<ColumnDescriptor>, Arc<Vec<DataRow>>) {
        let names: Vec<String> = (0..columns).map(|i| format!("c{}", i)).collect();
        let row: DataRow = names
            .iter()
            .map(|name| (name.clone(), DataValue::String("x".repeat(60))))
            .collect();
        let rows = Arc::new(vec![row]);
        let inputs = ColumnInputs {
            column_types: vec![GenericDataType::String; columns],
            columns: names,
            ..ColumnInputs::default()
        };
        let mut builder = ColumnDescriptorBuilder::new(
            DisplayTokens::default(),
            Arc::new(DatabaseDateTimeFormatter::new()),
            Arc::new(TerminalMarkupRenderer::new()),
        );
        let formatting = ColumnFormattingState::new(Arc::new(InMemoryPreferenceStore::new()));
        let descriptors = builder.build(&inputs, &rows, &formatting).to_vec();
        (descriptors, rows)
    }

    fn draw(descriptors: &[ColumnDescriptor], rows: &[DataRow], view: &TableViewState) -> HeaderHitMap {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        let row_refs: Vec<&DataRow> = rows.iter().collect();
        let mut map = HeaderHitMap::default();
        terminal
            .draw(|f| {
                let area = f.area();
                map = render_table(f, area, descriptors, &row_refs, view);
            })
            .unwrap();
        map
    }

    #[test]
    fn test_wide_table_only_maps_columns_on_screen() {
        let (descriptors, rows) = wide_table(2000);
        let map = draw(&descriptors, &rows, &TableViewState::default());

        assert_eq!(map.column_offset(), 0);
        // 118 inner cells hold two 40-wide columns and part of a third
        assert_eq!(map.visible_columns(), 0..3);
        assert!(map.header_rect(0).is_some());
        assert!(map.header_rect(1999).is_none());
        let last = map.header_rect(2).unwrap();
        assert!(last.right() <= 119);
    }

    #[test]
    fn test_selection_scrolls_columns_into_view() {
        let (descriptors, rows) = wide_table(2000);
        let view = TableViewState {
            selected_column: 1999,
            ..TableViewState::default()
        };
        let map = draw(&descriptors, &rows, &view);

        assert!(map.column_offset() > 0);
        let rect = map.header_rect(1999).unwrap();
        assert_eq!(
            map.hit(rect.x, rect.y),
            Some(HeaderClick {
                column: 1999,
                target: HeaderTarget::Label
            })
        );
    }

    #[test]
    fn test_first_visible_column_moves_minimally() {
        let widths = [10, 10, 10, 10];
        // Everything fits
        assert_eq!(first_visible_column(&widths, 0, 3, 50), 0);
        // Room for two columns (10 + 1 + 10)
        assert_eq!(first_visible_column(&widths, 0, 3, 21), 2);
        // Moving left past the offset scrolls back
        assert_eq!(first_visible_column(&widths, 2, 1, 21), 1);
        // Out-of-range selection is clamped
        assert_eq!(first_visible_column(&widths, 0, 99, 21), 2);
        assert_eq!(first_visible_column(&[], 3, 0, 21), 0);
    }

    #[test]
    fn test_width_sample_follows_selection() {
        let row = DataRow::new();
        let rows: Vec<&DataRow> = (0..500).map(|_| &row).collect();
        assert_eq!(width_sample(&rows, 0).len(), WIDTH_SAMPLE_ROWS);
        assert_eq!(width_sample(&rows, 10_000).len(), WIDTH_SAMPLE_ROWS);
        assert_eq!(width_sample(&rows[..3], 2).len(), 3);
    }

    #[test]
    fn test_hit_map_distinguishes_icon_from_label() {
        let map = HeaderHitMap {
            header_y: Some(1),
            column_offset: 0,
            spans: vec![
                HeaderSpan {
                    column: 0,
                    x_start: 1,
                    x_end: 10,
                    icon: None,
                },
                HeaderSpan {
                    column: 1,
                    x_start: 11,
                    x_end: 25,
                    icon: Some((22, 25)),
                },
            ],
        };

        assert_eq!(
            map.hit(3, 1),
            Some(HeaderClick {
                column: 0,
                target: HeaderTarget::Label
            })
        );
        assert_eq!(
            map.hit(12, 1),
            Some(HeaderClick {
                column: 1,
                target: HeaderTarget::Label
            })
        );
        assert_eq!(
            map.hit(23, 1),
            Some(HeaderClick {
                column: 1,
                target: HeaderTarget::FormattingIcon
            })
        );
        assert_eq!(map.hit(10, 1), None);
        assert_eq!(map.hit(3, 2), None);
        assert_eq!(map.header_rect(1), Some(Rect::new(11, 1, 14, 1)));
    }

    #[test]
    fn test_markup_line_styles() {
        let markup_src = vec![
            MarkupSpan {
                text: "a".to_string(),
                style: MarkupStyle::default(),
            },
            MarkupSpan {
                text: "b".to_string(),
                style: MarkupStyle {
                    bold: true,
                    ..MarkupStyle::default()
                },
            },
        ];
        let renderer = crate::services::TerminalMarkupRenderer::new();
        let markup = crate::services::MarkupRenderer::render(&renderer, "a<b>b</b>");
        assert_eq!(markup.spans(), markup_src.as_slice());

        let line = markup_line(&markup);
        assert_eq!(line.spans.len(), 2);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }
}
