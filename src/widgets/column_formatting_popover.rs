use crate::columns::DisplayMode;
use crate::services::{labels, Translator};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const OPTIONS: [DisplayMode; 2] = [DisplayMode::Formatted, DisplayMode::Original];
const POPOVER_WIDTH: u16 = 24;
const POPOVER_HEIGHT: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverAction {
    Continue,
    Select { column: String, mode: DisplayMode },
    Close,
    PassThrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PopoverAnchor {
    column: String,
    column_index: usize,
}

/// Overlay anchored to a temporal column header offering
/// "Formatted date" / "Original value"
#[derive(Debug, Default)]
pub struct ColumnFormattingPopover {
    anchor: Option<PopoverAnchor>,
    highlighted: usize,
    /// Where the overlay was last drawn, for mouse hit-testing
    last_area: Option<Rect>,
}

impl ColumnFormattingPopover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, column: impl Into<String>, column_index: usize, current: DisplayMode) {
        self.anchor = Some(PopoverAnchor {
            column: column.into(),
            column_index,
        });
        self.highlighted = OPTIONS.iter().position(|m| *m == current).unwrap_or(0);
    }

    pub fn close(&mut self) {
        self.anchor = None;
        self.last_area = None;
    }

    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn column(&self) -> Option<&str> {
        self.anchor.as_ref().map(|a| a.column.as_str())
    }

    pub fn column_index(&self) -> Option<usize> {
        self.anchor.as_ref().map(|a| a.column_index)
    }

    pub fn highlighted(&self) -> DisplayMode {
        OPTIONS[self.highlighted]
    }

    /// Choose a mode; the overlay stays anchored to the same column
    pub fn choose(&mut self, mode: DisplayMode) -> PopoverAction {
        match &self.anchor {
            Some(anchor) => {
                self.highlighted = OPTIONS.iter().position(|m| *m == mode).unwrap_or(0);
                PopoverAction::Select {
                    column: anchor.column.clone(),
                    mode,
                }
            }
            None => PopoverAction::PassThrough,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PopoverAction {
        if !self.is_open() {
            return PopoverAction::PassThrough;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.close();
                PopoverAction::Close
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') | KeyCode::Char('k') => {
                self.highlighted = (self.highlighted + 1) % OPTIONS.len();
                PopoverAction::Continue
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.choose(self.highlighted()),
            KeyCode::Char('f') => self.choose(DisplayMode::Formatted),
            KeyCode::Char('o') => self.choose(DisplayMode::Original),
            // Swallow everything else so keys don't leak to the table behind
            _ => PopoverAction::Continue,
        }
    }

    /// Is the point inside the drawn overlay
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.last_area
            .is_some_and(|area| area.contains(Position { x, y }))
    }

    /// Which option row sits under the point, if any
    pub fn option_at(&self, x: u16, y: u16) -> Option<DisplayMode> {
        let area = self.last_area?;
        if !self.contains(x, y) {
            return None;
        }
        // Border row first, options on the following rows
        let row = y.checked_sub(area.y + 1)? as usize;
        OPTIONS.get(row).copied()
    }

    /// Draw below `anchor` (the header cell), clamped to `bounds`
    pub fn render(&mut self, f: &mut Frame, anchor: Rect, bounds: Rect, translator: &dyn Translator) {
        if !self.is_open() {
            return;
        }

        let width = POPOVER_WIDTH.min(bounds.width);
        let height = POPOVER_HEIGHT.min(bounds.height);
        let max_x = bounds.x + bounds.width.saturating_sub(width);
        let max_y = bounds.y + bounds.height.saturating_sub(height);
        let area = Rect {
            x: anchor.x.min(max_x),
            y: (anchor.y + 1).min(max_y),
            width,
            height,
        };

        let lines: Vec<Line> = OPTIONS
            .iter()
            .enumerate()
            .map(|(idx, mode)| {
                let label = match mode {
                    DisplayMode::Formatted => translator.t(labels::FORMATTED_DATE),
                    DisplayMode::Original => translator.t(labels::ORIGINAL_VALUE),
                };
                let marker = if idx == self.highlighted { "> " } else { "  " };
                let style = if idx == self.highlighted {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![Span::raw(marker), Span::styled(label, style)])
            })
            .collect();

        let popup = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(translator.t(labels::COLUMN_FORMATTING))
                .border_style(Style::default().fg(Color::Cyan)),
        );

        f.render_widget(Clear, area);
        f.render_widget(popup, area);
        self.last_area = Some(area);
    }
}
