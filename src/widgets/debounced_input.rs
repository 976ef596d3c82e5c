//! Debounced filter input
//!
//! Filtering runs over every row, so keystrokes are coalesced and only the
//! text that stays unchanged for the debounce delay is applied.

use crate::utils::debouncer::Debouncer;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Instant;
use tui_input::{backend::crossterm::EventHandler, Input};

/// Result of handling a key in the search box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchBoxAction {
    /// Key consumed, text unchanged
    Continue,
    /// Text changed; the filter will follow after the debounce delay
    InputChanged(String),
    /// Enter: apply this text now
    Confirm(String),
    /// Esc: filter cleared
    Cancel,
    /// Not ours, let the parent handle it
    PassThrough,
}

pub struct SearchBox {
    input: Input,
    debouncer: Debouncer<String>,
    /// Text most recently handed to the filter
    last_applied: Option<String>,
    title: String,
    style: Style,
    active: bool,
}

impl SearchBox {
    pub fn new(title: impl Into<String>, debounce_ms: u64) -> Self {
        Self {
            input: Input::default(),
            debouncer: Debouncer::new(debounce_ms),
            last_applied: None,
            title: title.into(),
            style: Style::default().fg(Color::Cyan),
            active: false,
        }
    }

    /// Focus the box, keeping the current text so the filter can be refined
    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SearchBoxAction {
        self.handle_key_at(key, Instant::now())
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) -> SearchBoxAction {
        if !self.active {
            return SearchBoxAction::PassThrough;
        }

        match key.code {
            KeyCode::Esc => {
                self.input.reset();
                self.debouncer.cancel();
                self.last_applied = Some(String::new());
                self.deactivate();
                SearchBoxAction::Cancel
            }
            KeyCode::Enter => {
                let text = self.input.value().to_string();
                self.debouncer.cancel();
                self.last_applied = Some(text.clone());
                self.deactivate();
                SearchBoxAction::Confirm(text)
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                SearchBoxAction::PassThrough
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                let text = self.input.value().to_string();

                if text != before {
                    self.debouncer.call_at(now, text.clone());
                    SearchBoxAction::InputChanged(text)
                } else {
                    SearchBoxAction::Continue
                }
            }
        }
    }

    /// Text to filter by, once the debounce delay has passed.
    /// Call this from the event loop on every tick.
    pub fn check_debounce(&mut self) -> Option<String> {
        self.check_debounce_at(Instant::now())
    }

    pub fn check_debounce_at(&mut self, now: Instant) -> Option<String> {
        let text = self.debouncer.poll_at(now)?;
        if self.last_applied.as_ref() == Some(&text) {
            return None;
        }
        self.last_applied = Some(text.clone());
        Some(text)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let title = if self.debouncer.is_pending() {
            format!("{} (typing...)", self.title)
        } else {
            self.title.clone()
        };

        let border_style = if self.active {
            self.style
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        let input_widget = Paragraph::new(self.input.value())
            .block(block)
            .style(self.style);

        f.render_widget(input_widget, area);

        if self.active {
            f.set_cursor_position((area.x + self.input.visual_cursor() as u16 + 1, area.y + 1));
        }
    }
}
