use crate::services::{labels, ClipboardSink, Translator};
use crate::ui::header_events::{HeaderAction, HeaderClick, HeaderTarget};
use crate::ui::result_table::ResultTable;
use crate::ui::table_renderer::{render_table, HeaderHitMap, TableViewState};
use crate::widgets::column_formatting_popover::PopoverAction;
use crate::widgets::debounced_input::{SearchBox, SearchBoxAction};
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct TuiApp {
    table: ResultTable,
    search: SearchBox,
    translator: Arc<dyn Translator>,
    clipboard: Box<dyn ClipboardSink>,
    view: TableViewState,
    hit_map: HeaderHitMap,
    status_message: String,
    show_help: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(
        table: ResultTable,
        translator: Arc<dyn Translator>,
        clipboard: Box<dyn ClipboardSink>,
        debounce_ms: u64,
        title: impl Into<String>,
    ) -> Self {
        let search = SearchBox::new(translator.t(labels::SEARCH), debounce_ms);
        Self {
            table,
            search,
            translator,
            clipboard,
            view: TableViewState {
                title: title.into(),
                ..TableViewState::default()
            },
            hit_map: HeaderHitMap::default(),
            status_message: "Ready - '/' filter, 'y' copy, 'f' column formatting, F1 help".to_string(),
            show_help: false,
            should_quit: false,
        }
    }

    pub fn with_row_numbers(mut self, show: bool) -> Self {
        self.view.show_row_numbers = show;
        self
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.table.set_visible(true);

        while !self.should_quit {
            self.tick();
            terminal.draw(|f| self.ui(f))?;

            // Poll faster while a filter is waiting to fire
            let timeout = if self.search.is_pending() {
                Duration::from_millis(25)
            } else {
                Duration::from_millis(250)
            };

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        self.table.set_visible(false);
        Ok(())
    }

    /// Apply debounced filter text, if any is due
    pub fn tick(&mut self) {
        if let Some(text) = self.search.check_debounce() {
            self.apply_filter(&text);
        }
    }

    fn apply_filter(&mut self, text: &str) {
        self.table.set_filter_text(text);
        self.view.selected_row = 0;
        let count = self.table.visible_indices().len();
        self.status_message = if text.is_empty() {
            format!("{} rows", count)
        } else {
            format!("{} rows match '{}'", count, text)
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.table.popover().is_open() {
            match self.table.popover_mut().handle_key(key) {
                PopoverAction::Select { column, mode } => {
                    if self.table.select_mode(&column, mode) {
                        self.status_message = format!("{}: {:?}", column, mode);
                    }
                }
                PopoverAction::Close | PopoverAction::Continue => {}
                PopoverAction::PassThrough => self.handle_table_key(key),
            }
            return;
        }

        if self.search.is_active() {
            match self.search.handle_key(key) {
                SearchBoxAction::Confirm(text) => self.apply_filter(&text),
                SearchBoxAction::Cancel => self.apply_filter(""),
                SearchBoxAction::InputChanged(_) | SearchBoxAction::Continue => {}
                SearchBoxAction::PassThrough => self.handle_table_key(key),
            }
            return;
        }

        self.handle_table_key(key);
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let row_count = self.table.visible_indices().len();
        let column_count = self.table.columns().len();

        match key.code {
            KeyCode::Esc if self.show_help => self.show_help = false,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) | KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('/') => self.search.activate(),
            KeyCode::Char('y') => self.copy_visible(),
            KeyCode::Char('f') => {
                if !self.table.open_formatting(self.view.selected_column) {
                    self.status_message = "Column has no formatting options".to_string();
                }
            }
            KeyCode::Char('s') => {
                let id = self
                    .table
                    .columns()
                    .get(self.view.selected_column)
                    .map(|d| d.id.clone());
                if let Some(id) = id {
                    self.table.sort_by(&id);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.view.selected_row + 1 < row_count {
                    self.view.selected_row += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.view.selected_row = self.view.selected_row.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.view.selected_column + 1 < column_count {
                    self.view.selected_column += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.view.selected_column = self.view.selected_column.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.view.selected_row = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.view.selected_row = row_count.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (x, y) = (mouse.column, mouse.row);

        // The overlay sits above the header, so it gets the click first
        let click = if self.table.popover().contains(x, y) {
            self.table.popover().column_index().map(|column| HeaderClick {
                column,
                target: HeaderTarget::Overlay(self.table.popover().option_at(x, y)),
            })
        } else {
            self.hit_map.hit(x, y)
        };

        let Some(click) = click else {
            self.table.popover_mut().close();
            return;
        };

        if !matches!(click.target, HeaderTarget::Overlay(_)) {
            self.view.selected_column = click.column;
        }

        for action in self.table.click_header(click) {
            match action {
                HeaderAction::ModeChanged { column, mode } => {
                    self.status_message = format!("{}: {:?}", column, mode);
                }
                HeaderAction::Sort(column) => {
                    self.view.selected_row = 0;
                    self.status_message = format!("Sorted by {}", column);
                }
                HeaderAction::OpenFormatting(_) | HeaderAction::CloseFormatting => {}
            }
        }
    }

    fn copy_visible(&mut self) {
        match self.table.copy_to(self.clipboard.as_mut()) {
            Ok(count) => {
                self.status_message = format!("{}: {} rows", self.translator.t(labels::COPY), count);
            }
            Err(e) => {
                error!(target: "clipboard", "Copy failed: {:#}", e);
                self.status_message = format!("Copy failed: {}", e);
            }
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.search.render(f, chunks[0]);

        self.view.sort = self.table.sort_state().cloned();
        let descriptors = self.table.columns().to_vec();
        let rows = self.table.filtered_rows();
        self.hit_map = render_table(f, chunks[1], &descriptors, &rows, &self.view);
        self.view.column_offset = self.hit_map.column_offset();

        let status = Paragraph::new(self.status_message.as_str())
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(status, chunks[2]);

        if let Some(anchor) = self
            .table
            .popover()
            .column_index()
            .and_then(|idx| self.hit_map.header_rect(idx))
        {
            let translator = Arc::clone(&self.translator);
            self.table
                .popover_mut()
                .render(f, anchor, chunks[1], translator.as_ref());
        }

        if self.show_help {
            self.render_help(f);
        }
    }

    fn render_help(&self, f: &mut Frame) {
        let area = centered_rect(60, 60, f.area());
        let help_text = vec![
            Line::from("Keys"),
            Line::from(""),
            Line::from("  /            Filter rows (Enter apply, Esc clear)"),
            Line::from("  y            Copy visible rows as TSV"),
            Line::from("  f            Column formatting for temporal columns"),
            Line::from("  s            Sort by current column (again to reverse)"),
            Line::from("  arrows/hjkl  Move selection"),
            Line::from("  g / G        First / last row"),
            Line::from("  q            Quit"),
            Line::from(""),
            Line::from("Mouse: click a header to sort, click [F]/[O] to change formatting"),
        ];

        let help_popup = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(ratatui::widgets::Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(help_popup, area);
    }
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn run_tui_app(mut app: TuiApp) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(target: "app", "Starting TUI");
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(target: "app", "TUI exited with error: {:#}", err);
    }
    res
}
