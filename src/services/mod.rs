//! Collaborators consumed by the column layer
//!
//! Each one is a trait with a default implementation so callers can inject
//! their own (tests use in-memory variants).

pub mod clipboard;
pub mod markup;
pub mod time_formatter;
pub mod translator;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use markup::{Markup, MarkupRenderer, MarkupSpan, MarkupStyle, TerminalMarkupRenderer};
pub use time_formatter::{DatabaseDateTimeFormatter, TimeFormatter, DATABASE_DATETIME};
pub use translator::{labels, LabelCatalog, Translator};
