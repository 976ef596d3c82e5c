use anyhow::Result;
use arboard::Clipboard;
use tracing::debug;

/// Destination for copied text
pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// System clipboard. The handle is opened lazily so headless sessions can
/// still start and only fail when a copy is attempted.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text)?;
        }
        debug!(target: "clipboard", "Copied {} bytes to system clipboard", text.len());
        Ok(())
    }
}

/// Keeps the last copied payload in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
