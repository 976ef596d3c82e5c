//! Rendering of HTML cell content into trusted, terminal-safe markup.
//!
//! Column rendering never inspects HTML itself; it hands strings to a
//! [`MarkupRenderer`] and displays whatever comes back.

use scraper::{ElementRef, Html, Node};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    pub text: String,
    pub style: MarkupStyle,
}

/// Sanitized markup: styled text runs with all active content removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    spans: Vec<MarkupSpan>,
}

impl Markup {
    pub fn spans(&self) -> &[MarkupSpan] {
        &self.spans
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn push(&mut self, text: &str, style: MarkupStyle) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if last.style == style {
                last.text.push_str(text);
                return;
            }
        }
        self.spans.push(MarkupSpan {
            text: text.to_string(),
            style,
        });
    }
}

/// Turns untrusted HTML into trusted markup
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, source: &str) -> Markup;
}

/// Keeps inline emphasis, strips every other tag and drops script/style bodies.
///
/// The source is parsed as an HTML fragment, so quoted attributes, comments
/// and character references are handled by the parser rather than by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalMarkupRenderer;

impl TerminalMarkupRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// Subtrees whose text is never shown
fn is_hidden(tag: &str) -> bool {
    matches!(
        tag,
        "script" | "style" | "iframe" | "object" | "template" | "noscript" | "head" | "title"
    )
}

fn styled(tag: &str, mut style: MarkupStyle) -> MarkupStyle {
    match tag {
        "b" | "strong" => style.bold = true,
        "i" | "em" => style.italic = true,
        "u" | "a" | "ins" => style.underline = true,
        _ => {}
    }
    style
}

fn walk(element: ElementRef<'_>, style: MarkupStyle, markup: &mut Markup) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => markup.push(text, style),
            Node::Element(el) => {
                let tag = el.name();
                if tag == "br" {
                    markup.push(" ", style);
                } else if !is_hidden(tag) {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        walk(child_element, styled(tag, style), markup);
                    }
                }
            }
            _ => {}
        }
    }
}

impl MarkupRenderer for TerminalMarkupRenderer {
    fn render(&self, source: &str) -> Markup {
        let mut markup = Markup::default();
        if source.is_empty() {
            return markup;
        }
        let fragment = Html::parse_fragment(source);
        walk(fragment.root_element(), MarkupStyle::default(), &mut markup);
        markup
    }
}
