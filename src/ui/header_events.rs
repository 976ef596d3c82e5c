//! Header click dispatch.
//!
//! A header carries two interactive parts: the label (sorts the column) and,
//! for temporal columns, a formatting icon that opens an overlay. Handlers
//! run in a fixed order and the overlay handler runs first; once it stops
//! propagation the sort handler never sees the click.

use crate::columns::{ColumnDescriptor, ColumnFormattingState, DisplayMode, HeaderContent};
use crate::widgets::column_formatting_popover::{ColumnFormattingPopover, PopoverAction};
use tracing::debug;

/// What part of the header area was clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTarget {
    Label,
    FormattingIcon,
    /// Inside the open overlay, optionally on one of its options
    Overlay(Option<DisplayMode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderClick {
    /// Position in the descriptor list
    pub column: usize,
    pub target: HeaderTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// Outcomes reported back to the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAction {
    /// Sort by the column with this descriptor id
    Sort(String),
    OpenFormatting(String),
    /// Display mode changed (already applied to the formatting state)
    ModeChanged { column: String, mode: DisplayMode },
    CloseFormatting,
}

pub struct HeaderContext<'a> {
    pub descriptors: &'a [ColumnDescriptor],
    pub popover: &'a mut ColumnFormattingPopover,
    pub formatting: &'a mut ColumnFormattingState,
    pub actions: Vec<HeaderAction>,
}

pub type HeaderHandler = fn(&HeaderClick, &mut HeaderContext<'_>) -> Propagation;

/// Handlers in the order they see a click
pub const HEADER_HANDLERS: [HeaderHandler; 2] = [overlay_handler, sort_handler];

/// Run `click` through the handler chain and collect the resulting actions
pub fn dispatch_header_click(
    click: HeaderClick,
    descriptors: &[ColumnDescriptor],
    popover: &mut ColumnFormattingPopover,
    formatting: &mut ColumnFormattingState,
) -> Vec<HeaderAction> {
    let mut ctx = HeaderContext {
        descriptors,
        popover,
        formatting,
        actions: Vec::new(),
    };

    for handler in HEADER_HANDLERS {
        if handler(&click, &mut ctx) == Propagation::Stop {
            break;
        }
    }

    debug!(target: "header", "{:?} -> {:?}", click, ctx.actions);
    ctx.actions
}

/// Owns the formatting icon and everything inside the overlay
pub fn overlay_handler(click: &HeaderClick, ctx: &mut HeaderContext<'_>) -> Propagation {
    match click.target {
        HeaderTarget::Overlay(choice) => {
            if let Some(mode) = choice {
                if let PopoverAction::Select { column, mode } = ctx.popover.choose(mode) {
                    if ctx.formatting.select(&column, mode) {
                        ctx.actions.push(HeaderAction::ModeChanged { column, mode });
                    }
                }
            }
            Propagation::Stop
        }
        HeaderTarget::FormattingIcon => {
            let Some(descriptor) = ctx.descriptors.get(click.column) else {
                return Propagation::Stop;
            };
            if let HeaderContent::TemporalToggle { column, .. } = &descriptor.header {
                if ctx.popover.is_open() && ctx.popover.column() == Some(column.as_str()) {
                    ctx.popover.close();
                    ctx.actions.push(HeaderAction::CloseFormatting);
                } else {
                    ctx.popover
                        .open(column.clone(), click.column, ctx.formatting.mode_of(column));
                    ctx.actions.push(HeaderAction::OpenFormatting(column.clone()));
                }
                return Propagation::Stop;
            }
            // No toggle on this column: the icon area is just part of the label
            Propagation::Continue
        }
        HeaderTarget::Label => {
            // Clicking elsewhere dismisses the overlay but still reaches the header
            if ctx.popover.is_open() {
                ctx.popover.close();
                ctx.actions.push(HeaderAction::CloseFormatting);
            }
            Propagation::Continue
        }
    }
}

/// The header's own click behavior: sort by the column
pub fn sort_handler(click: &HeaderClick, ctx: &mut HeaderContext<'_>) -> Propagation {
    if let Some(descriptor) = ctx.descriptors.get(click.column) {
        ctx.actions.push(HeaderAction::Sort(descriptor.id.clone()));
    }
    Propagation::Stop
}
