// src/platform/mod.rs

//! The seam between the popup lifecycle and the windowing system.
//!
//! `PopupSurface` is everything the lifecycle controller needs from a
//! windowing backend. The X11 implementation lives in [`x11`]; tests drive
//! the controller through [`mock::MockSurface`].

use crate::wrap::DisplayLine;
use anyhow::Result;

#[cfg(test)]
pub mod mock;
pub mod x11;

/// Events the popup reacts to, already translated from the native protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEvent {
    /// The window contents were lost and must be drawn again.
    Redraw,
    /// A pointer button was pressed over the popup, or a routed signal was
    /// translated into the equivalent press.
    Button(u32),
}

/// A mapped-on-demand popup window that can block for input.
pub trait PopupSurface {
    /// Makes the window visible.
    fn map(&mut self) -> Result<()>;

    /// Blocks until the next event the popup cares about.
    fn next_event(&mut self) -> Result<PopupEvent>;

    /// Clears the window and draws `lines` from the top.
    fn redraw(&mut self, lines: &[DisplayLine]) -> Result<()>;
}
