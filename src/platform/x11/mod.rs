// src/platform/x11/mod.rs

//! Xlib/Xft backend for the popup.
//!
//! Setup happens in two stages. `XSession` holds the connection and font,
//! which are needed to measure text and pick a monitor before the window's
//! size and origin are known. `XSession::create_popup` then consumes the
//! session and produces the mapped-on-demand `XPopup`.

mod connection;
mod event;
mod font;
mod graphics;
mod window;

use self::connection::Connection;
use self::font::XftFontHandle;
use self::graphics::{Graphics, Palette, TextLayout};
use self::window::PopupWindow;

use crate::config::AppearanceConfig;
use crate::geometry::{resolve_monitor, Point, Rect, Size};
use crate::lifecycle::Controls;
use crate::platform::{PopupEvent, PopupSurface};
use crate::signals::IntentPipe;
use crate::wrap::{DisplayLine, FontMetrics};

use anyhow::{Context, Result};
use log::{debug, info};

/// An open X connection with the popup font loaded.
pub struct XSession {
    // Dropped before the connection it was opened on.
    font: XftFontHandle,
    connection: Connection,
}

impl XSession {
    /// Connects to `$DISPLAY` and loads the font named by `pattern`.
    pub fn open(font_pattern: &str) -> Result<Self> {
        let connection = Connection::new()?;
        let font = XftFontHandle::open(&connection, font_pattern)?;
        Ok(Self { font, connection })
    }

    pub fn font(&self) -> &XftFontHandle {
        &self.font
    }

    pub fn screen_size(&self) -> Size {
        self.connection.screen_size()
    }

    /// The monitor under the pointer, or the whole screen when no monitor
    /// contains it.
    pub fn pointer_monitor(&self) -> Result<Rect> {
        let pointer = self.connection.query_pointer()?;
        let monitors = self.connection.monitors();
        let screen = Rect::from_size(self.screen_size());
        let monitor = resolve_monitor(pointer, &monitors, screen);
        debug!("Pointer {:?} resolved to monitor {:?}", pointer, monitor);
        Ok(monitor)
    }

    /// Creates the popup window at `origin` with an inner size of `size`.
    /// The window is not mapped until the surface's `map` is called.
    pub fn create_popup(
        self,
        origin: Point,
        size: Size,
        appearance: &AppearanceConfig,
        controls: Controls,
        intents: IntentPipe,
    ) -> Result<XPopup> {
        let XSession { font, connection } = self;

        let palette = Palette::alloc(&connection, &appearance.colors)?;
        let window =
            PopupWindow::create(&connection, origin, size, appearance.border_size, &palette)?;
        let layout = TextLayout {
            padding: appearance.padding,
            line_spacing: appearance.line_spacing,
            text_height: font.text_height(),
        };
        let graphics = Graphics::new(&connection, window.id(), layout)
            .context("Failed to prepare popup for drawing")?;

        info!(
            "Popup created at ({}, {}) with size {}x{}",
            origin.x, origin.y, size.width, size.height
        );
        Ok(XPopup {
            graphics,
            window,
            palette,
            font,
            intents,
            controls,
            connection,
        })
    }
}

/// The popup window and everything needed to draw it and wait on it.
///
/// Fields drop in declaration order: X resources first, the connection last.
pub struct XPopup {
    graphics: Graphics,
    window: PopupWindow,
    palette: Palette,
    font: XftFontHandle,
    intents: IntentPipe,
    controls: Controls,
    connection: Connection,
}

impl PopupSurface for XPopup {
    fn map(&mut self) -> Result<()> {
        self.window.map();
        self.connection.flush();
        Ok(())
    }

    fn next_event(&mut self) -> Result<PopupEvent> {
        event::next_event(&self.connection, &mut self.intents, &self.controls)
    }

    fn redraw(&mut self, lines: &[DisplayLine]) -> Result<()> {
        self.window.clear();
        self.graphics
            .draw_lines(&self.font, &self.palette.text, lines);
        self.connection.flush();
        Ok(())
    }
}
