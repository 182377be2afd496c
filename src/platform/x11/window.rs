// src/platform/x11/window.rs

use super::connection::Connection;
use super::graphics::Palette;
use crate::geometry::{Point, Size};
use anyhow::{anyhow, Result};
use log::{debug, trace};
use std::mem;

// X11 library imports
use libc::c_uint;
use x11::xlib;

/// A borderless-to-the-WM, override-redirect popup window.
///
/// The window manager never sees it, so it gets no decorations, no focus and
/// no placement of its own: it appears exactly at the requested origin.
#[derive(Debug)]
pub struct PopupWindow {
    id: xlib::Window,
    display: *mut xlib::Display, // Needed for XDestroyWindow
}

impl PopupWindow {
    /// Creates (but does not map) the window and subscribes to expose and
    /// button-press events.
    pub fn create(
        connection: &Connection,
        origin: Point,
        size: Size,
        border_size: u32,
        palette: &Palette,
    ) -> Result<Self> {
        let display = connection.display();
        // X rejects zero-sized windows.
        let width = size.width.max(1);
        let height = size.height.max(1);

        // SAFETY: Xlib calls with a live display and its default visual.
        let id = unsafe {
            let mut attributes: xlib::XSetWindowAttributes = mem::zeroed();
            attributes.override_redirect = xlib::True;
            attributes.background_pixel = palette.background.pixel();
            attributes.border_pixel = palette.border.pixel();

            xlib::XCreateWindow(
                display,
                connection.root(),
                origin.x,
                origin.y,
                width as c_uint,
                height as c_uint,
                border_size as c_uint,
                connection.depth(),
                xlib::CopyFromParent as c_uint,
                connection.visual(),
                xlib::CWOverrideRedirect | xlib::CWBackPixel | xlib::CWBorderPixel,
                &mut attributes,
            )
        };
        if id == 0 {
            return Err(anyhow!("XCreateWindow failed"));
        }

        unsafe {
            xlib::XSelectInput(display, id, xlib::ExposureMask | xlib::ButtonPressMask);
        }
        debug!(
            "Popup window {} created at ({}, {}) size {}x{} border {}",
            id, origin.x, origin.y, width, height, border_size
        );

        Ok(Self { id, display })
    }

    #[inline]
    pub fn id(&self) -> xlib::Window {
        self.id
    }

    pub fn map(&self) {
        unsafe { xlib::XMapWindow(self.display, self.id) };
        debug!("Popup window {} mapped", self.id);
    }

    pub fn clear(&self) {
        unsafe { xlib::XClearWindow(self.display, self.id) };
    }
}

impl Drop for PopupWindow {
    fn drop(&mut self) {
        if self.id != 0 && !self.display.is_null() {
            trace!("Destroying popup window {}", self.id);
            unsafe { xlib::XDestroyWindow(self.display, self.id) };
            self.id = 0;
        }
    }
}
