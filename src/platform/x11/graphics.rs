// src/platform/x11/graphics.rs

use super::connection::Connection;
use super::font::XftFontHandle;
use crate::config::ColorConfig;
use crate::geometry::baseline_y;
use crate::wrap::DisplayLine;

use anyhow::{anyhow, Context, Result};
use log::{debug, trace, warn};
use std::ffi::CString;
use std::mem;
use std::ptr;

// X11 library imports
use libc::{c_int, c_ulong};
use x11::{xft, xlib};

// --- RAII Wrappers for X11 Resources ---

/// Wraps an `XftDraw` pointer to ensure it's destroyed via `XftDrawDestroy` on drop.
#[derive(Debug)]
struct SafeXftDraw {
    ptr: *mut xft::XftDraw,
}

impl Drop for SafeXftDraw {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            trace!("Destroying XftDraw {:p}", self.ptr);
            unsafe { xft::XftDrawDestroy(self.ptr) };
            self.ptr = ptr::null_mut();
        }
    }
}

/// An allocated `XftColor`, freed via `XftColorFree` on drop.
#[derive(Debug)]
pub struct SafeXftColor {
    color: xft::XftColor,
    display: *mut xlib::Display,
    visual: *mut xlib::Visual,
    colormap: xlib::Colormap,
}

impl SafeXftColor {
    /// Allocates a color from an X color name or `#rrggbb` spec.
    fn alloc_named(connection: &Connection, name: &str) -> Result<Self> {
        let name_cstr = CString::new(name).context("Color name contains an interior NUL byte")?;
        let mut color: xft::XftColor = unsafe { mem::zeroed() };

        // SAFETY: FFI call with display, visual and colormap from a live connection.
        let ok = unsafe {
            xft::XftColorAllocName(
                connection.display(),
                connection.visual(),
                connection.colormap(),
                name_cstr.as_ptr(),
                &mut color,
            )
        };
        if ok == 0 {
            return Err(anyhow!("Cannot allocate color '{}'", name));
        }
        trace!("Allocated color '{}' as pixel {}", name, color.pixel);

        Ok(Self {
            color,
            display: connection.display(),
            visual: connection.visual(),
            colormap: connection.colormap(),
        })
    }

    #[inline]
    pub fn pixel(&self) -> c_ulong {
        self.color.pixel
    }

    #[inline]
    fn as_ptr(&self) -> *const xft::XftColor {
        &self.color
    }
}

impl Drop for SafeXftColor {
    fn drop(&mut self) {
        if self.display.is_null() || self.visual.is_null() {
            warn!(
                "SafeXftColor dropped without a display; leaking pixel {}",
                self.color.pixel
            );
            return;
        }
        trace!("Freeing XftColor pixel {}", self.color.pixel);
        unsafe { xft::XftColorFree(self.display, self.visual, self.colormap, &mut self.color) };
    }
}

/// The three colors a popup uses.
#[derive(Debug)]
pub struct Palette {
    pub background: SafeXftColor,
    pub border: SafeXftColor,
    pub text: SafeXftColor,
}

impl Palette {
    pub fn alloc(connection: &Connection, colors: &ColorConfig) -> Result<Self> {
        let palette = Palette {
            background: SafeXftColor::alloc_named(connection, &colors.background)?,
            border: SafeXftColor::alloc_named(connection, &colors.border)?,
            text: SafeXftColor::alloc_named(connection, &colors.font)?,
        };
        debug!(
            "Palette allocated: background={}, border={}, text={}",
            palette.background.pixel(),
            palette.border.pixel(),
            palette.text.pixel()
        );
        Ok(palette)
    }
}

/// Vertical rhythm of the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    pub padding: u32,
    pub line_spacing: u32,
    pub text_height: u32,
}

/// Draws text into one window with Xft.
#[derive(Debug)]
pub struct Graphics {
    xft_draw: SafeXftDraw,
    layout: TextLayout,
}

impl Graphics {
    pub fn new(connection: &Connection, window_id: xlib::Window, layout: TextLayout) -> Result<Self> {
        // SAFETY: FFI call. display, window_id, visual, colormap must be valid.
        let ptr = unsafe {
            xft::XftDrawCreate(
                connection.display(),
                window_id,
                connection.visual(),
                connection.colormap(),
            )
        };
        if ptr.is_null() {
            return Err(anyhow!(
                "Failed to create XftDraw object for window ID {}",
                window_id
            ));
        }
        debug!("XftDraw created for window {}: {:p}", window_id, ptr);
        Ok(Self {
            xft_draw: SafeXftDraw { ptr },
            layout,
        })
    }

    /// Draws `lines` top to bottom, one baseline per line.
    pub fn draw_lines(&self, font: &XftFontHandle, color: &SafeXftColor, lines: &[DisplayLine]) {
        let TextLayout {
            padding,
            line_spacing,
            text_height,
        } = self.layout;

        for (index, line) in lines.iter().enumerate() {
            let text = line.as_str();
            let y = baseline_y(index, text_height, line_spacing, padding);
            // SAFETY: draw, color and font are live; `text` is valid UTF-8.
            unsafe {
                xft::XftDrawStringUtf8(
                    self.xft_draw.ptr,
                    color.as_ptr(),
                    font.raw(),
                    padding as c_int,
                    y,
                    text.as_ptr(),
                    text.len() as c_int,
                );
            }
        }
        trace!("Drew {} lines", lines.len());
    }
}
