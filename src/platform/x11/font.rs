// src/platform/x11/font.rs

//! Xft font loading and measurement.

use super::connection::Connection;
use crate::wrap::FontMetrics;
use anyhow::{anyhow, Context, Result};
use log::{debug, trace, warn};
use std::ffi::CString;
use std::mem;
use std::ptr;

use libc::c_int;
use x11::xrender::XGlyphInfo;
use x11::{xft, xlib};

/// Wraps an `XftFont` pointer and closes it via `XftFontClose` on drop.
#[derive(Debug)]
pub struct XftFontHandle {
    ptr: *mut xft::XftFont,
    display: *mut xlib::Display, // Needed for XftFontClose and extents
}

impl XftFontHandle {
    /// Opens the font matching a fontconfig `pattern`, e.g. `"monospace:size=10"`.
    pub fn open(connection: &Connection, pattern: &str) -> Result<Self> {
        let pattern_cstr =
            CString::new(pattern).context("Font pattern contains an interior NUL byte")?;
        let display = connection.display();

        // SAFETY: `display` and `screen` come from a live connection.
        let ptr =
            unsafe { xft::XftFontOpenName(display, connection.screen(), pattern_cstr.as_ptr()) };
        if ptr.is_null() {
            return Err(anyhow!("Cannot open font '{}'", pattern));
        }

        let font = Self { ptr, display };
        debug!(
            "Font '{}' loaded: ascent={}, descent={}, max_advance={}",
            pattern,
            font.ascent(),
            font.descent(),
            font.max_advance_width()
        );
        Ok(font)
    }

    #[inline]
    pub(super) fn raw(&self) -> *mut xft::XftFont {
        self.ptr
    }
}

/// Code points measured per Xft call. Extents are 16-bit, so a chunk must
/// stay under 32767px even with wide glyphs.
const MEASURE_CHUNK_CHARS: usize = 128;

impl XftFontHandle {
    fn extents(&self, text: &str) -> XGlyphInfo {
        let mut extents: XGlyphInfo = unsafe { mem::zeroed() };
        // SAFETY: `text` is valid UTF-8 of the given length and the font is open.
        unsafe {
            xft::XftTextExtentsUtf8(
                self.display,
                self.ptr,
                text.as_ptr(),
                text.len() as c_int,
                &mut extents,
            );
        }
        extents
    }
}

impl FontMetrics for XftFontHandle {
    /// Sums the advances of all but the last chunk and adds the last chunk's
    /// ink width.
    fn text_width(&self, text: &str) -> u32 {
        let mut total: u32 = 0;
        let mut rest = text;
        loop {
            let split = rest
                .char_indices()
                .nth(MEASURE_CHUNK_CHARS)
                .map_or(rest.len(), |(index, _)| index);
            let (chunk, tail) = rest.split_at(split);
            let extents = self.extents(chunk);
            if tail.is_empty() {
                return total.saturating_add(extents.width as u32);
            }
            total = total.saturating_add(extents.xOff.max(0) as u32);
            rest = tail;
        }
    }

    fn max_advance_width(&self) -> u32 {
        unsafe { (*self.ptr).max_advance_width.max(0) as u32 }
    }

    fn ascent(&self) -> i32 {
        unsafe { (*self.ptr).ascent }
    }

    fn descent(&self) -> i32 {
        unsafe { (*self.ptr).descent }
    }
}

impl Drop for XftFontHandle {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        if self.display.is_null() {
            warn!(
                "XftFontHandle dropped with a null display; cannot close font {:p}",
                self.ptr
            );
            return;
        }
        trace!("Closing XftFont {:p}", self.ptr);
        unsafe { xft::XftFontClose(self.display, self.ptr) };
        self.ptr = ptr::null_mut();
    }
}
