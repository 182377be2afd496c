// src/platform/x11/connection.rs

use crate::geometry::{Point, Rect, Size};
use anyhow::{anyhow, Result};
use log::{debug, info, trace, warn};
use std::os::unix::io::RawFd;
use std::ptr;
use std::slice;

// X11 library imports
use libc::{c_int, c_uint, c_void};
use x11::{xinerama, xlib};

/// Owns the raw `*mut xlib::Display` and closes it on drop.
#[derive(Debug)]
struct ManagedDisplay {
    ptr: *mut xlib::Display,
}

impl ManagedDisplay {
    /// Opens the display named by `$DISPLAY`.
    fn open() -> Result<Self> {
        let display_ptr = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display_ptr.is_null() {
            Err(anyhow!("Cannot open display"))
        } else {
            debug!("X display opened: {:p}", display_ptr);
            Ok(Self { ptr: display_ptr })
        }
    }

    #[inline]
    fn raw(&self) -> *mut xlib::Display {
        self.ptr
    }
}

impl Drop for ManagedDisplay {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            debug!("Closing X11 display connection: {:p}", self.ptr);
            let status = unsafe { xlib::XCloseDisplay(self.ptr) };
            if status != 0 {
                warn!("XCloseDisplay returned non-zero status: {}", status);
            }
        }
    }
}

/// The connection to the X server plus the default screen's visual,
/// colormap and root window.
///
/// Every other X resource borrows the display pointer from here, so a
/// `Connection` must outlive them all.
#[derive(Debug)]
pub struct Connection {
    managed_display: ManagedDisplay,
    screen: c_int,
    root: xlib::Window,
    colormap: xlib::Colormap,
    visual: *mut xlib::Visual,
}

impl Connection {
    pub fn new() -> Result<Self> {
        let managed_display = ManagedDisplay::open()?;
        let display = managed_display.raw();

        // SAFETY: `display` is a freshly opened, non-null connection.
        let (screen, root, colormap, visual) = unsafe {
            let screen = xlib::XDefaultScreen(display);
            (
                screen,
                xlib::XRootWindow(display, screen),
                xlib::XDefaultColormap(display, screen),
                xlib::XDefaultVisual(display, screen),
            )
        };
        if visual.is_null() {
            return Err(anyhow!("No default visual for screen {}", screen));
        }

        info!(
            "Connected to X server: screen {}, root window {}",
            screen, root
        );
        Ok(Connection {
            managed_display,
            screen,
            root,
            colormap,
            visual,
        })
    }

    /// Raw display pointer for Xlib calls. Valid while `self` is alive.
    #[inline]
    pub fn display(&self) -> *mut xlib::Display {
        self.managed_display.raw()
    }

    #[inline]
    pub fn screen(&self) -> c_int {
        self.screen
    }

    #[inline]
    pub fn root(&self) -> xlib::Window {
        self.root
    }

    #[inline]
    pub fn colormap(&self) -> xlib::Colormap {
        self.colormap
    }

    #[inline]
    pub fn visual(&self) -> *mut xlib::Visual {
        self.visual
    }

    pub fn depth(&self) -> c_int {
        unsafe { xlib::XDefaultDepth(self.display(), self.screen) }
    }

    /// Size of the whole root window, spanning every monitor.
    pub fn screen_size(&self) -> Size {
        let (width, height) = unsafe {
            (
                xlib::XDisplayWidth(self.display(), self.screen),
                xlib::XDisplayHeight(self.display(), self.screen),
            )
        };
        Size::new(width.max(0) as u32, height.max(0) as u32)
    }

    /// File descriptor of the X connection, readable when events arrive.
    pub fn event_fd(&self) -> RawFd {
        unsafe { xlib::XConnectionNumber(self.display()) }
    }

    /// Pointer position in root-window coordinates.
    pub fn query_pointer(&self) -> Result<Point> {
        let mut root_return: xlib::Window = 0;
        let mut child_return: xlib::Window = 0;
        let (mut root_x, mut root_y, mut win_x, mut win_y): (c_int, c_int, c_int, c_int) =
            (0, 0, 0, 0);
        let mut mask: c_uint = 0;

        let on_screen = unsafe {
            xlib::XQueryPointer(
                self.display(),
                self.root,
                &mut root_return,
                &mut child_return,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            )
        };
        if on_screen == xlib::False {
            return Err(anyhow!("Could not query pointer position"));
        }
        trace!("Pointer at ({}, {})", root_x, root_y);
        Ok(Point::new(root_x, root_y))
    }

    /// Monitor rectangles reported by Xinerama, in server order.
    ///
    /// Empty when the extension is missing or inactive.
    pub fn monitors(&self) -> Vec<Rect> {
        let display = self.display();
        if unsafe { xinerama::XineramaIsActive(display) } == xlib::False {
            debug!("Xinerama inactive; treating the root window as one monitor.");
            return Vec::new();
        }

        let mut count: c_int = 0;
        let infos = unsafe { xinerama::XineramaQueryScreens(display, &mut count) };
        if infos.is_null() {
            warn!("XineramaQueryScreens returned no screens.");
            return Vec::new();
        }

        // SAFETY: Xinerama returned `count` contiguous entries at `infos`.
        let monitors = unsafe { slice::from_raw_parts(infos, count.max(0) as usize) }
            .iter()
            .map(monitor_rect)
            .collect::<Vec<_>>();
        unsafe { xlib::XFree(infos as *mut c_void) };

        debug!("Xinerama monitors: {:?}", monitors);
        monitors
    }

    /// Pushes buffered requests to the server.
    pub fn flush(&self) {
        unsafe { xlib::XFlush(self.display()) };
    }
}

fn monitor_rect(info: &xinerama::XineramaScreenInfo) -> Rect {
    Rect::new(
        info.x_org as i32,
        info.y_org as i32,
        info.width.max(0) as u32,
        info.height.max(0) as u32,
    )
}
