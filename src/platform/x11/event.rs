// src/platform/x11/event.rs

use super::connection::Connection;
use crate::lifecycle::Controls;
use crate::platform::PopupEvent;
use crate::signals::IntentPipe;

use anyhow::{Context, Result};
use log::{debug, trace};
use std::io;
use std::mem;
use std::os::unix::io::RawFd;

// X11 library imports
use libc::{c_int, nfds_t};
use x11::xlib;

/// Blocks until the popup has something to act on.
///
/// Queued X events are drained first, then the signal pipe. Only when both
/// are empty does the call sleep in `poll(2)` on the X connection and the
/// pipe together, so an intent raised during the wait wakes it immediately.
pub fn next_event(
    connection: &Connection,
    intents: &mut IntentPipe,
    controls: &Controls,
) -> Result<PopupEvent> {
    let display = connection.display();
    loop {
        // SAFETY: `display` is valid for the life of `connection`.
        while unsafe { xlib::XPending(display) } > 0 {
            let mut xevent: xlib::XEvent = unsafe { mem::zeroed() };
            // SAFETY: XPending reported a queued event, so this does not block.
            unsafe { xlib::XNextEvent(display, &mut xevent) };
            if let Some(event) = translate(&xevent) {
                return Ok(event);
            }
        }

        if let Some(intent) = intents.try_recv()? {
            return Ok(PopupEvent::Button(intent.as_button(controls)));
        }

        wait_readable(&[connection.event_fd(), intents.read_fd()])
            .context("Failed to wait for X events")?;
    }
}

/// Maps the X events the popup listens to. Everything else is dropped.
fn translate(xevent: &xlib::XEvent) -> Option<PopupEvent> {
    // SAFETY: `type_` is the common discriminant of every XEvent variant.
    match unsafe { xevent.type_ } {
        xlib::Expose => {
            // SAFETY: discriminant checked above.
            let expose = unsafe { xevent.expose };
            // Only the last Expose of a series triggers a redraw.
            if expose.count == 0 {
                trace!(
                    "XEvent: Expose (win: {}, {}x{})",
                    expose.window,
                    expose.width,
                    expose.height
                );
                Some(PopupEvent::Redraw)
            } else {
                None
            }
        }
        xlib::ButtonPress => {
            // SAFETY: discriminant checked above.
            let button = unsafe { xevent.button };
            debug!(
                "XEvent: ButtonPress {} at ({}, {})",
                button.button, button.x, button.y
            );
            Some(PopupEvent::Button(button.button))
        }
        other => {
            trace!("Ignoring XEvent type {}", other);
            None
        }
    }
}

/// Sleeps until any of `fds` is readable. A signal interrupting the sleep
/// counts as a wakeup.
fn wait_readable(fds: &[RawFd]) -> io::Result<()> {
    let mut pollfds: Vec<libc::pollfd> = fds
        .iter()
        .map(|&fd| libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();

    // SAFETY: `pollfds` is a valid, initialized slice for the duration of the call.
    let ret: c_int = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as nfds_t, -1) };
    if ret < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            trace!("poll interrupted by a signal");
            return Ok(());
        }
        return Err(err);
    }
    trace!("poll woke with {} ready descriptors", ret);
    Ok(())
}
