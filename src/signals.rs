// src/signals.rs

//! Turns asynchronous OS signals into popup intents.
//!
//! The handler does exactly one thing: it writes a single byte into a
//! non-blocking self-pipe. The event loop polls the read end next to the X
//! connection and is the only place that acts on what arrives, so no state
//! is shared with the handler beyond the pipe's write descriptor.

use crate::lifecycle::Controls;
use anyhow::{Context, Result};
use log::{debug, trace, warn};
use nix::fcntl::OFlag;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::{self, alarm};
use std::fs::File;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};

/// Write end of the live `IntentPipe`, or -1. Set once per pipe, read by
/// the handler.
static INTENT_WRITE_FD: AtomicI32 = AtomicI32::new(-1);

/// Signals that end the popup as a dismissal from the moment it is armed.
const TERMINATING_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGALRM];
/// Application signals, ignored until there is a window to act on.
const USER_SIGNALS: [Signal; 2] = [Signal::SIGUSR1, Signal::SIGUSR2];

/// What a routed signal asks the popup to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Action,
    Dismiss,
}

impl Intent {
    const ACTION_BYTE: u8 = b'a';
    const DISMISS_BYTE: u8 = b'd';

    fn for_signal(signo: libc::c_int) -> Self {
        if signo == libc::SIGUSR2 {
            Intent::Action
        } else {
            Intent::Dismiss
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Intent::Action => Self::ACTION_BYTE,
            Intent::Dismiss => Self::DISMISS_BYTE,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            Self::ACTION_BYTE => Some(Intent::Action),
            Self::DISMISS_BYTE => Some(Intent::Dismiss),
            _ => None,
        }
    }

    /// The pointer button a click with the same meaning would carry.
    pub fn as_button(self, controls: &Controls) -> u32 {
        match self {
            Intent::Action => controls.action_button,
            Intent::Dismiss => controls.dismiss_button,
        }
    }
}

extern "C" fn route_signal(signo: libc::c_int) {
    // Async-signal context: an atomic load and write(2) only.
    let fd = INTENT_WRITE_FD.load(Ordering::Acquire);
    if fd < 0 {
        return;
    }
    let byte = Intent::for_signal(signo).to_byte();
    // A full pipe already holds an unread intent; dropping this one is fine.
    unsafe {
        libc::write(fd, &byte as *const u8 as *const libc::c_void, 1);
    }
}

/// The receiving side of signal routing.
///
/// Only one pipe can be live at a time: creating it publishes its write end
/// to the handler, dropping it withdraws it.
#[derive(Debug)]
pub struct IntentPipe {
    reader: File,
    writer: OwnedFd,
}

impl IntentPipe {
    pub fn new() -> Result<Self> {
        let (reader, writer) = unistd::pipe2(OFlag::O_NONBLOCK | OFlag::O_CLOEXEC)
            .context("Failed to create signal pipe")?;

        let previous = INTENT_WRITE_FD.swap(writer.as_raw_fd(), Ordering::AcqRel);
        if previous >= 0 {
            warn!(
                "Replacing live signal pipe (fd {}) with fd {}",
                previous,
                writer.as_raw_fd()
            );
        }
        debug!(
            "Signal pipe ready: read fd {}, write fd {}",
            reader.as_raw_fd(),
            writer.as_raw_fd()
        );

        Ok(Self {
            reader: File::from(reader),
            writer,
        })
    }

    /// Descriptor that becomes readable when an intent is pending.
    pub fn read_fd(&self) -> RawFd {
        self.reader.as_raw_fd()
    }

    /// Takes the oldest pending intent without blocking.
    pub fn try_recv(&mut self) -> Result<Option<Intent>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => match Intent::from_byte(byte[0]) {
                    Some(intent) => {
                        debug!("Received {:?} intent from signal pipe", intent);
                        return Ok(Some(intent));
                    }
                    None => warn!("Discarding unknown byte {:#x} on signal pipe", byte[0]),
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("Failed to read signal pipe"),
            }
        }
    }
}

impl Drop for IntentPipe {
    fn drop(&mut self) {
        let fd = self.writer.as_raw_fd();
        if INTENT_WRITE_FD
            .compare_exchange(fd, -1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            trace!("Signal pipe write fd {} withdrawn from handler", fd);
        }
    }
}

/// Installs signal dispositions and the expiry timer for the popup.
pub trait SignalRouter {
    /// Routes interrupt, terminate and alarm to the dismiss intent and sets
    /// the two user signals to be ignored.
    fn install_terminating(&mut self) -> Result<()>;

    /// Routes `SIGUSR1` (dismiss) and `SIGUSR2` (action). Called once the
    /// window is mapped.
    fn enable_user_signals(&mut self) -> Result<()>;

    /// Raises `SIGALRM` after `seconds` of wall-clock time.
    fn arm_timer(&mut self, seconds: u32) -> Result<()>;
}

/// Process signal dispositions through `sigaction(2)` and `alarm(2)`.
#[derive(Debug, Default)]
pub struct OsSignals;

impl OsSignals {
    fn set_disposition(signals: &[Signal], handler: SigHandler, flags: SaFlags) -> Result<()> {
        let action = SigAction::new(handler, flags, SigSet::empty());
        for &sig in signals {
            // SAFETY: `route_signal` only touches an atomic and write(2).
            unsafe { signal::sigaction(sig, &action) }
                .with_context(|| format!("Failed to set disposition for {}", sig))?;
        }
        Ok(())
    }
}

impl SignalRouter for OsSignals {
    fn install_terminating(&mut self) -> Result<()> {
        Self::set_disposition(
            &TERMINATING_SIGNALS,
            SigHandler::Handler(route_signal),
            SaFlags::SA_RESTART,
        )?;
        Self::set_disposition(&USER_SIGNALS, SigHandler::SigIgn, SaFlags::empty())?;
        debug!("Terminating signals routed; user signals ignored until mapped.");
        Ok(())
    }

    fn enable_user_signals(&mut self) -> Result<()> {
        Self::set_disposition(
            &USER_SIGNALS,
            SigHandler::Handler(route_signal),
            SaFlags::SA_RESTART,
        )?;
        debug!("User signals routed.");
        Ok(())
    }

    fn arm_timer(&mut self, seconds: u32) -> Result<()> {
        if let Some(previous) = alarm::set(seconds) {
            warn!("Replaced pending alarm with {}s remaining", previous);
        }
        debug!("Expiry timer armed for {}s", seconds);
        Ok(())
    }
}
