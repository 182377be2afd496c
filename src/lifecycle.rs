// src/lifecycle.rs

//! The popup's lifecycle: `Armed -> Showing -> Finished(outcome)`.
//!
//! The controller owns the outcome and is the only code that sets it.
//! Signals and the expiry timer reach it as ordinary button events through
//! the surface's event wait, so the blocking loop below is the single place
//! where the popup decides to stop.

use crate::platform::{PopupEvent, PopupSurface};
use crate::signals::SignalRouter;
use crate::wrap::DisplayLine;
use anyhow::{Context, Result};
use log::{debug, info, trace};


/// How the popup ended. Determines the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action button was pressed or `SIGUSR2` arrived.
    Action,
    /// Setup failed before the popup could be shown.
    Fail,
    /// Dismissed by click, timer, `SIGUSR1`, interrupt or terminate.
    Dismiss,
}

impl Outcome {
    pub const fn exit_code(self) -> i32 {
        match self {
            Outcome::Action => 0,
            Outcome::Fail => 1,
            Outcome::Dismiss => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Signal handlers are installed; the window may not exist yet.
    Armed,
    /// The first redraw has been drawn.
    Showing,
    Finished(Outcome),
}

/// Pointer buttons bound to the two outcomes a user can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub dismiss_button: u32,
    pub action_button: u32,
}

impl Controls {
    /// Dismiss takes precedence if both are bound to the same button.
    fn classify(&self, button: u32) -> Option<Outcome> {
        if button == self.dismiss_button {
            Some(Outcome::Dismiss)
        } else if button == self.action_button {
            Some(Outcome::Action)
        } else {
            None
        }
    }
}

pub struct Lifecycle<R: SignalRouter> {
    router: R,
    phase: Phase,
    outcome: Option<Outcome>,
}

impl<R: SignalRouter> Lifecycle<R> {
    /// Enters `Armed`: terminating signals now dismiss, user signals are
    /// ignored until the window is mapped.
    pub fn arm(mut router: R) -> Result<Self> {
        router
            .install_terminating()
            .context("Failed to install signal handlers")?;
        debug!("Lifecycle armed");
        Ok(Self {
            router,
            phase: Phase::Armed,
            outcome: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Records `outcome` unless one is already set, and returns the one that
    /// stands.
    fn settle(&mut self, outcome: Outcome) -> Outcome {
        let settled = *self.outcome.get_or_insert(outcome);
        if settled != outcome {
            trace!("Outcome already {:?}; ignoring {:?}", settled, outcome);
        }
        self.phase = Phase::Finished(settled);
        settled
    }

    /// Ends the lifecycle after a setup error.
    pub fn fail(&mut self) -> Outcome {
        self.settle(Outcome::Fail)
    }

    /// Maps the window, arms the timer and blocks until a button decides the
    /// outcome.
    ///
    /// `duration_secs == 0` means no timer. Every redraw renders `lines`
    /// again from scratch.
    pub fn run<S: PopupSurface>(
        &mut self,
        surface: &mut S,
        lines: &[DisplayLine],
        controls: Controls,
        duration_secs: u32,
    ) -> Result<Outcome> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }

        surface.map().context("Failed to map popup window")?;
        self.router
            .enable_user_signals()
            .context("Failed to route user signals")?;
        if duration_secs != 0 {
            self.router
                .arm_timer(duration_secs)
                .context("Failed to arm expiry timer")?;
        }

        loop {
            match surface
                .next_event()
                .context("Failed while waiting for popup events")?
            {
                PopupEvent::Redraw => {
                    if self.phase == Phase::Armed {
                        debug!("Popup showing {} lines", lines.len());
                        self.phase = Phase::Showing;
                    }
                    surface.redraw(lines).context("Failed to draw popup")?;
                }
                PopupEvent::Button(button) => match controls.classify(button) {
                    Some(outcome) => {
                        info!("Button {} pressed: {:?}", button, outcome);
                        return Ok(self.settle(outcome));
                    }
                    None => trace!("Ignoring unbound button {}", button),
                },
            }
        }
    }
}
