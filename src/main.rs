// src/main.rs

// Declare modules
pub mod cli;
pub mod config;
pub mod geometry;
pub mod lifecycle;
pub mod platform;
pub mod signals;
pub mod wrap;

use crate::{
    cli::Args,
    config::{Config, CONFIG},
    geometry::{place, popup_height, Placement, Size},
    lifecycle::{Controls, Lifecycle, Outcome},
    platform::x11::{XPopup, XSession},
    signals::{IntentPipe, OsSignals},
    wrap::{wrap, DisplayLine, FontMetrics},
};

// Logging
use anyhow::{Context, Result};
use log::{debug, info};

/// Main entry point for `xpopup`.
fn main() {
    // Quiet unless RUST_LOG asks for more.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    let args = match cli::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(Outcome::Fail.exit_code());
        }
    };
    debug!("Parsed arguments: {:?}", args);

    let outcome = show_popup(&args, &CONFIG);
    info!("xpopup finished: {:?}", outcome);
    // Every X resource has been released by now; exit skips destructors.
    std::process::exit(outcome.exit_code());
}

/// Runs one popup from setup to outcome. Setup errors end it as `Fail`.
fn show_popup(args: &Args, config: &Config) -> Outcome {
    let intents = match IntentPipe::new() {
        Ok(intents) => intents,
        Err(e) => return report_failure(e),
    };
    let mut lifecycle = match Lifecycle::arm(OsSignals) {
        Ok(lifecycle) => lifecycle,
        Err(e) => return report_failure(e),
    };

    let controls = Controls {
        dismiss_button: config.behavior.dismiss_button,
        action_button: config.behavior.action_button,
    };
    let duration_secs = args.duration.unwrap_or(config.behavior.duration_secs);

    let result = build_popup(args, config, controls, intents).and_then(|(mut popup, lines)| {
        lifecycle.run(&mut popup, &lines, controls, duration_secs)
    });
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            log_failure(&e);
            lifecycle.fail()
        }
    };
    debug!("Lifecycle ended in {:?}", lifecycle.phase());
    outcome
}

/// Wraps the message, measures and places the popup, and creates its window.
fn build_popup(
    args: &Args,
    config: &Config,
    controls: Controls,
    intents: IntentPipe,
) -> Result<(XPopup, Vec<DisplayLine>)> {
    let appearance = &config.appearance;
    let session = XSession::open(&appearance.font)?;

    let lines = wrap(&args.message, config.text_budget(), session.font());
    let height = popup_height(
        lines.len(),
        session.font().text_height(),
        appearance.line_spacing,
        appearance.padding,
    );
    let size = Size::new(appearance.width, height);
    debug!("Wrapped message into {} lines, popup {:?}", lines.len(), size);

    let placement = if args.centered {
        Placement::Centered {
            monitor: session
                .pointer_monitor()
                .context("Failed to find the monitor under the pointer")?,
        }
    } else {
        Placement::Anchored {
            screen: session.screen_size(),
            offset: config.placement.offset(),
            corner: config.placement.corner,
            border: appearance.border_size,
        }
    };
    let origin = place(size, &placement);

    let popup = session.create_popup(origin, size, appearance, controls, intents)?;
    Ok((popup, lines))
}

fn log_failure(e: &anyhow::Error) {
    eprintln!("xpopup: {:#}", e);
    debug!("Setup failed. Root cause: {:?}", e.root_cause());
}

fn report_failure(e: anyhow::Error) -> Outcome {
    log_failure(&e);
    Outcome::Fail
}
