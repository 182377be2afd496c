// src/platform/mock.rs

use crate::platform::{PopupEvent, PopupSurface};
use crate::wrap::DisplayLine;
use anyhow::{anyhow, Result};
use std::collections::VecDeque;

/// Replays a fixed script of events and records what the controller did.
pub struct MockSurface {
    events: VecDeque<PopupEvent>,
    mapped: bool,
    redraws: Vec<Vec<String>>,
    fail_map: bool,
}

impl MockSurface {
    pub fn new(events: impl IntoIterator<Item = PopupEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            mapped: false,
            redraws: Vec::new(),
            fail_map: false,
        }
    }

    /// A surface whose window can never be shown.
    pub fn failing_map() -> Self {
        Self {
            fail_map: true,
            ..Self::new(Vec::<PopupEvent>::new())
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// Lines drawn by each redraw, in order.
    pub fn redraws(&self) -> &[Vec<String>] {
        &self.redraws
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl PopupSurface for MockSurface {
    fn map(&mut self) -> Result<()> {
        if self.fail_map {
            return Err(anyhow!("mock window cannot be mapped"));
        }
        self.mapped = true;
        Ok(())
    }

    fn next_event(&mut self) -> Result<PopupEvent> {
        self.events
            .pop_front()
            .ok_or_else(|| anyhow!("mock event script exhausted"))
    }

    fn redraw(&mut self, lines: &[DisplayLine]) -> Result<()> {
        self.redraws
            .push(lines.iter().map(|line| line.as_str().to_owned()).collect());
        Ok(())
    }
}
