//! Finished-screen attention blink.
//!
//! A fixed number of invert/restore cycles played once when the
//! countdown ends.  Polled from the main loop instead of sleeping, so
//! the button and remote stay responsive while it runs.

use crate::config::{BLINK_CYCLES, BLINK_HALF_PERIOD_MS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlinkSequence {
    started_ms: u32,
}

impl BlinkSequence {
    pub fn new(started_ms: u32) -> Self {
        Self { started_ms }
    }

    /// Whether the display should be inverted at `now_ms`, or `None`
    /// once the sequence is over.
    pub fn level(&self, now_ms: u32) -> Option<bool> {
        let step = now_ms.wrapping_sub(self.started_ms) / BLINK_HALF_PERIOD_MS;
        if step >= u32::from(BLINK_CYCLES) * 2 {
            return None;
        }
        Some(step % 2 == 0)
    }
}
