//! Tick-driven push-button debouncing.
//!
//! The button is sampled once per main-loop tick.  A press must still read
//! as pressed `debounce_ms` after it was first seen before it fires, and
//! after firing the button must be released before another press counts.
//! Nothing here blocks: the release wait is a sub-state checked each poll.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum PressState {
    Released,
    Debouncing { since_ms: u32 },
    AwaitingRelease,
}

/// Turns raw per-tick level samples into one event per physical press.
#[derive(Clone, Debug)]
pub struct Debouncer {
    state: PressState,
    debounce_ms: u32,
}

impl Debouncer {
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            state: PressState::Released,
            debounce_ms,
        }
    }

    /// Feed one sample.  Returns `true` on the tick a press is confirmed.
    pub fn poll(&mut self, now_ms: u32, pressed: bool) -> bool {
        match self.state {
            PressState::Released => {
                if pressed {
                    self.state = PressState::Debouncing { since_ms: now_ms };
                }
                false
            }
            PressState::Debouncing { since_ms } => {
                if !pressed {
                    self.state = PressState::Released;
                    false
                } else if now_ms.wrapping_sub(since_ms) >= self.debounce_ms {
                    self.state = PressState::AwaitingRelease;
                    true
                } else {
                    false
                }
            }
            PressState::AwaitingRelease => {
                if !pressed {
                    self.state = PressState::Released;
                }
                false
            }
        }
    }

    /// `true` while a confirmed press is still being held.
    pub fn is_held(&self) -> bool {
        self.state == PressState::AwaitingRelease
    }
}
