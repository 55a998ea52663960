//! Countdown state machine - the single source of truth for the appliance.
//!
//! ```text
//!            press / START (minutes > 0)
//!   Setting ─────────────────────────────▶ Counting
//!      ▲  ◀──── press (keep minutes) ───────┘  │
//!      │  ◀──── STOP / RESET (zero) ───────────┤ elapsed ≥ duration
//!      │                                        ▼
//!      └──────── press / STOP / RESET ─────── Finished
//! ```
//!
//! The encoder, the push button and the remote client all mutate the same
//! [`TimerMachine`].  The main loop owns it and calls [`TimerMachine::tick`]
//! every poll and [`TimerMachine::command`] for each decoded remote write.
//!
//! Time is a wrapping millisecond tick counter.  Remaining time is always
//! recomputed from the start timestamp, never accumulated, so it cannot
//! drift and survives counter rollover.

pub mod button;

use crate::ble::RemoteCommand;
use crate::config::{BUTTON_DEBOUNCE_MS, ENCODER_MAX};
use crate::encoder::QuadratureDecoder;
use button::Debouncer;

/// Lifecycle phase of the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerPhase {
    Setting,
    Counting,
    Finished,
}

impl TimerPhase {
    /// Phase byte used on the wire.
    pub const fn code(self) -> u8 {
        match self {
            TimerPhase::Setting => 0,
            TimerPhase::Counting => 1,
            TimerPhase::Finished => 2,
        }
    }
}

/// Consistent view of the timer at one poll instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub configured_minutes: u8,
    pub remaining_seconds: u32,
}

/// What a tick or command changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The display no longer matches the snapshot.
    pub redraw: bool,
    /// `Finished` was entered by this call.
    pub finished: bool,
}

impl TickOutcome {
    /// Combine the outcomes of several calls within one poll.
    pub fn merge(self, other: TickOutcome) -> TickOutcome {
        TickOutcome {
            redraw: self.redraw || other.redraw,
            finished: self.finished || other.finished,
        }
    }
}

pub struct TimerMachine {
    phase: TimerPhase,
    minutes: u8,
    remaining_secs: u32,
    started_at_ms: u32,
    last_elapsed_secs: u32,
    last_encoder: i32,
    button: Debouncer,
}

impl TimerMachine {
    /// Start in `Setting` with zero minutes, tracking `encoder` from its
    /// current position.
    pub fn new(encoder: &QuadratureDecoder) -> Self {
        Self {
            phase: TimerPhase::Setting,
            minutes: 0,
            remaining_secs: 0,
            started_at_ms: 0,
            last_elapsed_secs: 0,
            last_encoder: encoder.value(),
            button: Debouncer::new(BUTTON_DEBOUNCE_MS),
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            configured_minutes: self.minutes,
            remaining_seconds: self.remaining_secs,
        }
    }

    /// One main-loop poll: follow the encoder, the clock and the button.
    pub fn tick(
        &mut self,
        now_ms: u32,
        encoder: &QuadratureDecoder,
        button_pressed: bool,
    ) -> TickOutcome {
        let mut out = TickOutcome::default();
        let press = self.button.poll(now_ms, button_pressed);

        match self.phase {
            TimerPhase::Setting => {
                let value = encoder.value();
                if value != self.last_encoder {
                    self.last_encoder = value;
                    self.minutes = minutes_from(value);
                    self.remaining_secs = self.duration_secs();
                    out.redraw = true;
                }
            }
            TimerPhase::Counting => {
                let elapsed_ms = now_ms.wrapping_sub(self.started_at_ms);
                let elapsed_secs = elapsed_ms / 1000;
                let total = self.duration_secs();

                if elapsed_secs >= total {
                    self.transition(TimerPhase::Finished);
                    self.remaining_secs = 0;
                    out.redraw = true;
                    out.finished = true;
                } else {
                    self.remaining_secs = total - elapsed_secs;
                    if elapsed_secs != self.last_elapsed_secs {
                        self.last_elapsed_secs = elapsed_secs;
                        out.redraw = true;
                    }
                }
            }
            TimerPhase::Finished => {}
        }

        if press {
            self.on_press(now_ms, encoder, &mut out);
        }

        out.finished &= self.phase == TimerPhase::Finished;
        out
    }

    /// Apply a decoded remote command.  Commands that do not apply in the
    /// current phase leave the state untouched.
    pub fn command(
        &mut self,
        now_ms: u32,
        command: RemoteCommand,
        encoder: &QuadratureDecoder,
    ) -> TickOutcome {
        let mut out = TickOutcome::default();

        match (self.phase, command) {
            (TimerPhase::Setting, RemoteCommand::Start) => {
                if self.minutes > 0 {
                    self.start(now_ms);
                    out.redraw = true;
                }
            }
            (_, RemoteCommand::Stop) => {
                self.reset(encoder);
                out.redraw = true;
            }
            (TimerPhase::Setting, RemoteCommand::Set(minutes)) => {
                self.minutes = minutes;
                self.reposition(encoder);
                self.remaining_secs = self.duration_secs();
                out.redraw = true;
            }
            (phase, command) => {
                info!("remote {} ignored while {}", command, phase);
            }
        }

        out
    }

    fn on_press(&mut self, now_ms: u32, encoder: &QuadratureDecoder, out: &mut TickOutcome) {
        match self.phase {
            TimerPhase::Setting => {
                if self.minutes > 0 {
                    self.start(now_ms);
                    out.redraw = true;
                }
            }
            TimerPhase::Counting => {
                // Cancel: back to the configured duration.
                self.transition(TimerPhase::Setting);
                self.remaining_secs = self.duration_secs();
                self.reposition(encoder);
                out.redraw = true;
            }
            TimerPhase::Finished => {
                self.reset(encoder);
                out.redraw = true;
            }
        }
    }

    fn start(&mut self, now_ms: u32) {
        self.transition(TimerPhase::Counting);
        self.started_at_ms = now_ms;
        self.last_elapsed_secs = 0;
        self.remaining_secs = self.duration_secs();
    }

    fn reset(&mut self, encoder: &QuadratureDecoder) {
        self.transition(TimerPhase::Setting);
        self.minutes = 0;
        self.remaining_secs = 0;
        self.reposition(encoder);
    }

    /// Move the encoder to the configured minutes so the next turn
    /// continues from there.
    ///
    /// `last_encoder` is pinned to the target, not re-read: a detent that
    /// lands between `set` and a read-back must still show up as a change
    /// on the next tick.  `last_encoder == minutes` holds in `Setting`.
    fn reposition(&mut self, encoder: &QuadratureDecoder) {
        let target = i32::from(self.minutes);
        if let Err(e) = encoder.set(target) {
            warn!("encoder reposition failed: {}", e);
        }
        self.last_encoder = target;
    }

    fn transition(&mut self, to: TimerPhase) {
        if self.phase != to {
            info!("timer {} -> {} ({} min)", self.phase, to, self.minutes);
        }
        self.phase = to;
    }

    fn duration_secs(&self) -> u32 {
        u32::from(self.minutes) * 60
    }
}

fn minutes_from(value: i32) -> u8 {
    // The encoder is range-limited; clamp anyway so a misconfigured
    // decoder cannot push the duration off the wire format.
    u8::try_from(value.clamp(0, ENCODER_MAX)).unwrap_or(0)
}
