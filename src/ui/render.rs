//! Screen layouts and the redraw policy.

use core::fmt::Write;

use heapless::String;

use super::blink::BlinkSequence;
use super::{DisplaySink, Frame};
use crate::config::{DISPLAY_WIDTH, GLYPH_WIDTH};
use crate::timer::{TickOutcome, TimerPhase, TimerSnapshot};

const SPLASH: &str = "Timer ready";

/// Left edge that centres `text` on the panel, clamped at the border.
pub fn center_x(text: &str) -> i32 {
    let width = text.chars().count() as i32 * GLYPH_WIDTH;
    ((DISPLAY_WIDTH - width) / 2).max(0)
}

fn centered<S: DisplaySink>(sink: &mut S, text: &str, y: i32) {
    sink.draw_text(text, center_x(text), y);
}

/// Draw one complete screen for `frame`.
pub fn draw_frame<S: DisplaySink>(sink: &mut S, frame: Frame) {
    sink.clear();
    match frame {
        Frame::Setting { minutes } => {
            let mut value: String<4> = String::new();
            let _ = write!(value, "{:02}", minutes);
            centered(sink, "Set minutes:", 4);
            centered(sink, &value, 26);
            centered(sink, "Press to START", 50);
        }
        Frame::Counting { remaining_secs } => {
            let mut clock: String<12> = String::new();
            let _ = write!(clock, "{:02}:{:02}", remaining_secs / 60, remaining_secs % 60);
            centered(sink, &clock, 26);
            centered(sink, "Press to cancel", 50);
        }
        Frame::Finished => {
            centered(sink, "TIME'S", 10);
            centered(sink, "UP!", 28);
            centered(sink, "Press to reset", 50);
        }
    }
    sink.present();
}

/// One-line centred message, used for the boot splash and fatal errors.
pub fn draw_banner<S: DisplaySink>(sink: &mut S, message: &str) {
    sink.clear();
    centered(sink, message, 26);
    sink.present();
}

pub fn draw_splash<S: DisplaySink>(sink: &mut S) {
    draw_banner(sink, SPLASH);
}

/// Keeps the panel in step with the timer.
///
/// Redraws only when the visible frame changes, starts the blink when
/// `Finished` is entered and cancels it when the timer leaves `Finished`.
#[derive(Debug, Default)]
pub struct Presenter {
    last: Option<Frame>,
    blink: Option<BlinkSequence>,
    inverted: bool,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.is_some()
    }

    pub fn update<S: DisplaySink>(
        &mut self,
        sink: &mut S,
        snapshot: &TimerSnapshot,
        now_ms: u32,
        outcome: TickOutcome,
    ) {
        let frame = Frame::from(snapshot);
        let finished = snapshot.phase == TimerPhase::Finished;

        if !finished && self.blink.take().is_some() {
            self.set_inverted(sink, false);
        }
        if outcome.finished && finished {
            self.blink = Some(BlinkSequence::new(now_ms));
        }

        if outcome.redraw || self.last != Some(frame) {
            debug!("redraw {}", frame);
            draw_frame(sink, frame);
            self.last = Some(frame);
        }

        if let Some(blink) = self.blink {
            match blink.level(now_ms) {
                Some(level) => self.set_inverted(sink, level),
                None => {
                    self.blink = None;
                    self.set_inverted(sink, false);
                }
            }
        }
    }

    fn set_inverted<S: DisplaySink>(&mut self, sink: &mut S, inverted: bool) {
        if self.inverted != inverted {
            sink.invert(inverted);
            self.inverted = inverted;
        }
    }
}
