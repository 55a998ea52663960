//! Presentation - turns timer snapshots into display commands.
//!
//! Everything here except [`display`] is hardware-free: screens are
//! drawn through the [`DisplaySink`] trait, which the SSD1306 driver
//! implements on target and a recorder implements in tests.
//!
//! ## Components
//!
//! - **Render**: fixed screen layouts, centred for an 8 px monospace font
//! - **Blink**: the Finished invert/restore sequence, polled per tick
//! - **Display**: SSD1306 128×64 OLED via I²C (embedded builds only)

pub mod blink;
#[cfg(feature = "embedded")]
pub mod display;
pub mod render;

pub use render::Presenter;

use crate::timer::{TimerPhase, TimerSnapshot};

/// The only display operations presentation needs.
pub trait DisplaySink {
    /// Blank the frame buffer.
    fn clear(&mut self);

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn draw_text(&mut self, text: &str, x: i32, y: i32);

    /// Push the frame buffer to the panel.
    fn present(&mut self);

    /// Switch between normal and inverted video.
    fn invert(&mut self, inverted: bool);
}

/// What is on screen, reduced to the fields that change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    Setting { minutes: u8 },
    Counting { remaining_secs: u32 },
    Finished,
}

impl From<&TimerSnapshot> for Frame {
    fn from(snapshot: &TimerSnapshot) -> Self {
        match snapshot.phase {
            TimerPhase::Setting => Frame::Setting {
                minutes: snapshot.configured_minutes,
            },
            TimerPhase::Counting => Frame::Counting {
                remaining_secs: snapshot.remaining_seconds,
            },
            TimerPhase::Finished => Frame::Finished,
        }
    }
}
