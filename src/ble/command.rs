//! Inbound command decoding for the command characteristic.
//!
//! Writes are UTF-8 text, surrounding whitespace ignored:
//!
//! ```text
//! START | STOP | RESET | SET:<0-90>
//! ```
//!
//! Anything else decodes to `None` and is dropped: writes are
//! fire-and-forget, so there is no channel to report errors back.

use crate::config::{ENCODER_MAX, ENCODER_MIN};

/// A decoded remote-control request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteCommand {
    /// Begin counting down the configured duration.
    Start,
    /// Abandon the countdown and zero the duration (`STOP` or `RESET`).
    Stop,
    /// Configure the duration in minutes.
    Set(u8),
}

impl RemoteCommand {
    /// Decode a raw characteristic write.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let text = core::str::from_utf8(data).ok()?.trim();

        match text {
            "START" => Some(Self::Start),
            "STOP" | "RESET" => Some(Self::Stop),
            _ => {
                let arg = text.strip_prefix("SET:")?;
                let minutes: i32 = arg.trim().parse().ok()?;
                if (ENCODER_MIN..=ENCODER_MAX).contains(&minutes) {
                    u8::try_from(minutes).ok().map(Self::Set)
                } else {
                    None
                }
            }
        }
    }
}
