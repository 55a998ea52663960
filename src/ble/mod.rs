//! Bluetooth Low Energy remote-control surface.
//!
//! The appliance is a SoftDevice S140 **peripheral** exposing one 16-bit
//! service with two characteristics:
//!
//! - **command** (write) - UTF-8 text, see [`command`].
//! - **status** (read + notify) - `[phase:u8][remaining_seconds:u16 LE]`.
//!
//! 1. **Advertising** - [`adv`] builds the payload once at startup.
//! 2. **Link** - [`link`] owns the single peer's lifecycle and paces status
//!    notifications; the radio itself sits behind the [`link::Radio`] trait.
//! 3. **Server** - the SoftDevice GATT table and advertising task
//!    (embedded builds only).

pub mod adv;
pub mod command;
pub mod link;
#[cfg(feature = "embedded")]
pub mod server;

pub use adv::AdvPayload;
pub use command::RemoteCommand;
pub use link::{Radio, RemoteChannel};

use crate::timer::TimerSnapshot;

/// Size of one status notification.
pub const STATUS_LEN: usize = 3;

/// Serialise a snapshot into the status characteristic layout.
///
/// Remaining seconds above `u16::MAX` saturate; the encoder range keeps
/// real values far below that.
pub fn status_record(snapshot: &TimerSnapshot) -> [u8; STATUS_LEN] {
    let secs = u16::try_from(snapshot.remaining_seconds).unwrap_or(u16::MAX);
    let [lo, hi] = secs.to_le_bytes();
    [snapshot.phase.code(), lo, hi]
}
