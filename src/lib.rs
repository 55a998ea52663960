//! Rotary-encoder countdown timer with a BLE remote.
//!
//! All decision logic lives in this library and builds on the host:
//! the quadrature decoder, the countdown state machine, the remote
//! command/status protocol, the peer lifecycle and the screen layouts.
//! The hardware glue (GPIO edges, SoftDevice GATT server, SSD1306) is
//! compiled only with the `embedded` feature and driven from `main.rs`.
//!
//! Usage: `cargo test` on the host, `cargo run --release --features embedded`
//! with a probe attached.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod ble;
pub mod config;
pub mod encoder;
pub mod error;
pub mod timer;
pub mod ui;

pub use error::{Error, RangeError};

// ═══════════════════════════════════════════════════════════════════════════
// Cross-module tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::ble::{status_record, RemoteCommand};
    use crate::config::DIAL;
    use crate::encoder::{Levels, QuadratureDecoder};
    use crate::error::Error;
    use crate::timer::{TimerMachine, TimerPhase};

    fn setup() -> (QuadratureDecoder, TimerMachine) {
        let enc = QuadratureDecoder::new(DIAL, Levels::for_phase(0)).unwrap();
        let timer = TimerMachine::new(&enc);
        (enc, timer)
    }

    fn write(timer: &mut TimerMachine, enc: &QuadratureDecoder, now: u32, bytes: &[u8]) {
        if let Some(cmd) = RemoteCommand::parse(bytes) {
            timer.command(now, cmd, enc);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Remote write → state machine → status record
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn set_then_start_over_the_wire() {
        let (enc, mut timer) = setup();
        write(&mut timer, &enc, 0, b"SET:5");
        write(&mut timer, &enc, 0, b"START");
        assert_eq!(status_record(&timer.snapshot()), [0x01, 0x2C, 0x01]);

        timer.tick(300_000, &enc, false);
        assert_eq!(status_record(&timer.snapshot()), [0x02, 0x00, 0x00]);
    }

    #[test]
    fn malformed_writes_change_nothing() {
        let (enc, mut timer) = setup();
        write(&mut timer, &enc, 0, b"SET:12");
        let before = timer.snapshot();

        for bad in [&b"SET:91"[..], b"SET:-1", b"SET:abc", b"start", b"", b"\xff\xfe"] {
            write(&mut timer, &enc, 10, bad);
        }
        assert_eq!(timer.snapshot(), before);
        assert_eq!(enc.value(), 12);
    }

    #[test]
    fn reset_is_an_alias_for_stop() {
        let (enc, mut timer) = setup();
        write(&mut timer, &enc, 0, b"SET:2");
        write(&mut timer, &enc, 0, b"START");
        write(&mut timer, &enc, 100, b"RESET\n");
        assert_eq!(timer.phase(), TimerPhase::Setting);
        assert_eq!(timer.snapshot().configured_minutes, 0);
    }

    #[test]
    fn max_duration_fits_status_field() {
        let (enc, mut timer) = setup();
        write(&mut timer, &enc, 0, b"SET:90");
        assert_eq!(status_record(&timer.snapshot()), [0x00, 0x18, 0x15]);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Error banners
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn banners_name_the_failed_subsystem() {
        assert_eq!(Error::Display.banner(), "DISPLAY FAILED");
        assert_eq!(Error::Encoder.banner(), "ENCODER FAILED");
        assert_eq!(Error::AdvertisingPayload.banner(), "BLE FAILED");
        assert_eq!(
            Error::from(crate::error::BleError::GattRegister).banner(),
            "BLE FAILED"
        );
    }
}
