//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

use crate::encoder::{DecoderConfig, RangeMode};

// Main loop

/// Period of the cooperative main loop (ms).
pub const TICK_MS: u64 = 10;

// Encoder

/// Lowest settable duration (minutes).
pub const ENCODER_MIN: i32 = 0;

/// Highest settable duration (minutes).
pub const ENCODER_MAX: i32 = 90;

/// Swap the roles of CLK and DT for mirrored wiring.
pub const ENCODER_REVERSE: bool = false;

/// The minutes dial: bounded at both ends.
pub const DIAL: DecoderConfig = DecoderConfig {
    min: ENCODER_MIN,
    max: ENCODER_MAX,
    reverse: ENCODER_REVERSE,
    mode: RangeMode::Bounded,
};

// Button

/// Time a press must stay asserted before it counts (ms).
pub const BUTTON_DEBOUNCE_MS: u32 = 30;

// Display

/// SSD1306 panel width in pixels.
pub const DISPLAY_WIDTH: i32 = 128;

/// SSD1306 panel height in pixels.
pub const DISPLAY_HEIGHT: i32 = 64;

/// Horizontal advance of one glyph; centering assumes a fixed-width font.
pub const GLYPH_WIDTH: i32 = 8;

/// Number of invert/restore cycles played when the countdown expires.
pub const BLINK_CYCLES: u8 = 3;

/// Duration of each inverted or restored half of a blink cycle (ms).
pub const BLINK_HALF_PERIOD_MS: u32 = 150;

// BLE

/// Complete local name placed in the advertising payload.
pub const BLE_DEVICE_NAME: &str = "Dial Timer";

/// 16-bit timer service UUID, canonical big-endian hex.
pub const TIMER_SERVICE_UUID: &str = "AAAA";

/// Write-only command characteristic.
pub const COMMAND_CHAR_UUID: u16 = 0xAAAB;

/// Read + notify status characteristic.
pub const STATUS_CHAR_UUID: u16 = 0xAAAC;

/// Advertising interval (µs). 100 ms.
pub const BLE_ADV_INTERVAL_US: u32 = 100_000;

/// Minimum spacing between two status notifications (ms).
pub const STATUS_NOTIFY_INTERVAL_MS: u32 = 500;

/// Largest command write we accept from the peer.
pub const COMMAND_MAX_LEN: usize = 16;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Encoder CLK (A) → P0.03
//   Encoder DT  (B) → P0.04
//   Button          → P0.11
//   I²C SDA         → P0.26
//   I²C SCL         → P0.27
