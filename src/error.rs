//! Unified error types for dial-timer.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! With the `defmt` feature they implement `defmt::Format` for efficient
//! on-target logging.

use core::fmt;

/// Fatal bring-up failures.  Once the main loop runs, nothing returns these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// I²C transaction to the display failed.
    Display,

    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// Encoder pins could not be configured.
    Encoder,

    /// Advertising payload does not fit a legacy advertising PDU, or the
    /// service UUID string is not four hex digits.
    AdvertisingPayload,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// The advertising task could not be started.
    AdvertiseFailed,
    /// The GATT server table could not be registered.
    GattRegister,
}

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl Error {
    /// Short label shown on the display before the firmware halts.
    pub fn banner(&self) -> &'static str {
        match self {
            Error::Display => "DISPLAY FAILED",
            Error::Ble(_) | Error::AdvertisingPayload => "BLE FAILED",
            Error::Encoder => "ENCODER FAILED",
        }
    }
}

/// A direct `set` on the decoder asked for a value outside its range.
/// The position is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeError {
    pub value: i32,
    pub min: i32,
    pub max: i32,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value {} out of range ({}-{})",
            self.value, self.min, self.max
        )
    }
}

/// The peer vanished while a status notification was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotifyError;
