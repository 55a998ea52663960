//! Quadrature rotary-encoder decoding.
//!
//! The two encoder pins (CLK = A, DT = B) are armed for both edges.  Each
//! edge handler samples *both* pin levels and hands the pair to
//! [`QuadratureDecoder::on_edge`].  The decoder never counts edges: it
//! tracks the Gray-code phase of the level pair
//!
//! ```text
//!   phase   0    1    2    3
//!   (A,B)  00   10   11   01      increment: 0→1→2→3→0
//! ```
//!
//! and only accepts moves to an adjacent phase.  Repeated readings and
//! diagonal jumps are contact bounce and never produce a count.  A detent
//! is emitted once four quarter steps have accumulated in one direction,
//! so a bounce between two neighbouring phases cancels itself out.
//!
//! Phase, quarter-step accumulator and position share one `AtomicU32`, so
//! the two pin handlers and the main loop (`set`) can interleave freely
//! without locks or torn updates.

#[cfg(feature = "embedded")]
pub mod edges;

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Error, RangeError};

/// Largest magnitude the packed 24-bit position can hold.
pub const VALUE_LIMIT: i32 = (1 << 23) - 1;

/// What happens when a detent would leave `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeMode {
    /// Follows the rotation past `[min, max]`.  The packed 24-bit
    /// position still saturates at ±[`VALUE_LIMIT`].
    Unbounded,
    /// Overflow jumps to `min`, underflow to `max`.
    Wrap,
    /// Clamp to `[min, max]`.
    Bounded,
}

/// One of the two encoder inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderPin {
    Clk,
    Dt,
}

/// Pin levels sampled together at edge time (`true` = high).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Levels {
    pub clk: bool,
    pub dt: bool,
}

impl Levels {
    pub const fn new(clk: bool, dt: bool) -> Self {
        Self { clk, dt }
    }

    /// Level pair for a Gray-code phase (inverse of [`Levels::phase`]).
    pub const fn for_phase(phase: u8) -> Self {
        match phase & 3 {
            0 => Self::new(false, false),
            1 => Self::new(true, false),
            2 => Self::new(true, true),
            _ => Self::new(false, true),
        }
    }

    /// Gray-code phase of this level pair.
    pub const fn phase(self) -> u8 {
        match (self.clk, self.dt) {
            (false, false) => 0,
            (true, false) => 1,
            (true, true) => 2,
            (false, true) => 3,
        }
    }

    const fn swapped(self) -> Self {
        Self::new(self.dt, self.clk)
    }
}

/// A completed detent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Detent {
    Up,
    Down,
}

impl Detent {
    pub const fn delta(self) -> i32 {
        match self {
            Detent::Up => 1,
            Detent::Down => -1,
        }
    }
}

/// Range and wiring of one encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderConfig {
    pub min: i32,
    pub max: i32,
    pub reverse: bool,
    pub mode: RangeMode,
}

// Packed word layout:
//   bits 0..2   phase
//   bits 2..5   quarter-step accumulator, biased by 4 (-3..=3 stored as 1..=7)
//   bits 8..32  position, two's complement i24
const PHASE_MASK: u32 = 0b11;
const ACC_SHIFT: u32 = 2;
const ACC_MASK: u32 = 0b111;
const ACC_BIAS: i32 = 4;
const VALUE_SHIFT: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Packed {
    phase: u8,
    acc: i32,
    value: i32,
}

impl Packed {
    const fn pack(self) -> u32 {
        ((self.value as u32) << VALUE_SHIFT)
            | ((((self.acc + ACC_BIAS) as u32) & ACC_MASK) << ACC_SHIFT)
            | (self.phase as u32 & PHASE_MASK)
    }

    const fn unpack(word: u32) -> Self {
        Self {
            phase: (word & PHASE_MASK) as u8,
            acc: ((word >> ACC_SHIFT) & ACC_MASK) as i32 - ACC_BIAS,
            value: (word as i32) >> VALUE_SHIFT,
        }
    }
}

/// Interrupt-safe quadrature decoder with a range-limited position.
pub struct QuadratureDecoder {
    word: AtomicU32,
    config: DecoderConfig,
}

impl QuadratureDecoder {
    /// Create a decoder positioned at `config.min`.
    ///
    /// `levels` are the pin levels at rest, so the first real move is
    /// judged against the encoder's actual phase.
    pub fn new(config: DecoderConfig, levels: Levels) -> Result<Self, Error> {
        if config.min > config.max || config.min < -VALUE_LIMIT || config.max > VALUE_LIMIT {
            warn!("encoder range {}..={} rejected", config.min, config.max);
            return Err(Error::Encoder);
        }

        let phase = Self::oriented(config.reverse, levels).phase();
        let word = Packed {
            phase,
            acc: 0,
            value: config.min,
        }
        .pack();

        Ok(Self {
            word: AtomicU32::new(word),
            config,
        })
    }

    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    /// Current position.  May trail an in-flight edge by one detent.
    pub fn value(&self) -> i32 {
        Packed::unpack(self.word.load(Ordering::Acquire)).value
    }

    /// Move the position to `value` without touching the phase tracking.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn set(&self, value: i32) -> Result<(), RangeError> {
        let DecoderConfig { min, max, .. } = self.config;
        if !(min..=max).contains(&value) {
            return Err(RangeError { value, min, max });
        }

        let _ = self
            .word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let state = Packed::unpack(word);
                Some(Packed { value, ..state }.pack())
            });
        Ok(())
    }

    /// Feed the levels sampled on an edge of either pin.
    ///
    /// Safe to call from interrupt context; returns the detent completed
    /// by this edge, if any.
    pub fn on_edge(&self, levels: Levels) -> Option<Detent> {
        let phase = Self::oriented(self.config.reverse, levels).phase();
        let mut emitted = None;

        let _ = self
            .word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let state = Packed::unpack(word);
                emitted = None;

                let quarter = match phase.wrapping_sub(state.phase) & 3 {
                    1 => 1,
                    3 => -1,
                    // Same phase again: bounce, nothing to record.
                    0 => return None,
                    // Diagonal jump: an intermediate phase was lost.  Resync
                    // without counting.
                    _ => {
                        return Some(
                            Packed {
                                phase,
                                acc: 0,
                                value: state.value,
                            }
                            .pack(),
                        )
                    }
                };

                let mut acc = state.acc + quarter;
                let mut value = state.value;
                if acc.abs() == 4 {
                    let detent = if acc > 0 { Detent::Up } else { Detent::Down };
                    value = self.apply(value, detent.delta());
                    emitted = Some(detent);
                    acc = 0;
                }

                Some(Packed { phase, acc, value }.pack())
            });

        emitted
    }

    fn apply(&self, value: i32, delta: i32) -> i32 {
        let DecoderConfig { min, max, mode, .. } = self.config;
        let next = value + delta;
        match mode {
            RangeMode::Bounded => next.clamp(min, max),
            RangeMode::Wrap if next > max => min,
            RangeMode::Wrap if next < min => max,
            RangeMode::Wrap => next,
            RangeMode::Unbounded => next.clamp(-VALUE_LIMIT, VALUE_LIMIT),
        }
    }

    const fn oriented(reverse: bool, levels: Levels) -> Levels {
        if reverse {
            levels.swapped()
        } else {
            levels
        }
    }
}
