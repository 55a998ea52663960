//! GPIO edge watcher for the rotary encoder.
//!
//! Runs on the interrupt-priority executor so it preempts the main loop.
//! Both pins are armed for rising and falling edges; whichever fires
//! first, both levels are sampled and handed to the decoder.  Edges of
//! the two pins are serialised here, so the paired handlers never race.

use defmt::trace;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{AnyPin, Input, Pull};

use super::{EncoderPin, Levels, QuadratureDecoder};

/// The encoder's CLK and DT inputs, internal pull-ups enabled.
pub struct EncoderPins {
    clk: Input<'static>,
    dt: Input<'static>,
}

impl EncoderPins {
    pub fn new(clk: AnyPin, dt: AnyPin) -> Self {
        Self {
            clk: Input::new(clk, Pull::Up),
            dt: Input::new(dt, Pull::Up),
        }
    }

    /// Sample both pins now.
    pub fn levels(&self) -> Levels {
        Levels::new(self.clk.is_high(), self.dt.is_high())
    }

    async fn wait_for_edge(&mut self) -> EncoderPin {
        match select(self.clk.wait_for_any_edge(), self.dt.wait_for_any_edge()).await {
            Either::First(()) => EncoderPin::Clk,
            Either::Second(()) => EncoderPin::Dt,
        }
    }
}

/// Forward every encoder edge to `decoder`.
pub async fn edge_task(mut pins: EncoderPins, decoder: &'static QuadratureDecoder) -> ! {
    loop {
        let pin = pins.wait_for_edge().await;
        if let Some(detent) = decoder.on_edge(pins.levels()) {
            trace!("encoder {} on {}: now {}", detent, pin, decoder.value());
        }
    }
}
