//! dial-timer firmware entry point (nRF52840 + S140).
//!
//! Bring-up order: display, SoftDevice + GATT server, encoder, button.
//! Any bring-up failure is shown on the panel (when it exists) and the
//! firmware parks.  After that the 10 ms main loop never returns an error.
//!
//! | Task             | Executor          | Role                          |
//! |------------------|-------------------|-------------------------------|
//! | `encoder_task`   | interrupt (P3)    | encoder edges → decoder       |
//! | `softdevice_task`| thread            | SoftDevice event pump         |
//! | `ble_task`       | thread            | advertise / serve one peer    |
//! | `main`           | thread            | timer, display, status notify |

#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use panic_probe as _;

use embassy_executor::{InterruptExecutor, Spawner};
use embassy_nrf::gpio::{Input, Pin, Pull};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker, Timer};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

use dial_timer::ble::server::{self, Link, Server, SoftdeviceRadio, COMMANDS};
use dial_timer::ble::{AdvPayload, RemoteChannel};
use dial_timer::config::{
    BLE_ADV_INTERVAL_US, BLE_DEVICE_NAME, COMMAND_CHAR_UUID, DIAL, STATUS_CHAR_UUID, TICK_MS,
    TIMER_SERVICE_UUID,
};
use dial_timer::encoder::edges::{self, EncoderPins};
use dial_timer::encoder::QuadratureDecoder;
use dial_timer::error::{BleError, Error};
use dial_timer::timer::TimerMachine;
use dial_timer::ui::display::{self, Display};
use dial_timer::ui::{render, Presenter};

bind_interrupts!(struct Irqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

type Panel = Display<Twim<'static, peripherals::TWISPI0>>;

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

static SERVER: StaticCell<Server> = StaticCell::new();
static LINK: StaticCell<Link> = StaticCell::new();
static DECODER: StaticCell<QuadratureDecoder> = StaticCell::new();

#[interrupt]
unsafe fn EGU0_SWI0() {
    EXECUTOR_HIGH.on_interrupt()
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, radio: SoftdeviceRadio, link: &'static Link) -> ! {
    server::run(sd, radio, link).await
}

#[embassy_executor::task]
async fn encoder_task(pins: EncoderPins, decoder: &'static QuadratureDecoder) -> ! {
    edges::edge_task(pins, decoder).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dial-timer starting");

    // Priorities 0, 1 and 4 belong to the SoftDevice.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    interrupt::TWISPI0.set_priority(Priority::P3);
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut panel = match display::init(i2c) {
        Ok(panel) => panel,
        // Nothing to draw on; log and park.
        Err(e) => halt(e),
    };
    render::draw_splash(&mut panel);

    // ── BLE ─────────────────────────────────────────────────────────────
    let sd = Softdevice::enable(&server::softdevice_config());
    let gatt: &'static Server = match server::register(sd) {
        Ok(s) => SERVER.init(s),
        Err(e) => fail(&mut panel, e),
    };
    let sd: &'static Softdevice = sd;
    if spawner.spawn(softdevice_task(sd)).is_err() {
        fail(&mut panel, Error::Ble(BleError::AdvertiseFailed));
    }

    let payload = match AdvPayload::build(BLE_DEVICE_NAME, TIMER_SERVICE_UUID) {
        Ok(payload) => payload,
        Err(e) => fail(&mut panel, e),
    };
    info!(
        "service {=str}: command {=u16:#x}, status {=u16:#x}",
        TIMER_SERVICE_UUID,
        COMMAND_CHAR_UUID,
        STATUS_CHAR_UUID
    );
    let link: &'static Link =
        LINK.init(Mutex::new(RemoteChannel::new(payload, BLE_ADV_INTERVAL_US)));
    let mut radio = SoftdeviceRadio::new(gatt);
    if spawner.spawn(ble_task(sd, radio, link)).is_err() {
        fail(&mut panel, Error::Ble(BleError::AdvertiseFailed));
    }

    // ── Encoder ─────────────────────────────────────────────────────────
    let pins = EncoderPins::new(p.P0_03.degrade(), p.P0_04.degrade());
    let decoder: &'static QuadratureDecoder = match QuadratureDecoder::new(DIAL, pins.levels()) {
        Ok(d) => DECODER.init(d),
        Err(e) => fail(&mut panel, e),
    };
    interrupt::EGU0_SWI0.set_priority(Priority::P3);
    let high = EXECUTOR_HIGH.start(interrupt::EGU0_SWI0);
    if high.spawn(encoder_task(pins, decoder)).is_err() {
        fail(&mut panel, Error::Encoder);
    }

    let button = Input::new(p.P0_11, Pull::Up);

    Timer::after_millis(1000).await;

    // ── Main loop ───────────────────────────────────────────────────────
    let mut timer = TimerMachine::new(decoder);
    let mut presenter = Presenter::new();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    info!("ready");

    loop {
        // Wrapping millisecond counter; everything downstream uses wrapping_sub.
        let now = Instant::now().as_millis() as u32;

        let mut outcome = timer.tick(now, decoder, button.is_low());
        while let Ok(command) = COMMANDS.try_receive() {
            outcome = outcome.merge(timer.command(now, command, decoder));
        }

        let snapshot = timer.snapshot();
        presenter.update(&mut panel, &snapshot, now, outcome);
        link.lock().await.poll_status(&mut radio, now, &snapshot);

        ticker.next().await;
    }
}

/// Show the failed subsystem, then park.
fn fail(panel: &mut Panel, err: Error) -> ! {
    render::draw_banner(panel, err.banner());
    halt(err)
}

fn halt(err: Error) -> ! {
    error!("fatal: {}", err);
    loop {
        cortex_m::asm::wfi();
    }
}
