//! End-to-end tests of the dial-timer main loop on the host.
//!
//! `Rig` mirrors the firmware loop: tick the timer, drain remote writes,
//! update the display, pace status notifications.  The clock is simulated
//! in 10 ms steps; the display and radio are recorders.

use dial_timer::ble::link::decode_write;
use dial_timer::ble::{AdvPayload, Radio, RemoteChannel, RemoteCommand, STATUS_LEN};
use dial_timer::config::{BLE_ADV_INTERVAL_US, BLE_DEVICE_NAME, DIAL, TIMER_SERVICE_UUID};
use dial_timer::encoder::{Levels, QuadratureDecoder};
use dial_timer::error::NotifyError;
use dial_timer::timer::{TimerMachine, TimerPhase};
use dial_timer::ui::{DisplaySink, Presenter};

#[derive(Default)]
struct Screen {
    lines: Vec<String>,
    inverted: bool,
    presents: usize,
    inverts: Vec<bool>,
}

impl DisplaySink for Screen {
    fn clear(&mut self) {
        self.lines.clear();
    }
    fn draw_text(&mut self, text: &str, _x: i32, _y: i32) {
        self.lines.push(text.to_string());
    }
    fn present(&mut self) {
        self.presents += 1;
    }
    fn invert(&mut self, inverted: bool) {
        self.inverted = inverted;
        self.inverts.push(inverted);
    }
}

#[derive(Default)]
struct Air {
    advertising: Option<Vec<u8>>,
    adverts: usize,
    sent: Vec<(u32, [u8; STATUS_LEN])>,
    drop_next_notify: bool,
}

impl Radio for Air {
    type Peer = u32;

    fn start_advertising(&mut self, _interval_us: u32, payload: &[u8]) {
        self.advertising = Some(payload.to_vec());
        self.adverts += 1;
    }

    fn stop_advertising(&mut self) {
        self.advertising = None;
    }

    fn notify(&mut self, peer: &u32, status: &[u8; STATUS_LEN]) -> Result<(), NotifyError> {
        if self.drop_next_notify {
            self.drop_next_notify = false;
            return Err(NotifyError);
        }
        self.sent.push((*peer, *status));
        Ok(())
    }
}

struct Rig {
    now: u32,
    quadrature: u8,
    encoder: QuadratureDecoder,
    timer: TimerMachine,
    presenter: Presenter,
    screen: Screen,
    air: Air,
    link: RemoteChannel<u32>,
    inbox: Vec<RemoteCommand>,
}

impl Rig {
    fn boot() -> Self {
        let encoder = QuadratureDecoder::new(DIAL, Levels::for_phase(0)).unwrap();
        let timer = TimerMachine::new(&encoder);
        let payload = AdvPayload::build(BLE_DEVICE_NAME, TIMER_SERVICE_UUID).unwrap();
        let mut rig = Rig {
            now: 0,
            quadrature: 0,
            encoder,
            timer,
            presenter: Presenter::new(),
            screen: Screen::default(),
            air: Air::default(),
            link: RemoteChannel::new(payload, BLE_ADV_INTERVAL_US),
            inbox: Vec::new(),
        };
        rig.link.start(&mut rig.air);
        rig
    }

    fn step(&mut self, pressed: bool) {
        let mut outcome = self.timer.tick(self.now, &self.encoder, pressed);
        for command in self.inbox.drain(..) {
            outcome = outcome.merge(self.timer.command(self.now, command, &self.encoder));
        }
        let snapshot = self.timer.snapshot();
        self.presenter
            .update(&mut self.screen, &snapshot, self.now, outcome);
        self.link.poll_status(&mut self.air, self.now, &snapshot);
        self.now = self.now.wrapping_add(10);
    }

    fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms / 10 {
            self.step(false);
        }
    }

    fn press(&mut self) {
        for _ in 0..5 {
            self.step(true);
        }
        self.step(false);
    }

    /// Turn the knob by whole detents, one quadrature edge per tick.
    fn turn(&mut self, detents: i32) {
        let forward = detents > 0;
        for _ in 0..detents.unsigned_abs() * 4 {
            self.quadrature = if forward {
                (self.quadrature + 1) & 3
            } else {
                (self.quadrature + 3) & 3
            };
            self.encoder.on_edge(Levels::for_phase(self.quadrature));
            self.step(false);
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if let Some(command) = decode_write(bytes) {
            self.inbox.push(command);
        }
    }
}

#[test]
fn dial_press_and_run_to_finished() {
    let mut rig = Rig::boot();
    rig.turn(5);
    assert_eq!(rig.timer.snapshot().configured_minutes, 5);
    assert_eq!(rig.screen.lines, ["Set minutes:", "05", "Press to START"]);

    rig.press();
    assert_eq!(rig.timer.phase(), TimerPhase::Counting);
    assert_eq!(rig.screen.lines[0], "05:00");

    rig.run_ms(61_000);
    assert_eq!(rig.screen.lines[0], "03:59");

    rig.run_ms(240_000);
    assert_eq!(rig.timer.phase(), TimerPhase::Finished);
    assert_eq!(rig.screen.lines, ["TIME'S", "UP!", "Press to reset"]);

    // The blink has played out and left the panel in normal video.
    rig.run_ms(2_000);
    assert_eq!(rig.screen.inverts, [true, false, true, false, true, false]);
    assert!(!rig.screen.inverted);

    rig.press();
    assert_eq!(rig.timer.snapshot().configured_minutes, 0);
    assert_eq!(rig.screen.lines[1], "00");
}

#[test]
fn dial_is_bounded_at_both_ends() {
    let mut rig = Rig::boot();
    rig.turn(-3);
    assert_eq!(rig.encoder.value(), 0);
    rig.turn(95);
    assert_eq!(rig.timer.snapshot().configured_minutes, 90);
    assert_eq!(rig.screen.lines[1], "90");
}

#[test]
fn cancel_keeps_configured_minutes_and_dial_position() {
    let mut rig = Rig::boot();
    rig.turn(2);
    rig.press();
    rig.run_ms(10_000);
    rig.press();

    assert_eq!(rig.timer.phase(), TimerPhase::Setting);
    assert_eq!(rig.timer.snapshot().remaining_seconds, 120);

    // The next click continues from the configured value.
    rig.turn(1);
    assert_eq!(rig.timer.snapshot().configured_minutes, 3);
}

#[test]
fn remote_client_drives_the_timer_and_sees_status() {
    let mut rig = Rig::boot();
    rig.link.on_connect(&mut rig.air, 7);
    assert_eq!(rig.air.advertising, None);

    rig.write(b"SET:45");
    rig.step(false);
    assert_eq!(rig.encoder.value(), 45);
    assert_eq!(rig.screen.lines[1], "45");

    rig.write(b"START");
    rig.run_ms(1_500);
    let (peer, last) = *rig.air.sent.last().unwrap();
    assert_eq!(peer, 7);
    assert_eq!(last[0], 1);
    assert_eq!(u16::from_le_bytes([last[1], last[2]]), 2699);

    // Turning the knob mid-countdown does not change the duration.
    rig.turn(3);
    assert_eq!(rig.timer.snapshot().configured_minutes, 45);

    rig.write(b"STOP");
    rig.run_ms(500);
    assert_eq!(rig.air.sent.last().unwrap().1, [0, 0, 0]);
}

#[test]
fn status_is_paced_to_twice_a_second() {
    let mut rig = Rig::boot();
    rig.link.on_connect(&mut rig.air, 1);
    rig.run_ms(10_000);
    assert_eq!(rig.air.sent.len(), 20);
}

#[test]
fn no_status_without_a_peer() {
    let mut rig = Rig::boot();
    rig.turn(1);
    rig.run_ms(3_000);
    assert!(rig.air.sent.is_empty());
    // Boot screen plus one redraw for the click; idling draws nothing.
    assert_eq!(rig.screen.presents, 2);
}

#[test]
fn lost_peer_resumes_advertising_with_boot_payload() {
    let mut rig = Rig::boot();
    let boot_payload = rig.air.advertising.clone().unwrap();
    rig.link.on_connect(&mut rig.air, 3);

    rig.write(b"SET:1");
    rig.write(b"START");
    rig.run_ms(1_000);

    rig.air.drop_next_notify = true;
    rig.run_ms(1_000);

    assert!(!rig.link.is_connected());
    assert_eq!(rig.air.advertising.as_deref(), Some(&boot_payload[..]));
    assert_eq!(rig.air.adverts, 2);

    // The countdown carries on without a peer.
    assert_eq!(rig.timer.phase(), TimerPhase::Counting);
}

#[test]
fn garbage_writes_are_dropped() {
    let mut rig = Rig::boot();
    rig.turn(4);
    for bad in [&b"SET:91"[..], b"SET:-1", b"SET:abc", b"GO", b"\x00\x01"] {
        rig.write(bad);
    }
    rig.run_ms(100);
    assert!(rig.inbox.is_empty());
    assert_eq!(rig.timer.snapshot().configured_minutes, 4);
}
