//! Peer lifecycle and status pacing for the single remote client.
//!
//! [`RemoteChannel`] is the one piece of state shared between the radio
//! event path (connect / disconnect) and the main loop (periodic status).
//! Whoever touches it last wins; there is no reconciliation because at
//! most one peer exists.
//!
//! The radio is reached only through [`Radio`], so the lifecycle rules
//! are exercised on the host with a mock.

use crate::ble::adv::AdvPayload;
use crate::ble::command::RemoteCommand;
use crate::ble::{status_record, STATUS_LEN};
use crate::config::STATUS_NOTIFY_INTERVAL_MS;
use crate::error::NotifyError;
use crate::timer::TimerSnapshot;

/// Capabilities the link needs from the BLE stack.
pub trait Radio {
    /// Opaque handle of a connected central.
    type Peer: Clone;

    fn start_advertising(&mut self, interval_us: u32, payload: &[u8]);

    fn stop_advertising(&mut self);

    /// Push one status record to `peer`.
    fn notify(&mut self, peer: &Self::Peer, status: &[u8; STATUS_LEN]) -> Result<(), NotifyError>;
}

pub struct RemoteChannel<P> {
    peer: Option<P>,
    payload: AdvPayload,
    interval_us: u32,
    last_notify_ms: Option<u32>,
}

impl<P: Clone> RemoteChannel<P> {
    pub fn new(payload: AdvPayload, interval_us: u32) -> Self {
        Self {
            peer: None,
            payload,
            interval_us,
            last_notify_ms: None,
        }
    }

    pub fn peer(&self) -> Option<&P> {
        self.peer.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    pub fn payload(&self) -> &AdvPayload {
        &self.payload
    }

    /// Begin advertising at boot.
    pub fn start<R: Radio<Peer = P>>(&mut self, radio: &mut R) {
        info!("advertising ({} bytes)", self.payload.as_bytes().len());
        self.advertise(radio);
    }

    /// A central connected: remember it and go quiet.
    pub fn on_connect<R: Radio<Peer = P>>(&mut self, radio: &mut R, peer: P) {
        info!("peer connected");
        self.peer = Some(peer);
        self.last_notify_ms = None;
        radio.stop_advertising();
    }

    /// The central went away.  Advertising resumes with the startup
    /// payload.  A second disconnect for the same peer is a no-op.
    pub fn on_disconnect<R: Radio<Peer = P>>(&mut self, radio: &mut R) {
        if self.peer.take().is_some() {
            info!("peer disconnected");
            self.advertise(radio);
        }
    }

    /// Send the status record if a peer is attached and the notify
    /// period has elapsed.  Returns `true` if a record went out.
    pub fn poll_status<R: Radio<Peer = P>>(
        &mut self,
        radio: &mut R,
        now_ms: u32,
        snapshot: &TimerSnapshot,
    ) -> bool {
        let Some(peer) = self.peer.clone() else {
            return false;
        };

        if let Some(last) = self.last_notify_ms {
            if now_ms.wrapping_sub(last) < STATUS_NOTIFY_INTERVAL_MS {
                return false;
            }
        }
        self.last_notify_ms = Some(now_ms);

        match radio.notify(&peer, &status_record(snapshot)) {
            Ok(()) => true,
            Err(NotifyError) => {
                // Peer vanished mid-write: treat as a disconnect, no retry.
                warn!("status notify failed; dropping peer");
                self.on_disconnect(radio);
                false
            }
        }
    }

    fn advertise<R: Radio<Peer = P>>(&mut self, radio: &mut R) {
        radio.start_advertising(self.interval_us, self.payload.as_bytes());
    }
}

/// Decode a command write, logging what gets dropped.
pub fn decode_write(data: &[u8]) -> Option<RemoteCommand> {
    let command = RemoteCommand::parse(data);
    if command.is_none() {
        info!("ignoring malformed command ({} bytes)", data.len());
    }
    command
}
