//! SoftDevice GATT server and advertising task.
//!
//! [`SoftdeviceRadio`] adapts the S140 to [`Radio`]: advertising requests
//! are handed to [`run`] through a signal, and notifications go straight
//! to the connection.  Command writes are decoded inside the GATT event
//! callback and queued on [`COMMANDS`] for the main loop.

use core::mem;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use heapless::Vec;
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};

use crate::ble::adv::ADV_MAX_LEN;
use crate::ble::command::RemoteCommand;
use crate::ble::link::{decode_write, Radio, RemoteChannel};
use crate::ble::STATUS_LEN;
use crate::config::{BLE_DEVICE_NAME, COMMAND_MAX_LEN};
use crate::error::{BleError, Error, NotifyError};

/// Remote commands waiting for the main loop.
pub static COMMANDS: Channel<CriticalSectionRawMutex, RemoteCommand, 4> = Channel::new();

/// Shared peer state, locked by both the BLE task and the main loop.
pub type Link = Mutex<CriticalSectionRawMutex, RemoteChannel<Connection>>;

struct AdvRequest {
    interval_us: u32,
    payload: Vec<u8, ADV_MAX_LEN>,
}

static ADVERTISE: Signal<CriticalSectionRawMutex, AdvRequest> = Signal::new();
static SUBSCRIBED: AtomicBool = AtomicBool::new(false);

#[nrf_softdevice::gatt_service(uuid = "aaaa")]
pub struct TimerService {
    #[characteristic(uuid = "aaab", write)]
    command: Vec<u8, COMMAND_MAX_LEN>,
    #[characteristic(uuid = "aaac", read, notify)]
    status: [u8; STATUS_LEN],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub timer: TimerService,
}

/// Register the GATT table.
pub fn register(sd: &mut Softdevice) -> Result<Server, Error> {
    Server::new(sd).map_err(|e| {
        warn!("GATT register: {}", e);
        Error::Ble(BleError::GattRegister)
    })
}

/// SoftDevice configuration: one peripheral link, RC low-frequency clock.
pub fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            // SAFETY: all-zero is "no access" for the write permission.
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// [`Radio`] backed by the SoftDevice.
#[derive(Clone, Copy)]
pub struct SoftdeviceRadio {
    server: &'static Server,
}

impl SoftdeviceRadio {
    pub fn new(server: &'static Server) -> Self {
        Self { server }
    }
}

impl Radio for SoftdeviceRadio {
    type Peer = Connection;

    fn start_advertising(&mut self, interval_us: u32, payload: &[u8]) {
        let Ok(payload) = Vec::from_slice(payload) else {
            warn!("advertising payload too long ({} bytes)", payload.len());
            return;
        };
        ADVERTISE.signal(AdvRequest {
            interval_us,
            payload,
        });
    }

    fn stop_advertising(&mut self) {
        // The SoftDevice ends advertising on connect; drop any queued restart.
        ADVERTISE.reset();
    }

    fn notify(&mut self, peer: &Connection, status: &[u8; STATUS_LEN]) -> Result<(), NotifyError> {
        // Keep the readable value current even with notifications off.
        let _ = self.server.timer.status_set(status);
        if !SUBSCRIBED.load(Ordering::Relaxed) {
            return Ok(());
        }
        self.server.timer.status_notify(peer, status).map_err(|e| {
            warn!("status notify: {}", e);
            let _ = peer.disconnect();
            NotifyError
        })
    }
}

/// Advertise, serve one connection, repeat.
pub async fn run(sd: &'static Softdevice, mut radio: SoftdeviceRadio, link: &'static Link) -> ! {
    link.lock().await.start(&mut radio);

    loop {
        let request = ADVERTISE.wait().await;

        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &request.payload,
            scan_data: &[],
        };
        let config = peripheral::Config {
            interval: request.interval_us / 625,
            ..Default::default()
        };

        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("advertising failed: {}", e);
                // Retry with the same payload.
                ADVERTISE.signal(request);
                embassy_time::Timer::after_secs(1).await;
                continue;
            }
        };

        SUBSCRIBED.store(false, Ordering::Relaxed);
        link.lock().await.on_connect(&mut radio, conn.clone());

        let reason = gatt_server::run(&conn, radio.server, |event| match event {
            ServerEvent::Timer(TimerServiceEvent::CommandWrite(data)) => {
                if let Some(command) = decode_write(&data) {
                    if COMMANDS.try_send(command).is_err() {
                        warn!("command queue full - dropping {}", command);
                    }
                }
            }
            ServerEvent::Timer(TimerServiceEvent::StatusCccdWrite { notifications }) => {
                info!("status notifications: {}", notifications);
                SUBSCRIBED.store(notifications, Ordering::Relaxed);
            }
        })
        .await;

        info!("connection closed: {}", reason);
        SUBSCRIBED.store(false, Ordering::Relaxed);
        link.lock().await.on_disconnect(&mut radio);
    }
}
