//! Periodic connectivity and device-status polls.
//!
//! Each tick issues one bridge request on a spawned task; the panel loop hands
//! the result back to [`ConnectivityPoller::apply`] or
//! [`DeviceStatusPoller::apply`]. A successful poll replaces the whole
//! snapshot, a failed one replaces every field with an error marker.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::bridge::{Bridge, ConnectivityReport, DeviceStatusReport};
use crate::logger::Logger;
use crate::panel::Completion;
use crate::status::{ConnectivitySnapshot, DeviceStatusSnapshot, StatusField};
use crate::types::PanelError;

const CHECKING: &str = "Verificando...";

#[derive(Debug)]
pub enum PollCompletion {
    Connectivity(Result<ConnectivityReport, PanelError>),
    DeviceStatus(Result<DeviceStatusReport, PanelError>),
    SerialPort(Result<String, PanelError>),
}

/// Outstanding-request bookkeeping shared by both pollers.
struct InFlight {
    count: usize,
    skip_overlapping: bool,
}

impl InFlight {
    fn new(skip_overlapping: bool) -> Self {
        Self {
            count: 0,
            skip_overlapping,
        }
    }

    fn admit(&mut self, poller: &'static str) -> bool {
        if self.skip_overlapping && self.count > 0 {
            debug!(poller, outstanding = self.count, "Skipping overlapping poll");
            return false;
        }
        self.count += 1;
        true
    }

    fn settle(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

fn spawn_poll<F>(completions: &UnboundedSender<Completion>, request: F)
where
    F: Future<Output = PollCompletion> + Send + 'static,
{
    let completions = completions.clone();
    tokio::spawn(async move {
        let completion = request.await;
        let _ = completions.send(Completion::Poll(completion));
    });
}

pub struct ConnectivityPoller {
    bridge: Arc<dyn Bridge>,
    completions: UnboundedSender<Completion>,
    log: Logger,
    interval: Duration,
    in_flight: InFlight,
    snapshot: ConnectivitySnapshot,
}

impl ConnectivityPoller {
    pub fn new(
        bridge: Arc<dyn Bridge>,
        completions: UnboundedSender<Completion>,
        log: Logger,
        interval: Duration,
        skip_overlapping: bool,
    ) -> Self {
        let checking = StatusField::new(CHECKING);
        Self {
            bridge,
            completions,
            log,
            interval,
            in_flight: InFlight::new(skip_overlapping),
            snapshot: ConnectivitySnapshot {
                computer: checking.clone(),
                serial_port: checking.clone(),
                arduino: checking.clone(),
                emitter: checking.clone(),
                receiver: checking,
            },
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot(&self) -> &ConnectivitySnapshot {
        &self.snapshot
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.count
    }

    /// Issues one poll. Returns false when the tick was skipped.
    pub fn tick(&mut self) -> bool {
        if !self.in_flight.admit("connectivity") {
            return false;
        }
        let bridge = Arc::clone(&self.bridge);
        spawn_poll(&self.completions, async move {
            PollCompletion::Connectivity(bridge.connectivity_status().await)
        });
        true
    }

    pub fn apply(&mut self, result: Result<ConnectivityReport, PanelError>) {
        self.in_flight.settle();
        match result {
            Ok(report) => {
                self.snapshot = ConnectivitySnapshot::from_report(&report);
                debug!(snapshot = ?self.snapshot, "Connectivity updated");
            }
            Err(err) => {
                warn!(error = ?err, "Connectivity poll failed");
                self.log
                    .log(format!("Falha ao obter status de conectividade: {err}"));
                self.snapshot = ConnectivitySnapshot::error();
            }
        }
    }

    /// On-demand read of the serial port alone.
    pub fn refresh_serial_port(&mut self) {
        let bridge = Arc::clone(&self.bridge);
        spawn_poll(&self.completions, async move {
            PollCompletion::SerialPort(bridge.serial_port_status().await)
        });
    }

    pub fn apply_serial_port(&mut self, result: Result<String, PanelError>) {
        self.snapshot.serial_port = match result {
            Ok(status) => StatusField::new(status),
            Err(err) => {
                warn!(error = ?err, "Serial port status request failed");
                self.log
                    .log(format!("Falha ao obter status da porta serial: {err}"));
                StatusField::error()
            }
        };
    }
}

pub struct DeviceStatusPoller {
    bridge: Arc<dyn Bridge>,
    completions: UnboundedSender<Completion>,
    log: Logger,
    interval: Duration,
    in_flight: InFlight,
    snapshot: DeviceStatusSnapshot,
}

impl DeviceStatusPoller {
    pub fn new(
        bridge: Arc<dyn Bridge>,
        completions: UnboundedSender<Completion>,
        log: Logger,
        interval: Duration,
        skip_overlapping: bool,
    ) -> Self {
        let checking = StatusField::new(CHECKING);
        Self {
            bridge,
            completions,
            log,
            interval,
            in_flight: InFlight::new(skip_overlapping),
            snapshot: DeviceStatusSnapshot {
                connection: checking.clone(),
                emitter: checking.clone(),
                receiver: checking,
            },
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot(&self) -> &DeviceStatusSnapshot {
        &self.snapshot
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.count
    }

    pub fn tick(&mut self) -> bool {
        if !self.in_flight.admit("device_status") {
            return false;
        }
        self.log.log("Solicitando status consolidado do dispositivo...");
        let bridge = Arc::clone(&self.bridge);
        spawn_poll(&self.completions, async move {
            PollCompletion::DeviceStatus(bridge.device_status().await)
        });
        true
    }

    pub fn apply(&mut self, result: Result<DeviceStatusReport, PanelError>) {
        self.in_flight.settle();
        match result {
            Ok(report) => {
                self.snapshot = DeviceStatusSnapshot::from_report(&report);
                self.log.log(format!(
                    "Status do dispositivo atualizado: conexão: {}, emissor: {}, receptor: {}",
                    report.connection_status, report.emitter_status, report.receiver_status
                ));
            }
            Err(err) => {
                warn!(error = ?err, "Device status poll failed");
                self.log.log(format!("Falha ao obter status do dispositivo: {err}"));
                self.snapshot = DeviceStatusSnapshot::error();
            }
        }
    }
}
