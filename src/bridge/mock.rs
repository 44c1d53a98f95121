//! Scripted in-memory bridge for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::PanelError;

use super::api::{Ack, ArduinoStatus, ConnectivityReport, DeviceStatusReport};
use super::backend::Bridge;

pub struct MockBridge {
    pub calls: Mutex<Vec<String>>,
    pub dialog_path: Mutex<Option<String>>,
    pub text_ack: Mutex<Ack>,
    pub connectivity: Mutex<ConnectivityReport>,
    pub device: Mutex<DeviceStatusReport>,
    pub serial_port: Mutex<String>,
    pub fail_begin: AtomicBool,
    pub fail_cancel: AtomicBool,
    pub fail_text: AtomicBool,
    pub fail_connectivity: AtomicBool,
    pub fail_device: AtomicBool,
    pub fail_serial_port: AtomicBool,
    /// Never answer `begin_transfer`.
    pub hold_begin: AtomicBool,
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            dialog_path: Mutex::new(None),
            text_ack: Mutex::new(Ack::new("success", "Mensagem enviada")),
            connectivity: Mutex::new(ConnectivityReport {
                computer_status: "OK".to_string(),
                serial_port_status: "Conectado".to_string(),
                arduino_status: ArduinoStatus::Flag(true),
                emitter_status: "Pronto".to_string(),
                receiver_status: "Aguardando...".to_string(),
            }),
            device: Mutex::new(DeviceStatusReport {
                connection_status: "Conectado".to_string(),
                emitter_status: "Pronto".to_string(),
                receiver_status: "Aguardando...".to_string(),
            }),
            serial_port: Mutex::new("Conectado".to_string()),
            fail_begin: AtomicBool::new(false),
            fail_cancel: AtomicBool::new(false),
            fail_text: AtomicBool::new(false),
            fail_connectivity: AtomicBool::new(false),
            fail_device: AtomicBool::new(false),
            fail_serial_port: AtomicBool::new(false),
            hold_begin: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.split(':').next() == Some(name))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), PanelError> {
        if flag.load(Ordering::SeqCst) {
            Err(PanelError::Backend(format!("{what} rejected")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Bridge for MockBridge {
    async fn open_file_dialog(&self) -> Result<Option<String>, PanelError> {
        self.record("open_file_dialog");
        Ok(self.dialog_path.lock().unwrap().clone())
    }

    async fn begin_transfer(&self, path: &str) -> Result<Ack, PanelError> {
        self.record(format!("begin_transfer:{path}"));
        if self.hold_begin.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Self::check(&self.fail_begin, "begin_transfer")?;
        Ok(Ack::new("success", "Envio iniciado"))
    }

    async fn cancel_transfer(&self) -> Result<Ack, PanelError> {
        self.record("cancel_transfer");
        Self::check(&self.fail_cancel, "cancel_transfer")?;
        Ok(Ack::new("success", "Sinal de cancelamento enviado."))
    }

    async fn send_text_message(&self, text: &str) -> Result<Ack, PanelError> {
        self.record(format!("send_text_message:{text}"));
        Self::check(&self.fail_text, "send_text_message")?;
        Ok(self.text_ack.lock().unwrap().clone())
    }

    async fn connectivity_status(&self) -> Result<ConnectivityReport, PanelError> {
        self.record("connectivity_status");
        Self::check(&self.fail_connectivity, "connectivity_status")?;
        Ok(self.connectivity.lock().unwrap().clone())
    }

    async fn device_status(&self) -> Result<DeviceStatusReport, PanelError> {
        self.record("device_status");
        Self::check(&self.fail_device, "device_status")?;
        Ok(self.device.lock().unwrap().clone())
    }

    async fn serial_port_status(&self) -> Result<String, PanelError> {
        self.record("serial_port_status");
        Self::check(&self.fail_serial_port, "serial_port_status")?;
        Ok(self.serial_port.lock().unwrap().clone())
    }
}
