use async_trait::async_trait;

use crate::types::PanelError;

use super::api::{Ack, ConnectivityReport, DeviceStatusReport};

/// Asynchronous request/response channel to the hardware backend.
///
/// No call carries its own timeout: a backend that never answers leaves only
/// that awaited request pending.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Opens the OS file dialog. `None` means the user closed it.
    async fn open_file_dialog(&self) -> Result<Option<String>, PanelError>;

    /// Asks the backend to start sending `path`. Progress and completion
    /// arrive later as pushed events.
    async fn begin_transfer(&self, path: &str) -> Result<Ack, PanelError>;

    /// Requests cooperative cancellation of the running transfer.
    async fn cancel_transfer(&self) -> Result<Ack, PanelError>;

    async fn send_text_message(&self, text: &str) -> Result<Ack, PanelError>;

    async fn connectivity_status(&self) -> Result<ConnectivityReport, PanelError>;

    async fn device_status(&self) -> Result<DeviceStatusReport, PanelError>;

    async fn serial_port_status(&self) -> Result<String, PanelError>;
}
