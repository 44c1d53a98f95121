mod requests;
mod responses;

pub use requests::{BeginTransferRequest, EventStreamQuery, TextMessageRequest};
pub use responses::{
    Ack, ArduinoStatus, ConnectivityReport, DeviceStatusReport, EventEnvelope,
    FileDialogResponse, SerialPortResponse,
};
