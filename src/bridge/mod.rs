mod api;
mod backend;
mod client;
mod events;
#[cfg(test)]
pub(crate) mod mock;

pub use api::{Ack, ArduinoStatus, ConnectivityReport, DeviceStatusReport};
pub use backend::Bridge;
pub use client::HttpBridge;
pub use events::{pump_events, BridgeEvent, FinishStatus, ReceptionStatus};
