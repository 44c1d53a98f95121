mod classifier;
mod snapshot;

pub use classifier::{classify, StatusCategory};
pub use snapshot::{
    ConnectivitySnapshot, DeviceStatusSnapshot, StatusField, ARDUINO_CONNECTED,
    ARDUINO_DISCONNECTED, CONNECTION_ERROR_MARKER, ERROR_MARKER,
};
