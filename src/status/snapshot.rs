use serde::Serialize;

use crate::bridge::{ArduinoStatus, ConnectivityReport, DeviceStatusReport};

use super::classifier::{classify, StatusCategory};

pub const ERROR_MARKER: &str = "Erro";
pub const CONNECTION_ERROR_MARKER: &str = "Erro de Conexão";
pub const ARDUINO_CONNECTED: &str = "Conectado";
pub const ARDUINO_DISCONNECTED: &str = "Desconectado";

/// A raw status string together with its classified category.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct StatusField {
    pub text: String,
    pub category: StatusCategory,
}

impl StatusField {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let category = classify(&text);
        Self { text, category }
    }

    /// Explicit error marker used when a poll fails.
    pub fn error() -> Self {
        Self::new(ERROR_MARKER)
    }

    pub fn is_error(&self) -> bool {
        self.category == StatusCategory::Error
    }
}

/// Connectivity of the host, serial port, board and RF modules.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct ConnectivitySnapshot {
    pub computer: StatusField,
    pub serial_port: StatusField,
    pub arduino: StatusField,
    pub emitter: StatusField,
    pub receiver: StatusField,
}

impl ConnectivitySnapshot {
    pub fn from_report(report: &ConnectivityReport) -> Self {
        Self {
            computer: StatusField::new(report.computer_status.as_str()),
            serial_port: StatusField::new(report.serial_port_status.as_str()),
            arduino: StatusField::new(normalize_arduino(&report.arduino_status)),
            emitter: StatusField::new(report.emitter_status.as_str()),
            receiver: StatusField::new(report.receiver_status.as_str()),
        }
    }

    pub fn error() -> Self {
        Self {
            computer: StatusField::error(),
            serial_port: StatusField::error(),
            arduino: StatusField::error(),
            emitter: StatusField::error(),
            receiver: StatusField::error(),
        }
    }

    pub fn fields(&self) -> [&StatusField; 5] {
        [
            &self.computer,
            &self.serial_port,
            &self.arduino,
            &self.emitter,
            &self.receiver,
        ]
    }
}

/// Consolidated board status reported by the device itself.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct DeviceStatusSnapshot {
    pub connection: StatusField,
    pub emitter: StatusField,
    pub receiver: StatusField,
}

impl DeviceStatusSnapshot {
    pub fn from_report(report: &DeviceStatusReport) -> Self {
        Self {
            connection: StatusField::new(report.connection_status.as_str()),
            emitter: StatusField::new(report.emitter_status.as_str()),
            receiver: StatusField::new(report.receiver_status.as_str()),
        }
    }

    pub fn error() -> Self {
        Self {
            connection: StatusField::new(CONNECTION_ERROR_MARKER),
            emitter: StatusField::error(),
            receiver: StatusField::error(),
        }
    }

    pub fn fields(&self) -> [&StatusField; 3] {
        [&self.connection, &self.emitter, &self.receiver]
    }
}

fn normalize_arduino(status: &ArduinoStatus) -> &'static str {
    match status {
        ArduinoStatus::Flag(true) => ARDUINO_CONNECTED,
        ArduinoStatus::Text(text) if text == ARDUINO_CONNECTED => ARDUINO_CONNECTED,
        _ => ARDUINO_DISCONNECTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(arduino: ArduinoStatus) -> ConnectivityReport {
        ConnectivityReport {
            computer_status: "OK".to_string(),
            serial_port_status: "Disponível, mas Não Conectada".to_string(),
            arduino_status: arduino,
            emitter_status: "Pronto".to_string(),
            receiver_status: "Aguardando...".to_string(),
        }
    }

    #[test]
    fn test_fields_are_classified() {
        let snapshot = ConnectivitySnapshot::from_report(&report(ArduinoStatus::Flag(true)));
        assert_eq!(snapshot.computer.category, StatusCategory::Ok);
        assert_eq!(snapshot.serial_port.category, StatusCategory::NotOk);
        assert_eq!(snapshot.emitter.category, StatusCategory::Ok);
        assert_eq!(snapshot.receiver.category, StatusCategory::Receiving);
    }

    #[test]
    fn test_arduino_status_is_normalized() {
        let connected = ConnectivitySnapshot::from_report(&report(ArduinoStatus::Flag(true)));
        assert_eq!(connected.arduino.text, ARDUINO_CONNECTED);

        let by_text = ConnectivitySnapshot::from_report(&report(ArduinoStatus::Text(
            "Conectado".to_string(),
        )));
        assert_eq!(by_text.arduino.text, ARDUINO_CONNECTED);

        let flag_off = ConnectivitySnapshot::from_report(&report(ArduinoStatus::Flag(false)));
        assert_eq!(flag_off.arduino.text, ARDUINO_DISCONNECTED);

        let other = ConnectivitySnapshot::from_report(&report(ArduinoStatus::Text(
            "Conectando".to_string(),
        )));
        assert_eq!(other.arduino.text, ARDUINO_DISCONNECTED);
        assert_eq!(other.arduino.category, StatusCategory::NotOk);
    }

    #[test]
    fn test_error_snapshots_mark_every_field() {
        assert!(ConnectivitySnapshot::error().fields().iter().all(|f| f.is_error()));
        assert!(DeviceStatusSnapshot::error().fields().iter().all(|f| f.is_error()));
    }
}
