use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{status, message}` acknowledgement returned by command endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl Ack {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDialogResponse {
    #[serde(default)]
    pub path: Option<String>,
}

/// The board flag arrives either as a boolean or as a status word.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ArduinoStatus {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    pub computer_status: String,
    pub serial_port_status: String,
    pub arduino_status: ArduinoStatus,
    pub emitter_status: String,
    pub receiver_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceStatusReport {
    pub connection_status: String,
    pub emitter_status: String,
    pub receiver_status: String,
}

#[derive(Debug, Deserialize)]
pub struct SerialPortResponse {
    pub status: String,
}

/// One entry of the long-polled event stream. `event` stays raw so a single
/// unknown event kind does not poison the whole batch.
#[derive(Debug, Deserialize)]
pub struct EventEnvelope {
    pub id: u64,
    pub event: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_report_accepts_bool_or_string() {
        let with_bool: ConnectivityReport = serde_json::from_str(
            r#"{"computerStatus":"OK","serialPortStatus":"Conectado","arduinoStatus":true,
                "emitterStatus":"Pronto","receiverStatus":"Aguardando..."}"#,
        )
        .unwrap();
        assert_eq!(with_bool.arduino_status, ArduinoStatus::Flag(true));

        let with_text: ConnectivityReport = serde_json::from_str(
            r#"{"computerStatus":"OK","serialPortStatus":"Conectado","arduinoStatus":"Desconectado",
                "emitterStatus":"Inativo","receiverStatus":"Inativo"}"#,
        )
        .unwrap();
        assert_eq!(
            with_text.arduino_status,
            ArduinoStatus::Text("Desconectado".to_string())
        );
    }

    #[test]
    fn test_ack_without_message() {
        let ack: Ack = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ack.is_success());
        assert!(ack.message.is_empty());
    }
}
