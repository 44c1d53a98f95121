//! Backend-pushed lifecycle events and the pump that forwards them.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::api::EventEnvelope;
use super::client::HttpBridge;

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Terminal status of an outbound transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishStatus {
    Success,
    Cancelled,
    Error,
}

/// Outcome of an inbound file. Anything but `success` counts as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceptionStatus {
    Success,
    #[serde(other)]
    Error,
}

impl ReceptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceptionStatus::Success => "success",
            ReceptionStatus::Error => "error",
        }
    }
}

/// Typed callback delivered by the backend into the panel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    Progress {
        percent: f64,
    },
    FrameSummary {
        frame_count: u64,
        total_bytes: u64,
    },
    TransferFinished {
        status: FinishStatus,
        #[serde(default)]
        message: String,
    },
    FileReceived {
        status: ReceptionStatus,
        file_name: String,
        #[serde(default)]
        message: String,
    },
}

/// Decodes a batch, skipping entries whose payload is not a known event.
/// Returns the decoded events and the highest id seen.
pub fn decode_batch(since: u64, batch: Vec<EventEnvelope>) -> (Vec<BridgeEvent>, u64) {
    let mut last_event_id = since;
    let mut events = Vec::with_capacity(batch.len());
    for envelope in batch {
        if envelope.id > last_event_id {
            last_event_id = envelope.id;
        }
        match serde_json::from_value::<BridgeEvent>(envelope.event) {
            Ok(event) => events.push(event),
            Err(err) => warn!(id = envelope.id, error = %err, "Skipping undecodable backend event"),
        }
    }
    (events, last_event_id)
}

/// Long-polls the backend and forwards events in order until the receiving
/// side of `events` is dropped.
pub async fn pump_events(bridge: HttpBridge, events: Sender<BridgeEvent>, wait: Duration) {
    let mut since = 0;
    while !events.is_closed() {
        match bridge.wait_for_events(since, wait).await {
            Ok(batch) => {
                let (decoded, last_event_id) = decode_batch(since, batch);
                since = last_event_id;
                for event in decoded {
                    debug!(?event, "Forwarding backend event");
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(error = ?err, "Failed to fetch backend events");
                sleep(RETRY_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_batch_keeps_order_and_skips_unknown() {
        let batch = vec![
            EventEnvelope {
                id: 7,
                event: json!({"type": "progress", "percent": 12.5}),
            },
            EventEnvelope {
                id: 8,
                event: json!({"type": "reboot"}),
            },
            EventEnvelope {
                id: 9,
                event: json!({"type": "transfer_finished", "status": "cancelled", "message": "stopped"}),
            },
        ];

        let (events, last) = decode_batch(6, batch);
        assert_eq!(last, 9);
        assert_eq!(
            events,
            vec![
                BridgeEvent::Progress { percent: 12.5 },
                BridgeEvent::TransferFinished {
                    status: FinishStatus::Cancelled,
                    message: "stopped".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_reception_status_defaults_to_error() {
        let event: BridgeEvent = serde_json::from_value(json!({
            "type": "file_received",
            "status": "timeout",
            "file_name": "f.bin",
        }))
        .unwrap();
        assert_eq!(
            event,
            BridgeEvent::FileReceived {
                status: ReceptionStatus::Error,
                file_name: "f.bin".to_string(),
                message: String::new(),
            }
        );
    }

    #[test]
    fn test_decode_empty_batch_keeps_cursor() {
        let (events, last) = decode_batch(42, Vec::new());
        assert!(events.is_empty());
        assert_eq!(last, 42);
    }
}
