use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::types::PanelError;

use super::api::{
    Ack, BeginTransferRequest, ConnectivityReport, DeviceStatusReport, EventEnvelope,
    EventStreamQuery, FileDialogResponse, SerialPortResponse, TextMessageRequest,
};
use super::backend::Bridge;

/// Grace period on top of the server-side long-poll window.
const EVENT_WAIT_SLACK: Duration = Duration::from_secs(10);

/// JSON-over-HTTP bridge to the backend process that owns the serial link.
#[derive(Clone)]
pub struct HttpBridge {
    http: Client,
    base_url: String,
}

impl HttpBridge {
    pub fn connect(config: &Config) -> Result<Self, PanelError> {
        let base_url = config.backend_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(PanelError::Config("backend_url is empty".to_string()));
        }

        let http = Client::builder().build().map_err(PanelError::Http)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Long-polls the backend event stream for entries newer than `since`.
    pub async fn wait_for_events(
        &self,
        since: u64,
        timeout: Duration,
    ) -> Result<Vec<EventEnvelope>, PanelError> {
        let query = EventStreamQuery {
            since,
            timeout: timeout.as_secs().clamp(1, 300),
        };
        let request = self
            .http
            .get(self.url("/api/events"))
            .query(&query)
            .timeout(timeout + EVENT_WAIT_SLACK);
        self.send_json("/api/events", request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, PanelError>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(self.url(path));
        self.send_json(path, request).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, PanelError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.http.post(self.url(path)).json(body);
        self.send_json(path, request).await
    }

    async fn send_json<T>(&self, path: &str, request: RequestBuilder) -> Result<T, PanelError>
    where
        T: DeserializeOwned,
    {
        debug!(path, "Bridge request");
        let response = request.send().await.map_err(PanelError::Http)?;

        if !response.status().is_success() {
            return Err(PanelError::Backend(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response.json::<T>().await.map_err(PanelError::Http)
    }
}

#[async_trait]
impl Bridge for HttpBridge {
    async fn open_file_dialog(&self) -> Result<Option<String>, PanelError> {
        let response: FileDialogResponse = self.get_json("/api/file-dialog").await?;
        Ok(response.path.filter(|path| !path.is_empty()))
    }

    async fn begin_transfer(&self, path: &str) -> Result<Ack, PanelError> {
        self.post_json("/api/transfer/begin", &BeginTransferRequest { path })
            .await
    }

    async fn cancel_transfer(&self) -> Result<Ack, PanelError> {
        self.post_json("/api/transfer/cancel", &()).await
    }

    async fn send_text_message(&self, text: &str) -> Result<Ack, PanelError> {
        self.post_json("/api/text", &TextMessageRequest { text }).await
    }

    async fn connectivity_status(&self) -> Result<ConnectivityReport, PanelError> {
        self.get_json("/api/connectivity").await
    }

    async fn device_status(&self) -> Result<DeviceStatusReport, PanelError> {
        self.get_json("/api/device-status").await
    }

    async fn serial_port_status(&self) -> Result<String, PanelError> {
        let response: SerialPortResponse = self.get_json("/api/serial-port").await?;
        Ok(response.status)
    }
}
