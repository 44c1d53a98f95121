use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::PanelError;

use super::{paths, Config};

const BACKEND_URL_ENV: &str = "PANEL_BACKEND_URL";

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let mut config = match Self::try_load().await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };

        if let Ok(custom) = env::var(BACKEND_URL_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                config.backend_url = trimmed.to_string();
            }
        }

        info!(
            backend = %config.backend_url,
            connectivity_ms = config.connectivity_interval_ms,
            device_status_ms = config.device_status_interval_ms,
            "Loaded configuration"
        );
        config
    }

    async fn try_load() -> Result<Self, PanelError> {
        let config_path = paths::get_config_path();
        Self::load_from(&config_path).await
    }

    /// Read a config file, returning defaults when it does not exist.
    pub async fn load_from(config_path: &Path) -> Result<Self, PanelError> {
        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .await
            .map_err(|err| PanelError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| PanelError::Config(format!("Failed to parse config.json: {err}")))
    }
}
