use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use transfer_panel::bridge::{pump_events, HttpBridge};
use transfer_panel::{Config, Panel, PanelCommand};

// Single-threaded so spawned bridge requests start in the order they were issued.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().await;
    let bridge = match HttpBridge::connect(&config) {
        Ok(bridge) => bridge,
        Err(err) => {
            error!(error = %err, "Failed to set up backend bridge");
            std::process::exit(1);
        }
    };
    info!(backend = bridge.base_url(), "Connecting to transfer backend");

    let (panel, handle) = Panel::new(Arc::new(bridge.clone()), &config);
    tokio::spawn(pump_events(bridge, handle.events(), config.event_wait()));

    let mut view = handle.view();
    tokio::spawn(async move {
        while view.changed().await.is_ok() {
            let snapshot = view.borrow_and_update().clone();
            match serde_json::to_string(&snapshot) {
                Ok(json) => debug!(view = %json, "Panel view updated"),
                Err(err) => warn!(error = %err, "Failed to serialize panel view"),
            }
        }
    });

    let panel_task = tokio::spawn(panel.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "Failed to read command input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match PanelCommand::parse(&line) {
            Ok(command) => {
                let quit = command == PanelCommand::Shutdown;
                if handle.send(command).await.is_err() || quit {
                    break;
                }
            }
            Err(err) => warn!(error = %err, "Ignoring input"),
        }
    }

    let _ = handle.send(PanelCommand::Shutdown).await;
    if let Err(err) = panel_task.await {
        error!(error = %err, "Panel task failed");
    }
}
