pub mod bridge;
pub mod config;
pub mod controller;
pub mod logger;
pub mod panel;
pub mod poller;
pub mod session;
pub mod status;
pub mod types;

pub use config::Config;
pub use panel::{Panel, PanelCommand, PanelHandle, PanelView};
pub use types::PanelError;
