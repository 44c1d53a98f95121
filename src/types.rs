use thiserror::Error;

use crate::session::Rejection;

/// Errors raised while talking to the transfer backend or loading configuration.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("panel channel closed")]
    ChannelClosed,
}
