use std::net::SocketAddr;

use thiserror::Error;

/// Server-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid log filter '{filter}': {message}")]
    LogFilter { filter: String, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Logging(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::LogFilter { .. } => 2,
            Self::Logging(_) => 2,
            Self::Bind { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
