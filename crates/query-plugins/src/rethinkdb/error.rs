use query_service::ErrorCause;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReqlError {
    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Client(String),

    #[error("{0}")]
    Compile(String),

    #[error("{0}")]
    Runtime(String),
}

impl ErrorCause for ReqlError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connection",
            Self::Io(_) => "transport",
            Self::Handshake(_) => "handshake",
            Self::Auth(_) => "auth",
            Self::Protocol(_) => "protocol",
            Self::Client(_) => "client",
            Self::Compile(_) => "compile",
            Self::Runtime(_) => "runtime",
        }
    }
}
