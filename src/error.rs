// Error types shared by every layer of the client
use thiserror::Error;

// Failures raised while talking to the provider over HTTP
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("request error: {0}")]
    Request(String),
}

// Everything that can go wrong inside a single operation. These never reach the
// caller as `Err`: the envelope layer turns them into `{status: "error"}`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GoldenTourError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("malformed response body: {0}")]
    MalformedResponse(String),
}

impl GoldenTourError {
    // Stable tag for logs; the public envelope only carries the message
    pub fn kind(&self) -> &'static str {
        match self {
            GoldenTourError::UnknownLanguage(_) => "unknown_language",
            GoldenTourError::MissingParameter(_) => "missing_parameter",
            GoldenTourError::Transport(_) => "transport",
            GoldenTourError::Serialization(_) => "serialization",
            GoldenTourError::MalformedResponse(_) => "malformed_response",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}
