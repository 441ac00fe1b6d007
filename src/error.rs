use thiserror::Error;

/// Failure reported by the transport underneath a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Failed to open stream: {0}")]
    Open(String),
    #[error("Stream failed: {message}")]
    Stream { message: String },
    #[error("Stream closed")]
    Closed,
}

impl TransportError {
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }
}

/// Why a one-shot query produced no response
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Transport rejected the initial frame")]
    InitialWriteRejected,
    #[error("Transport rejected audio chunk {index}")]
    AudioChunkRejected { index: usize },
}
