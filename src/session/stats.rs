use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Statistics about a conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier used in log lines
    pub session_id: Uuid,

    /// When the session was opened
    pub started_at: DateTime<Utc>,

    /// Frames the transport accepted
    pub frames_sent: usize,

    /// Audio bytes carried by accepted continuation frames
    pub audio_bytes_sent: usize,

    /// Writes the transport refused
    pub failed_writes: usize,

    /// Inbound frames read by the session itself
    ///
    /// Frames read through [`crate::InboundFrames`] after a turn session
    /// hands over its inbound side are counted by
    /// [`crate::InboundFrames::received`] instead.
    pub frames_received: usize,
}

impl SessionStats {
    pub(crate) fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            started_at: Utc::now(),
            frames_sent: 0,
            audio_bytes_sent: 0,
            failed_writes: 0,
            frames_received: 0,
        }
    }
}
