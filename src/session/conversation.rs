use super::stats::SessionStats;
use crate::assistant::Identity;
use crate::protocol::OutgoingFrame;
use crate::transport::FrameSink;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Capability shared by the text and audio session kinds
///
/// The first `send` opens the conversation: the payload is stamped with the
/// device identity and audio configuration. What later sends look like depends
/// on the session kind.
pub trait ConversationSession {
    type Payload;

    /// Write a payload; false when the transport refused it
    ///
    /// Nothing is retried and the session stays open on failure.
    fn send(&mut self, payload: Self::Payload) -> bool;

    /// Abandon the session in both directions
    fn close(&mut self);

    fn id(&self) -> Uuid;

    fn stats(&self) -> &SessionStats;

    /// Latest continuation token sent or received on this session
    fn conversation_state(&self) -> Option<&[u8]>;
}

/// Write-side state common to both session kinds
pub(crate) struct SessionCore {
    identity: Arc<Identity>,
    sink: Box<dyn FrameSink>,
    initial_sent: bool,
    initial_accepted: bool,
    write_closed: bool,
    closed: bool,
    conversation_state: Option<Vec<u8>>,
    stats: SessionStats,
}

impl SessionCore {
    pub(crate) fn new(identity: Arc<Identity>, sink: Box<dyn FrameSink>) -> Self {
        let id = Uuid::new_v4();
        debug!("Opening session {} as {}", id, identity.device_id);

        Self {
            identity,
            sink,
            initial_sent: false,
            initial_accepted: false,
            write_closed: false,
            closed: false,
            conversation_state: None,
            stats: SessionStats::new(id),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.stats.session_id
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }

    pub(crate) fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub(crate) fn initial_sent(&self) -> bool {
        self.initial_sent
    }

    pub(crate) fn initial_accepted(&self) -> bool {
        self.initial_accepted
    }

    pub(crate) fn conversation_state(&self) -> Option<&[u8]> {
        self.conversation_state.as_deref()
    }

    pub(crate) fn set_conversation_state(&mut self, state: Vec<u8>) {
        self.conversation_state = Some(state);
    }

    pub(crate) fn record_received(&mut self) {
        self.stats.frames_received += 1;
    }

    /// Write the one frame that opens the conversation
    pub(crate) fn write_initial(&mut self, frame: OutgoingFrame) -> bool {
        debug_assert!(frame.is_initial());
        self.initial_sent = true;
        self.initial_accepted = self.write(frame);
        self.initial_accepted
    }

    /// Write a frame that follows the initial one
    ///
    /// Refused until the transport has accepted the initial frame.
    pub(crate) fn write_continuation(&mut self, frame: OutgoingFrame) -> bool {
        debug_assert!(!frame.is_initial());

        if !self.initial_accepted {
            warn!(
                "Session {} was never opened, dropping {} frame",
                self.id(),
                frame.kind()
            );
            self.stats.failed_writes += 1;
            return false;
        }

        self.write(frame)
    }

    /// Wait until the transport can take another frame
    ///
    /// False when the write side is closed.
    pub(crate) async fn writable(&mut self) -> bool {
        if self.write_closed {
            return false;
        }
        self.sink.writable().await
    }

    fn write(&mut self, frame: OutgoingFrame) -> bool {
        let kind = frame.kind();

        if self.write_closed {
            warn!(
                "Session {} is closed for writing, dropping {} frame",
                self.id(),
                kind
            );
            self.stats.failed_writes += 1;
            return false;
        }

        let audio_bytes = match &frame {
            OutgoingFrame::ContinuationAudio(chunk) => chunk.audio.len(),
            _ => 0,
        };

        if self.sink.write(frame) {
            self.stats.frames_sent += 1;
            self.stats.audio_bytes_sent += audio_bytes;
            debug!("Session {} wrote {} frame", self.id(), kind);
            true
        } else {
            self.stats.failed_writes += 1;
            warn!("Transport refused {} frame on session {}", kind, self.id());
            false
        }
    }

    /// Stop writing; inbound frames keep arriving
    pub(crate) fn half_close(&mut self) {
        if !self.write_closed {
            self.write_closed = true;
            self.sink.half_close();
            debug!("Session {} half-closed", self.id());
        }
    }

    pub(crate) fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.write_closed = true;
            self.sink.close();
            info!(
                "Session {} closed after {} frames sent",
                self.id(),
                self.stats.frames_sent
            );
        }
    }
}
