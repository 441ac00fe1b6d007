use super::conversation::{ConversationSession, SessionCore};
use super::inbound::InboundFrames;
use super::stats::SessionStats;
use crate::assistant::Identity;
use crate::audio::AudioOutConfig;
use crate::protocol::{
    DeviceConfig, DialogStateIn, InitialTextFrame, OutgoingFrame, TextQueryConfig,
};
use crate::transport::DuplexStream;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// One text question for a [`TurnSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    pub text: String,
    /// Continuation token from the previous turn
    pub conversation_state: Option<Vec<u8>>,
}

impl TextQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conversation_state: None,
        }
    }

    pub fn with_conversation_state(mut self, state: Vec<u8>) -> Self {
        self.conversation_state = Some(state);
        self
    }
}

/// A single question/answer exchange
///
/// Sends one fully-formed text frame, then half-closes the stream. The answer
/// is read by whoever takes the inbound side with [`TurnSession::into_inbound`].
pub struct TurnSession {
    core: SessionCore,
    inbound: InboundFrames,
    audio_out: AudioOutConfig,
}

impl TurnSession {
    pub fn new(stream: DuplexStream, identity: Arc<Identity>, audio_out: AudioOutConfig) -> Self {
        let core = SessionCore::new(identity, stream.sink);
        let inbound = InboundFrames::new(core.id(), stream.inbound);

        Self {
            core,
            inbound,
            audio_out,
        }
    }

    /// Ask the question; only the first call writes anything
    pub fn send_text(
        &mut self,
        text: impl Into<String>,
        conversation_state: Option<Vec<u8>>,
    ) -> bool {
        self.send(TextQuery {
            text: text.into(),
            conversation_state,
        })
    }

    pub fn audio_out_config(&self) -> &AudioOutConfig {
        &self.audio_out
    }

    /// Hand the inbound frames to the caller's consumer
    ///
    /// Frames read from here on are counted by [`InboundFrames::received`],
    /// not by the session's [`SessionStats::frames_received`].
    pub fn into_inbound(self) -> InboundFrames {
        self.inbound
    }

    fn text_frame(&self, query: TextQuery) -> OutgoingFrame {
        let identity = self.core.identity();

        OutgoingFrame::InitialText(InitialTextFrame {
            config: TextQueryConfig {
                audio_out_config: self.audio_out.clone(),
                device_config: DeviceConfig {
                    device_id: identity.device_id.clone(),
                    device_model_id: identity.device_model_id.clone(),
                },
                dialog_state_in: DialogStateIn {
                    conversation_state: query.conversation_state,
                    language_code: identity.locale,
                },
                text_query: query.text,
            },
        })
    }
}

impl ConversationSession for TurnSession {
    type Payload = TextQuery;

    fn send(&mut self, query: TextQuery) -> bool {
        if self.core.initial_sent() {
            warn!(
                "Turn session {} already sent its query, ignoring {:?}",
                self.core.id(),
                query.text
            );
            return false;
        }

        if let Some(state) = &query.conversation_state {
            self.core.set_conversation_state(state.clone());
        }

        info!("Turn session {} asking: {}", self.core.id(), query.text);

        let frame = self.text_frame(query);
        let sent = self.core.write_initial(frame);
        self.core.half_close();
        sent
    }

    fn close(&mut self) {
        self.core.close();
        self.inbound.close();
    }

    fn id(&self) -> Uuid {
        self.core.id()
    }

    fn stats(&self) -> &SessionStats {
        self.core.stats()
    }

    fn conversation_state(&self) -> Option<&[u8]> {
        self.core.conversation_state()
    }
}
