use super::conversation::{ConversationSession, SessionCore};
use super::inbound::InboundFrames;
use super::stats::SessionStats;
use crate::assistant::Identity;
use crate::audio::{AudioInConfig, AudioOutConfig};
use crate::error::TransportError;
use crate::protocol::{ContinuationAudioFrame, IncomingFrame, InitialAudioFrame, OutgoingFrame};
use crate::response::MergedResponse;
use crate::transport::DuplexStream;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A continuous audio conversation
///
/// The initial audio frame is written when the session is started; after that
/// the caller streams audio chunks for as long as it wants. Inbound frames are
/// merged into a live response as they are read.
pub struct StreamingSession {
    core: SessionCore,
    inbound: InboundFrames,
    response: MergedResponse,
    audio_in: AudioInConfig,
    audio_out: AudioOutConfig,
}

impl StreamingSession {
    /// Open the conversation by writing the initial audio frame
    pub fn start(
        stream: DuplexStream,
        identity: Arc<Identity>,
        audio_in: AudioInConfig,
        audio_out: AudioOutConfig,
        conversation_state: Option<Vec<u8>>,
    ) -> Self {
        let mut core = SessionCore::new(identity, stream.sink);
        let inbound = InboundFrames::new(core.id(), stream.inbound);

        let frame = {
            let identity = core.identity();
            OutgoingFrame::InitialAudio(InitialAudioFrame {
                audio_in_config: audio_in.clone(),
                audio_out_config: audio_out.clone(),
                device_id: identity.device_id.clone(),
                device_model_id: identity.device_model_id.clone(),
                is_new_conversation: true,
                locale: identity.locale,
                conversation_state: conversation_state.clone(),
            })
        };

        if let Some(state) = conversation_state {
            core.set_conversation_state(state);
        }

        if core.write_initial(frame) {
            info!(
                "Streaming session {} started ({:?} {}Hz in, {:?} {}Hz out)",
                core.id(),
                audio_in.encoding,
                audio_in.sample_rate_hertz,
                audio_out.encoding,
                audio_out.sample_rate_hertz
            );
        } else {
            warn!(
                "Streaming session {} could not write its initial frame",
                core.id()
            );
        }

        Self {
            core,
            inbound,
            response: MergedResponse::default(),
            audio_in,
            audio_out,
        }
    }

    /// True when the transport accepted the initial frame
    pub fn is_started(&self) -> bool {
        self.core.initial_accepted()
    }

    /// Stream one chunk of captured audio
    pub fn send_audio(&mut self, chunk: impl Into<Vec<u8>>) -> bool {
        self.send(chunk.into())
    }

    /// Wait until the transport has room for the next audio chunk
    ///
    /// False when the session was never started or can no longer write.
    pub async fn wait_writable(&mut self) -> bool {
        self.core.initial_accepted() && self.core.writable().await
    }

    /// End the utterance: no more audio, answers still arrive
    pub fn finish(&mut self) {
        self.core.half_close();
    }

    pub fn audio_in_config(&self) -> &AudioInConfig {
        &self.audio_in
    }

    pub fn audio_out_config(&self) -> &AudioOutConfig {
        &self.audio_out
    }

    /// Everything merged from the frames read so far
    pub fn response(&self) -> &MergedResponse {
        &self.response
    }

    /// Next inbound frame, merged into [`StreamingSession::response`]
    ///
    /// `None` at end of stream. An `Err` is the transport failing; the stream
    /// ends after it.
    pub async fn next_frame(&mut self) -> Option<Result<IncomingFrame, TransportError>> {
        let event = self.inbound.next().await?;

        match &event {
            Ok(frame) => {
                self.core.record_received();
                if let Some(state) = &frame.conversation_state {
                    self.core.set_conversation_state(state.clone());
                }
                if frame.conversation_ended == Some(true) {
                    debug!(
                        "Assistant ended the conversation on session {}",
                        self.core.id()
                    );
                }
                self.response.absorb_ref(frame);
            }
            Err(e) => {
                warn!("Streaming session {} failed: {}", self.core.id(), e);
            }
        }

        Some(event)
    }

    /// Read until end of stream and return the merged response
    pub async fn collect(mut self) -> Result<MergedResponse, TransportError> {
        while let Some(event) = self.next_frame().await {
            event?;
        }

        info!(
            "Streaming session {} ended after {} frames received",
            self.core.id(),
            self.core.stats().frames_received
        );

        Ok(self.response)
    }
}

impl ConversationSession for StreamingSession {
    type Payload = Vec<u8>;

    fn send(&mut self, audio: Vec<u8>) -> bool {
        self.core
            .write_continuation(OutgoingFrame::ContinuationAudio(ContinuationAudioFrame {
                audio,
            }))
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
