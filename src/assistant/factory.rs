use super::identity::Identity;
use crate::audio::{AudioInConfig, AudioOutConfig};
use crate::config::{AudioSettings, Config};
use crate::error::{QueryError, TransportError};
use crate::response::MergedResponse;
use crate::session::{StreamingSession, TurnSession};
use crate::transport::{DuplexStream, Transport};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Per-call overrides for sessions and one-shot queries
///
/// Anything left unset falls back to the factory's defaults. Values given here
/// always win.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Continuation token from a previous answer
    pub conversation_state: Option<Vec<u8>>,
    pub audio_in_config: Option<AudioInConfig>,
    pub audio_out_config: Option<AudioOutConfig>,
}

impl QueryOptions {
    pub fn with_conversation_state(mut self, state: Vec<u8>) -> Self {
        self.conversation_state = Some(state);
        self
    }

    pub fn with_audio_in_config(mut self, config: AudioInConfig) -> Self {
        self.audio_in_config = Some(config);
        self
    }

    pub fn with_audio_out_config(mut self, config: AudioOutConfig) -> Self {
        self.audio_out_config = Some(config);
        self
    }
}

/// What a one-shot query asks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    Text(String),
    /// A complete recording, encoded as the input audio config says
    Audio(Vec<u8>),
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for QueryInput {
    fn from(audio: Vec<u8>) -> Self {
        Self::Audio(audio)
    }
}

/// Creates sessions for one device identity
pub struct SessionFactory {
    identity: Arc<Identity>,
    audio: AudioSettings,
    transport: Arc<dyn Transport>,
}

impl SessionFactory {
    pub fn new(identity: Identity, audio: AudioSettings, transport: Arc<dyn Transport>) -> Self {
        info!(
            "Assistant sessions for device {} ({}, {}) via {} transport",
            identity.device_id,
            identity.device_model_id,
            identity.locale,
            transport.name()
        );

        Self {
            identity: Arc::new(identity),
            audio,
            transport,
        }
    }

    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self::new(config.identity(), config.audio.clone(), transport)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn audio_settings(&self) -> &AudioSettings {
        &self.audio
    }

    /// Open a stream for a single text turn
    pub async fn start_text(
        &self,
        audio_out: Option<AudioOutConfig>,
    ) -> Result<TurnSession, TransportError> {
        let stream = self.open().await?;
        let audio_out = audio_out.unwrap_or_else(|| self.audio.output_config());

        Ok(TurnSession::new(stream, Arc::clone(&self.identity), audio_out))
    }

    /// Open a stream and start an audio conversation on it
    pub async fn start_audio(
        &self,
        options: QueryOptions,
    ) -> Result<StreamingSession, TransportError> {
        let stream = self.open().await?;
        let audio_in = options
            .audio_in_config
            .unwrap_or_else(|| self.audio.input_config());
        let audio_out = options
            .audio_out_config
            .unwrap_or_else(|| self.audio.output_config());

        Ok(StreamingSession::start(
            stream,
            Arc::clone(&self.identity),
            audio_in,
            audio_out,
            options.conversation_state,
        ))
    }

    /// Ask one question and wait for the whole answer
    ///
    /// Resolves with every inbound frame merged once the transport ends the
    /// stream. Any transport error fails the query and the partial answer is
    /// dropped.
    pub async fn query(
        &self,
        input: impl Into<QueryInput>,
        options: QueryOptions,
    ) -> Result<MergedResponse, QueryError> {
        let result = match input.into() {
            QueryInput::Text(text) => self.query_text(text, options).await,
            QueryInput::Audio(audio) => self.query_audio(audio, options).await,
        };

        if let Err(e) = &result {
            error!("Assistant query failed: {}", e);
        }

        result
    }

    async fn query_text(
        &self,
        text: String,
        options: QueryOptions,
    ) -> Result<MergedResponse, QueryError> {
        let mut session = self.start_text(options.audio_out_config).await?;

        if !session.send_text(text, options.conversation_state) {
            return Err(QueryError::InitialWriteRejected);
        }

        Ok(session.into_inbound().merge_to_end().await?)
    }

    async fn query_audio(
        &self,
        audio: Vec<u8>,
        options: QueryOptions,
    ) -> Result<MergedResponse, QueryError> {
        let mut session = self.start_audio(options).await?;

        if !session.is_started() {
            return Err(QueryError::InitialWriteRejected);
        }

        // Waits for room before each chunk so recordings larger than the
        // transport buffer are not refused
        let chunk_bytes = self.audio.chunk_bytes.max(1);
        for (index, chunk) in audio.chunks(chunk_bytes).enumerate() {
            if !session.wait_writable().await || !session.send_audio(chunk) {
                return Err(QueryError::AudioChunkRejected { index });
            }
        }
        session.finish();

        debug!(
            "Sent {} audio bytes in chunks of {}, awaiting answer",
            audio.len(),
            chunk_bytes
        );

        Ok(session.collect().await?)
    }

    async fn open(&self) -> Result<DuplexStream, TransportError> {
        self.transport.open_duplex().await.map_err(|e| {
            error!("Failed to open {} stream: {}", self.transport.name(), e);
            e
        })
    }
}
