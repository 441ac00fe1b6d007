use super::base64_bytes;
use super::language::LanguageCode;
use crate::audio::{AudioInConfig, AudioOutConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Partial key-value payload (device actions, Actions on Google metadata)
pub type ActionMap = Map<String, Value>;

/// A frame written to the assistant
///
/// Exactly one initial frame (text or audio) opens a session; continuation
/// audio frames may only follow an initial audio frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutgoingFrame {
    InitialText(InitialTextFrame),
    InitialAudio(InitialAudioFrame),
    ContinuationAudio(ContinuationAudioFrame),
}

impl OutgoingFrame {
    pub fn is_initial(&self) -> bool {
        !matches!(self, Self::ContinuationAudio(_))
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitialText(_) => "initial_text",
            Self::InitialAudio(_) => "initial_audio",
            Self::ContinuationAudio(_) => "audio",
        }
    }
}

/// Opens a text turn: the whole query travels under the `config` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialTextFrame {
    pub config: TextQueryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextQueryConfig {
    pub audio_out_config: AudioOutConfig,
    pub device_config: DeviceConfig,
    pub dialog_state_in: DialogStateIn,
    pub text_query: String,
}

/// Device identity as stamped on the text envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    pub device_id: String,
    pub device_model_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogStateIn {
    /// Continuation token from the previous turn, echoed verbatim
    #[serde(
        default,
        with = "base64_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversation_state: Option<Vec<u8>>,
    pub language_code: LanguageCode,
}

/// Opens an audio conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialAudioFrame {
    pub audio_in_config: AudioInConfig,
    pub audio_out_config: AudioOutConfig,
    pub device_id: String,
    pub device_model_id: String,
    pub is_new_conversation: bool,
    pub locale: LanguageCode,
    /// Continuation token from a previous turn, echoed verbatim
    #[serde(
        default,
        with = "base64_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversation_state: Option<Vec<u8>>,
}

/// A chunk of captured audio following an initial audio frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationAudioFrame {
    #[serde(with = "base64_bytes")]
    pub audio: Vec<u8>,
}

/// One transcript hypothesis reported while the user speaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecognitionResult {
    pub transcript: String,
    pub confidence: f32,
}

impl SpeechRecognitionResult {
    pub fn new(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

/// A partial response frame received from the assistant
///
/// Every field is optional and independent of the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_on_google: Option<ActionMap>,

    /// Fragment of the spoken answer
    #[serde(
        default,
        with = "base64_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub audio: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_ended: Option<bool>,

    /// Opaque continuation token
    #[serde(
        default,
        with = "base64_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversation_state: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_volume: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_recognition_results: Option<Vec<SpeechRecognitionResult>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl IncomingFrame {
    /// Frame carrying only a text fragment
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Frame carrying only an audio fragment
    pub fn audio(audio: impl Into<Vec<u8>>) -> Self {
        Self {
            audio: Some(audio.into()),
            ..Default::default()
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.action.is_none()
            && self.action_on_google.is_none()
            && self.audio.is_none()
            && self.conversation_ended.is_none()
            && self.conversation_state.is_none()
            && self.html.is_none()
            && self.new_volume.is_none()
            && self.speech_recognition_results.is_none()
            && self.text.is_none()
    }
}
