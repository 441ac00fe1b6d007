//! Frames exchanged with the assistant over the duplex stream
//!
//! Outgoing frames are shaped by the sessions; incoming frames are partial
//! responses folded together by the response merger. The transport owns the
//! actual wire encoding.

pub mod base64_bytes;
pub mod language;
pub mod messages;

pub use language::LanguageCode;
pub use messages::{
    ActionMap, ContinuationAudioFrame, DeviceConfig, DialogStateIn, IncomingFrame,
    InitialAudioFrame, InitialTextFrame, OutgoingFrame, SpeechRecognitionResult, TextQueryConfig,
};
