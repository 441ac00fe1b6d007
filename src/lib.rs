pub mod assistant;
pub mod audio;
pub mod config;
pub mod error;
pub mod protocol;
pub mod response;
pub mod session;
pub mod transport;

pub use assistant::{Identity, QueryInput, QueryOptions, SessionFactory};
pub use audio::{AudioInConfig, AudioInEncoding, AudioOutConfig, AudioOutEncoding};
pub use config::{AudioSettings, Config, DeviceSettings};
pub use error::{QueryError, TransportError};
pub use protocol::{IncomingFrame, LanguageCode, OutgoingFrame, SpeechRecognitionResult};
pub use response::{FrameMerger, MergedResponse};
pub use session::{
    ConversationSession, InboundFrames, SessionStats, StreamingSession, TextQuery, TurnSession,
};
pub use transport::{ChannelTransport, DuplexStream, FrameSink, RemoteEnd, Transport};
