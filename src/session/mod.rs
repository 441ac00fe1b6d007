//! Conversation sessions
//!
//! A session owns one duplex stream and knows how to shape its first frame:
//! - `TurnSession`: one text question under the full `config` envelope, then
//!   the write side is half-closed
//! - `StreamingSession`: an initial audio configuration frame at start, then
//!   any number of audio chunks
//!
//! Both implement [`ConversationSession`]. Inbound frames are read in order
//! through [`InboundFrames`].

mod conversation;
mod inbound;
mod stats;
mod streaming;
mod turn;

pub use conversation::ConversationSession;
pub use inbound::InboundFrames;
pub use stats::SessionStats;
pub use streaming::StreamingSession;
pub use turn::{TextQuery, TurnSession};
