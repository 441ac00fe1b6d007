//! Boundary to the streaming transport
//!
//! The transport (authenticated stream setup, wire encoding, TLS) lives
//! outside this crate. Sessions only need:
//! - a way to open a duplex stream ([`Transport`])
//! - a synchronous writer for outgoing frames ([`FrameSink`]), with an async
//!   readiness wait for callers that must not drop frames
//! - an ordered channel of inbound frames, closed at end of stream

pub mod channel;

use crate::error::TransportError;
use crate::protocol::{IncomingFrame, OutgoingFrame};
use tokio::sync::mpsc;

pub use channel::{ChannelTransport, RemoteEnd};

/// One inbound event: a partial response, or the error that ends the stream
pub type InboundEvent = Result<IncomingFrame, TransportError>;

/// Write side of a duplex stream
#[async_trait::async_trait]
pub trait FrameSink: Send {
    /// Queue a frame for sending
    ///
    /// Returns false when the transport refused the frame (backpressure,
    /// closed stream). Never blocks.
    fn write(&mut self, frame: OutgoingFrame) -> bool;

    /// Wait until the next `write` has room
    ///
    /// Returns false once the stream can no longer take frames. Sinks
    /// without a bounded buffer are always ready.
    async fn writable(&mut self) -> bool {
        true
    }

    /// Signal that no further frames will be written
    fn half_close(&mut self);

    /// Abandon the stream in both directions
    fn close(&mut self);
}

/// A freshly opened duplex stream
pub struct DuplexStream {
    pub sink: Box<dyn FrameSink>,
    /// Inbound frames in delivery order; the channel closes at end of stream
    pub inbound: mpsc::Receiver<InboundEvent>,
}

impl DuplexStream {
    pub fn new(sink: Box<dyn FrameSink>, inbound: mpsc::Receiver<InboundEvent>) -> Self {
        Self { sink, inbound }
    }
}

/// Opens authenticated duplex streams to the assistant service
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn open_duplex(&self) -> Result<DuplexStream, TransportError>;

    /// Transport name for logging
    fn name(&self) -> &str;
}
