use super::{DuplexStream, FrameSink, InboundEvent, Transport};
use crate::error::TransportError;
use crate::protocol::{IncomingFrame, OutgoingFrame};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info};

/// Default buffer size of each direction of a channel stream
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// In-process transport backed by bounded tokio channels
///
/// Every opened stream hands its far side ([`RemoteEnd`]) to the acceptor
/// returned by [`ChannelTransport::new`]. Whoever holds the acceptor plays the
/// service: a bridge task forwarding to a real network stream, or a test
/// scripting the assistant's answers.
pub struct ChannelTransport {
    capacity: usize,
    acceptor: mpsc::UnboundedSender<RemoteEnd>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> (Self, mpsc::UnboundedReceiver<RemoteEnd>) {
        let (acceptor, accepted) = mpsc::unbounded_channel();
        (
            Self {
                capacity: capacity.max(1),
                acceptor,
            },
            accepted,
        )
    }
}

#[async_trait::async_trait]
impl Transport for ChannelTransport {
    async fn open_duplex(&self) -> Result<DuplexStream, TransportError> {
        let (request_tx, request_rx) = mpsc::channel(self.capacity);
        let (response_tx, response_rx) = mpsc::channel(self.capacity);

        let remote = RemoteEnd {
            requests: request_rx,
            responses: Some(response_tx),
        };

        self.acceptor
            .send(remote)
            .map_err(|_| TransportError::Open("no service is accepting streams".to_string()))?;

        debug!("Opened channel stream (capacity={})", self.capacity);

        Ok(DuplexStream::new(
            Box::new(ChannelSink {
                requests: Some(request_tx),
            }),
            response_rx,
        ))
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Write side handed to the session
struct ChannelSink {
    requests: Option<mpsc::Sender<OutgoingFrame>>,
}

#[async_trait::async_trait]
impl FrameSink for ChannelSink {
    fn write(&mut self, frame: OutgoingFrame) -> bool {
        let Some(requests) = &self.requests else {
            return false;
        };

        match requests.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(frame)) => {
                debug!("Channel stream is full, dropping {} frame", frame.kind());
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    async fn writable(&mut self) -> bool {
        let Some(requests) = &self.requests else {
            return false;
        };

        // The permit is released on drop; this sink is the only producer,
        // so the slot stays free for the following write.
        requests.reserve().await.is_ok()
    }

    fn half_close(&mut self) {
        self.requests = None;
    }

    fn close(&mut self) {
        if self.requests.take().is_some() {
            info!("Channel stream closed by session");
        }
    }
}

/// The service side of one channel stream
pub struct RemoteEnd {
    requests: mpsc::Receiver<OutgoingFrame>,
    responses: Option<mpsc::Sender<InboundEvent>>,
}

impl RemoteEnd {
    /// Next frame written by the session
    ///
    /// Returns `None` once the session half-closed and every frame was read.
    pub async fn next_request(&mut self) -> Option<OutgoingFrame> {
        self.requests.recv().await
    }

    /// Next frame if one is already queued
    pub fn try_next_request(&mut self) -> Option<OutgoingFrame> {
        self.requests.try_recv().ok()
    }

    /// Deliver a partial response to the session
    pub async fn respond(&self, frame: IncomingFrame) -> Result<(), TransportError> {
        let responses = self.responses.as_ref().ok_or(TransportError::Closed)?;
        responses
            .send(Ok(frame))
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Deliver an error and end the stream
    pub async fn fail(mut self, error: TransportError) -> Result<(), TransportError> {
        let responses = self.responses.take().ok_or(TransportError::Closed)?;
        responses
            .send(Err(error))
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Signal end of stream
    pub fn end(mut self) {
        self.responses = None;
    }

    /// True once the session stopped reading responses
    pub fn is_session_closed(&self) -> bool {
        self.responses
            .as_ref()
            .map_or(true, |responses| responses.is_closed())
    }
}
