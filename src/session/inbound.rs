use crate::error::TransportError;
use crate::response::{FrameMerger, MergedResponse};
use crate::transport::InboundEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Single-pass reader over the inbound frames of one session
///
/// Frames come out in delivery order; the sequence ends when the transport
/// closes the stream.
pub struct InboundFrames {
    session_id: Uuid,
    events: mpsc::Receiver<InboundEvent>,
    received: usize,
}

impl InboundFrames {
    pub(crate) fn new(session_id: Uuid, events: mpsc::Receiver<InboundEvent>) -> Self {
        Self {
            session_id,
            events,
            received: 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Frames and errors read so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Next inbound event, `None` at end of stream
    pub async fn next(&mut self) -> Option<InboundEvent> {
        let event = self.events.recv().await;
        if event.is_some() {
            self.received += 1;
        }
        event
    }

    /// Stop accepting inbound frames
    pub fn close(&mut self) {
        self.events.close();
    }

    /// Fold every remaining frame into one response
    ///
    /// Resolves at end of stream. A transport error rejects the whole turn:
    /// whatever was merged so far is discarded.
    pub async fn merge_to_end(mut self) -> Result<MergedResponse, TransportError> {
        let mut merger = FrameMerger::new();

        while let Some(event) = self.next().await {
            match event {
                Ok(frame) => merger.push(frame),
                Err(e) => {
                    warn!(
                        "Session {} failed after {} frames: {}",
                        self.session_id,
                        merger.frames_merged(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        info!(
            "Session {} ended, merged {} frames",
            self.session_id,
            merger.frames_merged()
        );

        Ok(merger.finish())
    }
}

impl Stream for InboundFrames {
    type Item = InboundEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.events.poll_recv(cx);
        if let Poll::Ready(Some(_)) = &polled {
            this.received += 1;
        }
        polled
    }
}
