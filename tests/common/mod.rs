// Shared helpers for the integration tests
#![allow(dead_code)]

use assistant_session::{
    AudioSettings, ChannelTransport, Identity, LanguageCode, RemoteEnd, SessionFactory,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn kitchen_speaker() -> Identity {
    Identity::new("kitchen-1", "acme-speaker-v2", LanguageCode::English)
}

/// Factory over a channel transport; the receiver yields one `RemoteEnd`
/// per opened stream
pub fn factory_with(
    identity: Identity,
    audio: AudioSettings,
    capacity: usize,
) -> (SessionFactory, mpsc::UnboundedReceiver<RemoteEnd>) {
    init_tracing();
    let (transport, accepted) = ChannelTransport::new(capacity);
    (
        SessionFactory::new(identity, audio, Arc::new(transport)),
        accepted,
    )
}

pub fn factory() -> (SessionFactory, mpsc::UnboundedReceiver<RemoteEnd>) {
    factory_with(kitchen_speaker(), AudioSettings::default(), 16)
}
