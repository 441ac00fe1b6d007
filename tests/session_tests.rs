// Tests for first-frame shaping and the session write/read sides
//
// A ChannelTransport plays the assistant: each test reads the frames the
// session wrote and scripts the partial answers.

mod common;

use anyhow::Result;
use assistant_session::audio::{AudioInConfig, AudioInEncoding, AudioOutConfig};
use assistant_session::protocol::{IncomingFrame, LanguageCode, OutgoingFrame, SpeechRecognitionResult};
use assistant_session::{
    AudioSettings, ConversationSession, DuplexStream, FrameSink, Identity, QueryOptions,
    StreamingSession, TextQuery, TransportError,
};
use futures::StreamExt;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Sink that refuses the first `refuse` writes and records the rest
struct RefusingSink {
    refuse: usize,
    accepted: Arc<Mutex<Vec<OutgoingFrame>>>,
}

#[async_trait::async_trait]
impl FrameSink for RefusingSink {
    fn write(&mut self, frame: OutgoingFrame) -> bool {
        if self.refuse > 0 {
            self.refuse -= 1;
            return false;
        }
        self.accepted.lock().unwrap().push(frame);
        true
    }

    fn half_close(&mut self) {}

    fn close(&mut self) {}
}

#[tokio::test]
async fn test_streaming_first_frame_opens_new_conversation() -> Result<()> {
    let (factory, mut accepted) = common::factory();

    let session = factory.start_audio(QueryOptions::default()).await?;
    assert!(session.is_started());

    let mut remote = accepted.recv().await.expect("stream opened");
    let first = remote.try_next_request().expect("initial frame written at start");

    assert!(first.is_initial());
    let value = serde_json::to_value(&first)?;
    assert_eq!(value["isNewConversation"], json!(true));
    assert_eq!(value["deviceId"], json!("kitchen-1"));
    assert_eq!(value["deviceModelId"], json!("acme-speaker-v2"));
    assert_eq!(value["locale"], json!("en-US"));
    assert_eq!(
        value["audioInConfig"],
        json!({"encoding": "LINEAR16", "sampleRateHertz": 16000})
    );
    assert_eq!(value["audioOutConfig"]["volumePercentage"], json!(100));
    assert!(value.get("conversationState").is_none());

    assert_eq!(session.stats().frames_sent, 1);
    Ok(())
}

#[tokio::test]
async fn test_streaming_audio_follows_initial_frame() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory.start_audio(QueryOptions::default()).await?;
    let mut remote = accepted.recv().await.expect("stream opened");

    assert!(session.send_audio(vec![1u8, 2, 3]));
    assert!(session.send_audio(&[4u8, 5][..]));

    let frames: Vec<OutgoingFrame> = std::iter::from_fn(|| remote.try_next_request()).collect();
    assert_eq!(frames.len(), 3);
    assert!(matches!(frames[0], OutgoingFrame::InitialAudio(_)));

    match (&frames[1], &frames[2]) {
        (OutgoingFrame::ContinuationAudio(a), OutgoingFrame::ContinuationAudio(b)) => {
            assert_eq!(a.audio, vec![1, 2, 3]);
            assert_eq!(b.audio, vec![4, 5]);
        }
        other => panic!("expected two audio frames, got {:?}", other),
    }

    let stats = session.stats();
    assert_eq!(stats.frames_sent, 3);
    assert_eq!(stats.audio_bytes_sent, 5);
    assert_eq!(stats.failed_writes, 0);
    Ok(())
}

#[tokio::test]
async fn test_streaming_session_echoes_conversation_state() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let options = QueryOptions::default()
        .with_conversation_state(b"turn-1".to_vec())
        .with_audio_in_config(AudioInConfig {
            encoding: AudioInEncoding::Flac,
            sample_rate_hertz: 48000,
        });

    let session = factory.start_audio(options).await?;
    assert_eq!(session.audio_in_config().encoding, AudioInEncoding::Flac);
    assert_eq!(session.audio_in_config().sample_rate_hertz, 48000);
    let mut remote = accepted.recv().await.expect("stream opened");

    match remote.try_next_request() {
        Some(OutgoingFrame::InitialAudio(frame)) => {
            assert_eq!(frame.conversation_state.as_deref(), Some(&b"turn-1"[..]));
            assert_eq!(frame.audio_in_config.encoding, AudioInEncoding::Flac);
            assert_eq!(frame.audio_in_config.sample_rate_hertz, 48000);
            assert!(frame.is_new_conversation);
        }
        other => panic!("expected initial audio frame, got {:?}", other),
    }

    assert_eq!(session.conversation_state(), Some(&b"turn-1"[..]));
    Ok(())
}

#[tokio::test]
async fn test_streaming_write_reports_backpressure() -> Result<()> {
    let (factory, mut accepted) =
        common::factory_with(common::kitchen_speaker(), AudioSettings::default(), 1);
    let mut session = factory.start_audio(QueryOptions::default()).await?;
    let mut remote = accepted.recv().await.expect("stream opened");

    // The initial frame fills the one-slot buffer
    assert!(!session.send_audio(vec![0u8; 4]));
    assert_eq!(session.stats().failed_writes, 1);

    assert!(remote.try_next_request().is_some());
    assert!(session.send_audio(vec![0u8; 4]));
    assert_eq!(session.stats().frames_sent, 2);
    Ok(())
}

#[tokio::test]
async fn test_streaming_refused_initial_frame_blocks_audio() -> Result<()> {
    common::init_tracing();
    let accepted = Arc::new(Mutex::new(Vec::new()));
    let sink = RefusingSink {
        refuse: 1,
        accepted: accepted.clone(),
    };
    let (_responses, inbound) = mpsc::channel(4);

    let mut session = StreamingSession::start(
        DuplexStream::new(Box::new(sink), inbound),
        Arc::new(common::kitchen_speaker()),
        AudioInConfig::default(),
        AudioOutConfig::default(),
        None,
    );

    assert!(!session.is_started());
    // The sink would take this chunk, but the conversation was never opened
    assert!(!session.send_audio(vec![1u8, 2, 3]));
    assert!(!session.wait_writable().await);

    assert!(accepted.lock().unwrap().is_empty());
    let stats = session.stats();
    assert_eq!(stats.frames_sent, 0);
    assert_eq!(stats.audio_bytes_sent, 0);
    assert_eq!(stats.failed_writes, 2);
    Ok(())
}

#[tokio::test]
async fn test_streaming_wait_writable_resumes_after_drain() -> Result<()> {
    let (factory, mut accepted) =
        common::factory_with(common::kitchen_speaker(), AudioSettings::default(), 1);
    let mut session = factory.start_audio(QueryOptions::default()).await?;
    let mut remote = accepted.recv().await.expect("stream opened");

    assert!(!session.send_audio(vec![5u8; 4]), "buffer still holds the initial frame");

    let reader = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut frames = Vec::new();
        while let Some(frame) = remote.next_request().await {
            frames.push(frame);
        }
        frames
    });

    assert!(session.wait_writable().await);
    assert!(session.send_audio(vec![5u8; 4]));
    session.finish();
    assert!(!session.wait_writable().await, "no room after finish");

    let frames = reader.await?;
    assert_eq!(frames.len(), 2);
    assert!(matches!(frames[1], OutgoingFrame::ContinuationAudio(_)));
    assert_eq!(session.stats().frames_sent, 2);
    assert_eq!(session.stats().failed_writes, 1);
    Ok(())
}

#[tokio::test]
async fn test_streaming_finish_stops_writes_but_keeps_reading() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory.start_audio(QueryOptions::default()).await?;
    let mut remote = accepted.recv().await.expect("stream opened");

    assert!(session.send_audio(vec![7u8; 8]));
    session.finish();
    assert!(!session.send_audio(vec![7u8; 8]));

    assert!(remote.next_request().await.is_some());
    assert!(remote.next_request().await.is_some());
    assert!(remote.next_request().await.is_none(), "write side half-closed");

    remote.respond(IncomingFrame::text("Got it.")).await?;
    remote.end();

    let response = session.collect().await?;
    assert_eq!(response.text.as_deref(), Some("Got it."));
    Ok(())
}

#[tokio::test]
async fn test_streaming_merges_live_as_frames_arrive() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory.start_audio(QueryOptions::default()).await?;
    let remote = accepted.recv().await.expect("stream opened");

    remote
        .respond(IncomingFrame {
            speech_recognition_results: Some(vec![SpeechRecognitionResult::new("what time", 0.6)]),
            ..Default::default()
        })
        .await?;
    remote
        .respond(IncomingFrame {
            text: Some("It's noon.".to_string()),
            conversation_state: Some(b"turn-2".to_vec()),
            conversation_ended: Some(true),
            ..Default::default()
        })
        .await?;

    let first = session.next_frame().await.expect("frame")?;
    assert!(first.speech_recognition_results.is_some());
    assert!(session.response().text.is_none());

    let second = session.next_frame().await.expect("frame")?;
    assert_eq!(second.conversation_ended, Some(true));
    assert_eq!(session.response().text.as_deref(), Some("It's noon."));
    assert_eq!(session.conversation_state(), Some(&b"turn-2"[..]));

    // The end signal is advisory: the session can still send
    assert!(session.send_audio(vec![1u8]));

    remote.end();
    assert!(session.next_frame().await.is_none());
    assert_eq!(session.stats().frames_received, 2);
    Ok(())
}

#[tokio::test]
async fn test_streaming_surfaces_transport_error() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory.start_audio(QueryOptions::default()).await?;
    let remote = accepted.recv().await.expect("stream opened");

    remote.respond(IncomingFrame::text("partial")).await?;
    remote.fail(TransportError::stream("deadline exceeded")).await?;

    assert!(session.next_frame().await.expect("frame").is_ok());
    match session.next_frame().await {
        Some(Err(TransportError::Stream { message })) => assert_eq!(message, "deadline exceeded"),
        other => panic!("expected stream error, got {:?}", other),
    }
    assert!(session.next_frame().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_streaming_close_abandons_stream() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory.start_audio(QueryOptions::default()).await?;
    let mut remote = accepted.recv().await.expect("stream opened");

    session.close();

    assert!(!session.send_audio(vec![1u8]));
    assert!(remote.is_session_closed());
    assert!(remote.respond(IncomingFrame::text("late")).await.is_err());
    assert!(remote.next_request().await.is_some(), "initial frame still queued");
    assert!(remote.next_request().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_turn_frame_nests_query_under_config() -> Result<()> {
    let identity = Identity::new("desk-7", "acme-display", LanguageCode::French);
    let (factory, mut accepted) = common::factory_with(identity, AudioSettings::default(), 4);

    let mut session = factory.start_text(None).await?;
    assert!(session.send_text("allume la lumière", Some(b"prev".to_vec())));

    let mut remote = accepted.recv().await.expect("stream opened");
    let frame = remote.next_request().await.expect("text frame");
    assert!(remote.next_request().await.is_none(), "turn half-closes after one frame");

    let value = serde_json::to_value(&frame)?;
    assert_eq!(
        value,
        json!({
            "config": {
                "audioOutConfig": {"encoding": "LINEAR16", "sampleRateHertz": 16000, "volumePercentage": 100},
                "deviceConfig": {"deviceId": "desk-7", "deviceModelId": "acme-display"},
                "dialogStateIn": {"conversationState": "cHJldg==", "languageCode": "fr-FR"},
                "textQuery": "allume la lumière"
            }
        })
    );

    assert_eq!(session.conversation_state(), Some(&b"prev"[..]));
    Ok(())
}

#[tokio::test]
async fn test_turn_sends_exactly_one_frame() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory
        .start_text(Some(AudioOutConfig {
            volume_percentage: 25,
            ..Default::default()
        }))
        .await?;

    assert!(session.send(TextQuery::new("what's the weather")));
    assert!(!session.send(TextQuery::new("and tomorrow?")));
    assert_eq!(session.stats().frames_sent, 1);
    assert_eq!(session.audio_out_config().volume_percentage, 25);

    let mut remote = accepted.recv().await.expect("stream opened");
    match remote.next_request().await {
        Some(OutgoingFrame::InitialText(frame)) => {
            assert_eq!(frame.config.text_query, "what's the weather");
            assert_eq!(frame.config.audio_out_config.volume_percentage, 25);
            assert!(frame.config.dialog_state_in.conversation_state.is_none());
        }
        other => panic!("expected text frame, got {:?}", other),
    }
    assert!(remote.next_request().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_turn_inbound_reads_as_stream() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory.start_text(None).await?;
    assert!(session.send_text("tell me a joke", None));

    let remote = accepted.recv().await.expect("stream opened");
    remote.respond(IncomingFrame::text("Why")).await?;
    remote.respond(IncomingFrame::audio(vec![1u8, 2])).await?;
    remote.end();

    let session_id = session.id();
    let mut inbound = session.into_inbound();
    assert_eq!(inbound.session_id(), session_id);
    assert_eq!(inbound.received(), 0);

    let events: Vec<_> = (&mut inbound).collect().await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].as_ref().ok().and_then(|f| f.text.clone()), Some("Why".to_string()));
    assert_eq!(events[1].as_ref().ok().and_then(|f| f.audio.clone()), Some(vec![1, 2]));
    assert_eq!(inbound.received(), 2);
    Ok(())
}

#[tokio::test]
async fn test_turn_inbound_counts_frames_after_handover() -> Result<()> {
    let (factory, mut accepted) = common::factory();
    let mut session = factory.start_text(None).await?;
    assert!(session.send_text("what's on today", None));
    assert_eq!(session.stats().frames_received, 0);

    let remote = accepted.recv().await.expect("stream opened");
    remote.respond(IncomingFrame::text("Nothing")).await?;
    remote.respond(IncomingFrame::text("planned.")).await?;
    remote.end();

    let mut inbound = session.into_inbound();
    assert!(inbound.next().await.expect("frame").is_ok());
    assert_eq!(inbound.received(), 1);

    // Only frames not yet read are merged
    let response = inbound.merge_to_end().await?;
    assert_eq!(response.text.as_deref(), Some("planned."));
    Ok(())
}
