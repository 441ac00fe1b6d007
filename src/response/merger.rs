use crate::protocol::{ActionMap, IncomingFrame, SpeechRecognitionResult};
use serde::{Deserialize, Serialize};

/// The assistant's answer, folded from every partial frame of a session
///
/// Same field set as [`IncomingFrame`], each field in its final form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_on_google: Option<ActionMap>,

    #[serde(
        default,
        with = "crate::protocol::base64_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub audio: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_ended: Option<bool>,

    #[serde(
        default,
        with = "crate::protocol::base64_bytes::option",
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

impl MergedResponse {
    /// Fold one frame into the accumulator and return it
    pub fn merge(mut self, frame: IncomingFrame) -> Self {
        self.absorb(frame);
        self
    }

    /// In-place form of [`MergedResponse::merge`]
    pub fn absorb(&mut self, frame: IncomingFrame) {
        if let Some(action) = frame.action {
            merge_map(&mut self.action, action);
        }
        if let Some(action) = frame.action_on_google {
            merge_map(&mut self.action_on_google, action);
        }
        if let Some(audio) = frame.audio {
            self.audio.get_or_insert_with(Vec::new).extend(audio);
        }
        if frame.conversation_ended.is_some() {
            self.conversation_ended = frame.conversation_ended;
        }
        if frame.conversation_state.is_some() {
            self.conversation_state = frame.conversation_state;
        }
        if let Some(html) = frame.html {
            join_fragment(&mut self.html, &html);
        }
        if frame.new_volume.is_some() {
            self.new_volume = frame.new_volume;
        }
        if let Some(results) = frame.speech_recognition_results {
            self.speech_recognition_results
                .get_or_insert_with(Vec::new)
                .extend(results);
        }
        if let Some(text) = frame.text {
            join_fragment(&mut self.text, &text);
        }
    }

    /// Same rules as [`MergedResponse::absorb`] for a frame the caller keeps
    ///
    /// Only the fields the frame carries are copied.
    pub fn absorb_ref(&mut self, frame: &IncomingFrame) {
        if let Some(action) = &frame.action {
            merge_map(&mut self.action, action.clone());
        }
        if let Some(action) = &frame.action_on_google {
            merge_map(&mut self.action_on_google, action.clone());
        }
        if let Some(audio) = &frame.audio {
            self.audio
                .get_or_insert_with(Vec::new)
                .extend_from_slice(audio);
        }
        if frame.conversation_ended.is_some() {
            self.conversation_ended = frame.conversation_ended;
        }
        if frame.conversation_state.is_some() {
            self.conversation_state = frame.conversation_state.clone();
        }
        if let Some(html) = &frame.html {
            join_fragment(&mut self.html, html);
        }
        if frame.new_volume.is_some() {
            self.new_volume = frame.new_volume;
        }
        if let Some(results) = &frame.speech_recognition_results {
            self.speech_recognition_results
                .get_or_insert_with(Vec::new)
                .extend_from_slice(results);
        }
        if let Some(text) = &frame.text {
            join_fragment(&mut self.text, text);
        }
    }

    /// True when no frame contributed anything yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Shallow merge: incoming keys win, untouched keys stay
fn merge_map(target: &mut Option<ActionMap>, incoming: ActionMap) {
    match target {
        Some(existing) => existing.extend(incoming),
        None => *target = Some(incoming),
    }
}

/// Join string fragments with a single space when both sides have content
fn join_fragment(target: &mut Option<String>, fragment: &str) {
    match target {
        Some(existing) if !existing.is_empty() => {
            if !fragment.is_empty() {
                existing.push(' ');
                existing.push_str(fragment);
            }
        }
        _ => *target = Some(fragment.to_string()),
    }
}

/// Sequential accumulator over the inbound frames of one session
///
/// Frames must be pushed in delivery order, each exactly once.
#[derive(Debug, Default)]
pub struct FrameMerger {
    response: MergedResponse,
    frames_merged: usize,
}

impl FrameMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every frame of `frames` in iteration order
    pub fn merge_all<I>(frames: I) -> MergedResponse
    where
        I: IntoIterator<Item = IncomingFrame>,
    {
        let mut merger = Self::new();
        for frame in frames {
            merger.push(frame);
        }
        merger.finish()
    }

    pub fn push(&mut self, frame: IncomingFrame) {
        self.frames_merged += 1;
        self.response.absorb(frame);
    }

    /// The accumulator as it stands
    pub fn response(&self) -> &MergedResponse {
        &self.response
    }

    pub fn frames_merged(&self) -> usize {
        self.frames_merged
    }

    /// Freeze and return the merged response
    pub fn finish(self) -> MergedResponse {
        self.response
    }
}
