use crate::protocol::LanguageCode;
use serde::{Deserialize, Serialize};

/// Who is talking to the assistant
///
/// Immutable for the lifetime of a factory and shared read-only by every
/// session it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub device_id: String,
    pub device_model_id: String,
    pub locale: LanguageCode,
}

impl Identity {
    pub fn new(
        device_id: impl Into<String>,
        device_model_id: impl Into<String>,
        locale: LanguageCode,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            device_model_id: device_model_id.into(),
            locale,
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new("default", "default", LanguageCode::English)
    }
}
