use serde::{Deserialize, Serialize};
use std::fmt;

/// Locale the assistant converses in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "de-DE")]
    German,
    #[serde(rename = "en-AU")]
    EnglishAustralia,
    #[serde(rename = "en-CA")]
    EnglishCanada,
    #[serde(rename = "en-GB")]
    EnglishUnitedKingdom,
    #[serde(rename = "en-IN")]
    EnglishIndia,
    #[default]
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "es-ES")]
    Spanish,
    #[serde(rename = "es-MX")]
    SpanishMexico,
    #[serde(rename = "fr-CA")]
    FrenchCanada,
    #[serde(rename = "fr-FR")]
    French,
    #[serde(rename = "it-IT")]
    Italian,
    #[serde(rename = "ja-JP")]
    Japanese,
    #[serde(rename = "ko-KR")]
    Korean,
    #[serde(rename = "pt-BR")]
    PortugueseBrazil,
}

impl LanguageCode {
    /// BCP-47 tag sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::German => "de-DE",
            Self::EnglishAustralia => "en-AU",
            Self::EnglishCanada => "en-CA",
            Self::EnglishUnitedKingdom => "en-GB",
            Self::EnglishIndia => "en-IN",
            Self::English => "en-US",
            Self::Spanish => "es-ES",
            Self::SpanishMexico => "es-MX",
            Self::FrenchCanada => "fr-CA",
            Self::French => "fr-FR",
            Self::Italian => "it-IT",
            Self::Japanese => "ja-JP",
            Self::Korean => "ko-KR",
            Self::PortugueseBrazil => "pt-BR",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
