use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Default sample rate for both directions (16kHz LINEAR16)
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16000;

/// Default playback volume in percent
pub const DEFAULT_VOLUME_PERCENTAGE: u8 = 100;

/// Encoding of the audio sent to the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioInEncoding {
    /// Uncompressed 16-bit signed little-endian PCM
    #[default]
    Linear16,
    /// Free Lossless Audio Codec
    Flac,
}

/// Encoding of the audio the assistant sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioOutEncoding {
    /// Uncompressed 16-bit signed little-endian PCM
    #[default]
    Linear16,
    /// MP3 audio
    Mp3,
    /// Opus-encoded audio in an OGG container
    OpusInOgg,
}

/// Configuration of the audio sent to the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInConfig {
    /// Encoding of the captured audio
    pub encoding: AudioInEncoding,
    /// Sample rate in Hz
    pub sample_rate_hertz: u32,
}

impl Default for AudioInConfig {
    fn default() -> Self {
        Self {
            encoding: AudioInEncoding::Linear16,
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

impl AudioInConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.sample_rate_hertz > 0,
            "Audio input sample rate must be positive"
        );
        Ok(())
    }
}

/// Configuration of the audio the assistant answers with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioOutConfig {
    /// Encoding of the returned audio
    pub encoding: AudioOutEncoding,
    /// Sample rate in Hz
    pub sample_rate_hertz: u32,
    /// Playback volume (0 to 100)
    pub volume_percentage: u8,
}

impl Default for AudioOutConfig {
    fn default() -> Self {
        Self {
            encoding: AudioOutEncoding::Linear16,
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HZ,
            volume_percentage: DEFAULT_VOLUME_PERCENTAGE,
        }
    }
}

impl AudioOutConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.sample_rate_hertz > 0,
            "Audio output sample rate must be positive"
        );
        ensure!(
            self.volume_percentage <= 100,
            "Volume must be between 0 and 100, got {}",
            self.volume_percentage
        );
        Ok(())
    }
}
