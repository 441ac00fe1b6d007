use crate::assistant::Identity;
use crate::audio::{
    AudioInConfig, AudioInEncoding, AudioOutConfig, AudioOutEncoding, DEFAULT_SAMPLE_RATE_HZ,
    DEFAULT_VOLUME_PERCENTAGE,
};
use crate::protocol::LanguageCode;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Audio bytes per continuation frame for one-shot audio queries
/// (100ms of 16kHz mono LINEAR16)
pub const DEFAULT_CHUNK_BYTES: usize = 3200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceSettings,
    pub audio: AudioSettings,
}

/// Identity stamped on every session created from one factory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub device_id: String,
    pub device_model_id: String,
    pub locale: LanguageCode,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            device_id: "default".to_string(),
            device_model_id: "default".to_string(),
            locale: LanguageCode::English,
        }
    }
}

/// Default audio configuration for new sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Encoding of captured audio
    /// Default: LINEAR16
    pub input_encoding: AudioInEncoding,

    /// Sample rate of captured audio
    /// Default: 16000
    pub input_sample_rate_hertz: u32,

    /// Encoding the assistant answers with
    /// Default: LINEAR16
    pub output_encoding: AudioOutEncoding,

    /// Sample rate the assistant answers with
    /// Default: 16000
    pub output_sample_rate_hertz: u32,

    /// Playback volume (0 to 100)
    /// Default: 100
    pub volume_percentage: u8,

    /// Size of each audio frame when a whole recording is sent at once
    /// Default: 3200 bytes
    pub chunk_bytes: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            input_encoding: AudioInEncoding::Linear16,
            input_sample_rate_hertz: DEFAULT_SAMPLE_RATE_HZ,
            output_encoding: AudioOutEncoding::Linear16,
            output_sample_rate_hertz: DEFAULT_SAMPLE_RATE_HZ,
            volume_percentage: DEFAULT_VOLUME_PERCENTAGE,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }
}

impl AudioSettings {
    pub fn input_config(&self) -> AudioInConfig {
        AudioInConfig {
            encoding: self.input_encoding,
            sample_rate_hertz: self.input_sample_rate_hertz,
        }
    }

    pub fn output_config(&self) -> AudioOutConfig {
        AudioOutConfig {
            encoding: self.output_encoding,
            sample_rate_hertz: self.output_sample_rate_hertz,
            volume_percentage: self.volume_percentage,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.input_config().validate()?;
        self.output_config().validate()?;
        ensure!(self.chunk_bytes > 0, "Audio chunk size must be positive");
        Ok(())
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        let cfg: Self = settings
            .try_deserialize()
            .context("Failed to parse assistant config")?;
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.device.device_id.is_empty(),
            "Device ID must not be empty"
        );
        ensure!(
            !self.device.device_model_id.is_empty(),
            "Device model ID must not be empty"
        );
        self.audio.validate().context("Invalid audio settings")
    }

    pub fn identity(&self) -> Identity {
        Identity {
            device_id: self.device.device_id.clone(),
            device_model_id: self.device.device_model_id.clone(),
            locale: self.device.locale,
        }
    }
}
