pub mod config;

pub use config::{
    AudioInConfig, AudioInEncoding, AudioOutConfig, AudioOutEncoding, DEFAULT_SAMPLE_RATE_HZ,
    DEFAULT_VOLUME_PERCENTAGE,
};
