//! Core infrastructure: error taxonomy and resolved configuration.

pub mod config;
pub mod error;

pub use config::{
    AudioConfig, CaptureConfig, EngineSelection, PlaybackConfig, SoundFxConfig, VoiceConfig,
    WakeWordConfig, DEFAULT_PROBE_TIMEOUT,
};
pub use error::{Result, VoiceError};
