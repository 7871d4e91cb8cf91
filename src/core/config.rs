//! Resolved configuration surface
//!
//! voicehub consumes configuration that an external loader has already
//! parsed (file format and environment-variable handling live outside this
//! crate). These types describe that resolved shape: per role a primary
//! engine, an ordered fallback list, and role-specific parameters that are
//! passed through opaquely to the chosen provider.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default budget for a single availability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Top-level configuration consumed by [`crate::services::VoiceHubBuilder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Speech-to-text selection
    pub stt: EngineSelection,
    /// Text-to-speech selection
    pub tts: EngineSelection,
    /// Wake word detection settings
    pub wakeword: WakeWordConfig,
    /// Sound effects settings
    pub soundfx: SoundFxConfig,
    /// Audio device parameters
    pub audio: AudioConfig,
    /// Probe budget for the validator, in seconds
    pub probe_timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt: EngineSelection {
                primary_engine: "whisper_cpp".to_string(),
                fallback_engines: vec!["google_stt".to_string()],
                language: "id".to_string(),
                extra: HashMap::new(),
            },
            tts: EngineSelection {
                primary_engine: "mms_tts".to_string(),
                fallback_engines: vec![
                    "coqui_tts".to_string(),
                    "piper_tts".to_string(),
                    "espeak_ng".to_string(),
                ],
                language: "id".to_string(),
                extra: HashMap::new(),
            },
            wakeword: WakeWordConfig::default(),
            soundfx: SoundFxConfig::default(),
            audio: AudioConfig::default(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT.as_secs(),
        }
    }
}

impl VoiceConfig {
    /// Probe budget as a [`Duration`].
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Primary/fallback engine selection for one role.
///
/// Unknown keys are collected into `extra` and handed to the provider
/// unchanged; the resolver never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSelection {
    /// First candidate tried during resolution
    pub primary_engine: String,
    /// Remaining candidates, in priority order
    #[serde(default)]
    pub fallback_engines: Vec<String>,
    /// Language code passed to the provider
    #[serde(default = "default_language")]
    pub language: String,
    /// Opaque role-specific parameters
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl EngineSelection {
    /// All candidate names, primary first.
    pub fn candidates(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + self.fallback_engines.len());
        names.push(self.primary_engine.clone());
        names.extend(self.fallback_engines.iter().cloned());
        names
    }
}

fn default_language() -> String {
    "id".to_string()
}

/// Wake word detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeWordConfig {
    pub enabled: bool,
    pub primary_engine: String,
    pub fallback_engines: Vec<String>,
    /// Phrases that activate the assistant
    pub keywords: Vec<String>,
    /// Detection sensitivity, 0.0 (strict) to 1.0 (loose)
    pub sensitivity: f32,
}

impl Default for WakeWordConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            primary_engine: "porcupine".to_string(),
            fallback_engines: vec!["transcriber_loop".to_string()],
            keywords: vec!["hey assistant".to_string(), "halo asisten".to_string()],
            sensitivity: 0.5,
        }
    }
}

impl WakeWordConfig {
    pub fn candidates(&self) -> Vec<String> {
        let mut names = vec![self.primary_engine.clone()];
        names.extend(self.fallback_engines.iter().cloned());
        names
    }
}

/// Sound effects configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundFxConfig {
    pub enabled: bool,
    pub primary_engine: String,
    pub fallback_engines: Vec<String>,
    /// Playback volume, 0.0 to 1.0
    pub volume: f32,
}

impl Default for SoundFxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            primary_engine: "beep".to_string(),
            fallback_engines: Vec::new(),
            volume: 0.7,
        }
    }
}

impl SoundFxConfig {
    pub fn candidates(&self) -> Vec<String> {
        let mut names = vec![self.primary_engine.clone()];
        names.extend(self.fallback_engines.iter().cloned());
        names
    }
}

/// Audio device parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub input: CaptureConfig,
    pub output: PlaybackConfig,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input: CaptureConfig::default(),
            output: PlaybackConfig::default(),
        }
    }
}

/// Microphone capture parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

/// Speaker output parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub sample_rate: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
        }
    }
}
