//! Built-in engine adapters
//!
//! Thin wrappers around external binaries and services, each implementing
//! the plugin contract at its boundary. The algorithms live outside this
//! crate; the adapters own availability probing, process/request plumbing
//! and error classification.

use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::capture::AudioRecorder;
use crate::core::config::VoiceConfig;
use crate::core::error::Result;
use crate::engine::registry::EngineRegistry;
use crate::engine::traits::EngineProvider;
use crate::services::{Playback, Transcriber};

pub mod beep;
pub mod espeak_ng;
pub mod google_stt;
pub mod piper;
pub mod transcriber_loop;
pub mod whisper_cpp;

pub use beep::BeepSoundFx;
pub use espeak_ng::EspeakNgTts;
pub use google_stt::{GoogleStt, GoogleSttConfig};
pub use piper::{PiperConfig, PiperTts};
pub use transcriber_loop::{ThreadedSession, TranscriberLoopWakeWord};
pub use whisper_cpp::{WhisperCppConfig, WhisperCppStt};

fn extra_path(config: &VoiceConfig, section_key: &str, fallback: PathBuf) -> PathBuf {
    config
        .stt
        .extra
        .get(section_key)
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .unwrap_or(fallback)
}

/// Register every built-in content engine (the playback backends are
/// registered separately by `audio::chain::register_default_backends`).
pub fn register_default_engines(
    registry: &EngineRegistry,
    config: &VoiceConfig,
    transcriber: Arc<Transcriber>,
    playback: Arc<Playback>,
) -> Result<()> {
    let recorder = AudioRecorder::new(config.audio.input.clone());

    let whisper = WhisperCppConfig {
        executable: extra_path(
            config,
            "executable",
            WhisperCppConfig::default().executable,
        ),
        model: extra_path(config, "model", WhisperCppConfig::default().model),
    };
    registry.register(EngineProvider::Stt(Arc::new(WhisperCppStt::new(
        whisper,
        recorder.clone(),
    ))))?;

    let google = GoogleSttConfig {
        api_key: config
            .stt
            .extra
            .get("google_stt_api_key")
            .and_then(|v| v.as_str())
            .map(String::from),
        ..GoogleSttConfig::default()
    };
    registry.register(EngineProvider::Stt(Arc::new(GoogleStt::new(
        google,
        recorder.clone(),
    ))))?;

    let piper = PiperConfig {
        models_dir: config
            .tts
            .extra
            .get("models_dir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(PiperConfig::default().models_dir),
        ..PiperConfig::default()
    };
    registry.register(EngineProvider::Tts(Arc::new(PiperTts::new(piper))))?;
    registry.register(EngineProvider::Tts(Arc::new(EspeakNgTts::new())))?;

    registry.register(EngineProvider::SoundFx(Arc::new(BeepSoundFx::new(
        playback,
        config.soundfx.volume,
    ))))?;

    registry.register(EngineProvider::WakeWord(Arc::new(
        TranscriberLoopWakeWord::new(transcriber),
    )))?;

    Ok(())
}
