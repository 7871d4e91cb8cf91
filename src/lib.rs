//! # voicehub - Unified Voice Engine Coordination
//!
//! Coordinates interchangeable engine implementations (speech-to-text,
//! text-to-speech, wake word detection, sound effects, audio playback)
//! behind a uniform capability contract, and resolves at runtime which
//! concrete engine services a request.
//!
//! ## Features
//!
//! - **Engine Registry**: typed registration of engines per role, indexed
//!   by name, duplicates rejected
//! - **Fallback Resolver**: deterministic primary-then-fallbacks selection
//!   with a full audit trail per attempt
//! - **Bounded Validation**: classified availability probes under a time
//!   budget; a hung probe never stalls resolution
//! - **Graceful Degradation**: a provider that breaks at runtime is
//!   demoted and the next candidate takes over mid-call
//! - **Audio Backend Probe Chain**: fixed-priority playback backend
//!   selection, probed once per process
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voicehub::VoiceHub;
//!
//! let hub = VoiceHub::builder()
//!     .with_default_engines()
//!     .build()?;
//!
//! // speak through whichever TTS engine is installed and healthy
//! hub.speech().speak("Hello world").await?;
//!
//! // transcribe five seconds of microphone audio
//! let text = hub.transcriber()
//!     .transcribe_live(std::time::Duration::from_secs(5))
//!     .await?;
//! ```
//!
//! ## Diagnostics
//!
//! ```rust,ignore
//! // why did TTS end up on the engine it did?
//! if let Some(record) = hub.status(voicehub::EngineRole::Tts) {
//!     for (name, reason) in &record.failures {
//!         println!("{name}: {reason}");
//!     }
//! }
//! ```

pub mod adapters;
pub mod audio;
pub mod core;
pub mod engine;
pub mod services;
pub mod text;
pub mod utils;

// Core re-exports
pub use crate::core::config::{
    AudioConfig, CaptureConfig, EngineSelection, SoundFxConfig, VoiceConfig, WakeWordConfig,
    DEFAULT_PROBE_TIMEOUT,
};
pub use crate::core::error::{Result, VoiceError};

// Engine layer re-exports
pub use crate::engine::{
    candidate_order, global_registry, AudioBackend, AudioHandle, Capability, DeepValidation,
    Detection, DetectionCallback, Engine, EngineDescriptor, EngineProvider, EngineRegistry,
    EngineRole, FailureReason, FallbackResolver, ProbeError, ProbeResult, ResolutionRecord,
    SoundFxEngine, SttEngine, TtsEngine, Validation, Validator, VoiceParams, WakeWordEngine,
    WakeWordOptions, WakeWordSession, RECORD_HISTORY_LIMIT,
};

// Service re-exports
pub use crate::services::{
    Playback, SoundFx, Speech, Transcriber, ValidationEntry, VoiceHub, VoiceHubBuilder, WakeWord,
};

// Audio re-exports
pub use crate::audio::{AudioRecorder, RecordedAudio, BACKEND_PRIORITY};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Framework name
pub const FRAMEWORK_NAME: &str = "voicehub";
