//! The engine plugin contract
//!
//! Every concrete engine implements the [`Engine`] supertrait plus exactly
//! one role trait ([`SttEngine`], [`TtsEngine`], [`WakeWordEngine`],
//! [`SoundFxEngine`], [`AudioBackend`]). The registry stores engines as
//! [`EngineProvider`] values, an enum with one variant per role, so the
//! resolver can treat all roles uniformly while callers get back the typed
//! interface they asked for.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{EngineDescriptor, EngineRole};

/// Outcome of a classified availability probe.
pub type ProbeResult = std::result::Result<(), ProbeError>;

/// Why an availability probe failed.
///
/// The probe must be cheap, idempotent and side-effect-free: no partial
/// initialization may be left behind on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// A required library, binary or credential is absent.
    MissingDependency { name: String },
    /// A configured model or data file path does not exist.
    MissingResource { path: PathBuf },
    /// The engine's own self-check failed.
    Failed { message: String },
}

impl ProbeError {
    pub fn dependency(name: impl Into<String>) -> Self {
        Self::MissingDependency { name: name.into() }
    }

    pub fn resource(path: impl Into<PathBuf>) -> Self {
        Self::MissingResource { path: path.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Result of the slow, on-demand deep validation (operator action).
///
/// Distinct from the fast probe: this one may exercise real functionality
/// and is never invoked inline during resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepValidation {
    pub valid: bool,
    pub message: String,
}

impl DeepValidation {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Common contract every engine implements regardless of role.
pub trait Engine: Send + Sync {
    /// Identity and capability metadata. Immutable after discovery.
    fn descriptor(&self) -> &EngineDescriptor;

    /// Classified availability probe.
    ///
    /// Must not invoke the engine's primary function and must complete
    /// quickly; the validator enforces a time budget on top of it.
    fn probe(&self) -> ProbeResult;

    /// Is this engine usable right now?
    fn check_availability(&self) -> bool {
        self.probe().is_ok()
    }

    /// Slow validation for the operator-facing "validate all" action.
    ///
    /// Defaults to reporting the probe outcome.
    fn validate_deep(&self) -> DeepValidation {
        match self.probe() {
            Ok(()) => DeepValidation::ok("probe passed"),
            Err(ProbeError::MissingDependency { name }) => {
                DeepValidation::invalid(format!("missing dependency: {name}"))
            }
            Err(ProbeError::MissingResource { path }) => {
                DeepValidation::invalid(format!("missing resource: {}", path.display()))
            }
            Err(ProbeError::Failed { message }) => DeepValidation::invalid(message),
        }
    }
}

/// Synthesis parameters passed through to TTS engines.
#[derive(Debug, Clone, Default)]
pub struct VoiceParams {
    /// Voice identifier, engine-specific
    pub voice: Option<String>,
    /// Speed multiplier (1.0 = normal)
    pub speed: Option<f32>,
    /// Output volume, 0.0 to 1.0
    pub volume: Option<f32>,
    /// Opaque engine-specific parameters
    pub extra: HashMap<String, serde_json::Value>,
}

/// Synthesized audio, either on disk or in memory.
#[derive(Debug, Clone)]
pub enum AudioHandle {
    /// Audio written to a file by the engine
    File(PathBuf),
    /// Raw samples, normalized to [-1, 1]
    Samples { samples: Vec<f32>, sample_rate: u32 },
}

/// Speech-to-text engine contract.
#[async_trait]
pub trait SttEngine: Engine {
    /// Transcribe an audio file to text.
    async fn transcribe_file(&self, path: &Path, language: &str) -> Result<String>;

    /// Record from the microphone for `duration`, then transcribe.
    async fn transcribe_live(&self, duration: Duration, language: &str) -> Result<String>;
}

/// Text-to-speech engine contract.
#[async_trait]
pub trait TtsEngine: Engine {
    /// Synthesize speech from text.
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        params: &VoiceParams,
    ) -> Result<AudioHandle>;
}

/// A detected wake word occurrence.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The keyword that matched
    pub keyword: String,
    /// Index into the configured keyword list
    pub index: usize,
}

/// Callback invoked from the background listener on each detection.
pub type DetectionCallback = Arc<dyn Fn(Detection) + Send + Sync>;

/// Wake word detection parameters.
#[derive(Debug, Clone)]
pub struct WakeWordOptions {
    pub keywords: Vec<String>,
    /// 0.0 (strict) to 1.0 (loose)
    pub sensitivity: f32,
}

impl Default for WakeWordOptions {
    fn default() -> Self {
        Self {
            keywords: vec!["hey assistant".to_string()],
            sensitivity: 0.5,
        }
    }
}

/// Handle to a running background listener.
///
/// `stop` is idempotent: it is safe to call twice in a row and after the
/// listener has already exited on its own. The background task is joined
/// before `stop` returns.
pub trait WakeWordSession: Send {
    fn stop(&mut self) -> Result<()>;
    fn is_active(&self) -> bool;
}

/// Wake word detection engine contract.
pub trait WakeWordEngine: Engine {
    /// Spawn a background listener that invokes `on_detect` per detection.
    fn start(
        &self,
        options: &WakeWordOptions,
        on_detect: DetectionCallback,
    ) -> Result<Box<dyn WakeWordSession>>;
}

/// Sound effects engine contract.
#[async_trait]
pub trait SoundFxEngine: Engine {
    /// Play a named effect (e.g. "success", "error", "notification").
    async fn play(&self, effect: &str) -> Result<()>;
}

/// Audio playback backend contract.
pub trait AudioBackend: Engine {
    /// Play an audio file to completion.
    ///
    /// An `Err` at runtime demotes this backend for the rest of the
    /// process. Availability probing is by existence check only, never by
    /// producing sound.
    fn play_file(&self, path: &Path) -> Result<()>;
}

/// One engine instance, tagged by role.
///
/// Clones share the underlying engine; the registry exclusively owns the
/// set of providers while facades hold non-owning clones of the currently
/// bound one.
#[derive(Clone)]
pub enum EngineProvider {
    Stt(Arc<dyn SttEngine>),
    Tts(Arc<dyn TtsEngine>),
    WakeWord(Arc<dyn WakeWordEngine>),
    SoundFx(Arc<dyn SoundFxEngine>),
    AudioBackend(Arc<dyn AudioBackend>),
}

impl EngineProvider {
    /// Role implied by the variant.
    pub fn role(&self) -> EngineRole {
        match self {
            Self::Stt(_) => EngineRole::Stt,
            Self::Tts(_) => EngineRole::Tts,
            Self::WakeWord(_) => EngineRole::WakeWord,
            Self::SoundFx(_) => EngineRole::SoundFx,
            Self::AudioBackend(_) => EngineRole::AudioBackend,
        }
    }

    /// Role-independent view for probing and diagnostics.
    pub fn as_engine(&self) -> &dyn Engine {
        match self {
            Self::Stt(e) => &**e,
            Self::Tts(e) => &**e,
            Self::WakeWord(e) => &**e,
            Self::SoundFx(e) => &**e,
            Self::AudioBackend(e) => &**e,
        }
    }

    pub fn descriptor(&self) -> &EngineDescriptor {
        self.as_engine().descriptor()
    }

    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    pub fn try_stt(&self) -> Result<Arc<dyn SttEngine>> {
        match self {
            Self::Stt(e) => Ok(Arc::clone(e)),
            other => Err(wrong_role(other, EngineRole::Stt)),
        }
    }

    pub fn try_tts(&self) -> Result<Arc<dyn TtsEngine>> {
        match self {
            Self::Tts(e) => Ok(Arc::clone(e)),
            other => Err(wrong_role(other, EngineRole::Tts)),
        }
    }

    pub fn try_wakeword(&self) -> Result<Arc<dyn WakeWordEngine>> {
        match self {
            Self::WakeWord(e) => Ok(Arc::clone(e)),
            other => Err(wrong_role(other, EngineRole::WakeWord)),
        }
    }

    pub fn try_soundfx(&self) -> Result<Arc<dyn SoundFxEngine>> {
        match self {
            Self::SoundFx(e) => Ok(Arc::clone(e)),
            other => Err(wrong_role(other, EngineRole::SoundFx)),
        }
    }

    pub fn try_audio_backend(&self) -> Result<Arc<dyn AudioBackend>> {
        match self {
            Self::AudioBackend(e) => Ok(Arc::clone(e)),
            other => Err(wrong_role(other, EngineRole::AudioBackend)),
        }
    }
}

fn wrong_role(provider: &EngineProvider, wanted: EngineRole) -> VoiceError {
    VoiceError::internal(format!(
        "engine '{}' has role {}, expected {}",
        provider.name(),
        provider.role(),
        wanted
    ))
}

impl std::fmt::Debug for EngineProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineProvider")
            .field("role", &self.role())
            .field("name", &self.name())
            .finish()
    }
}
