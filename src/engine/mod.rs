//! Engine abstraction layer
//!
//! Coordinates interchangeable engine implementations behind one
//! capability contract and resolves, at runtime, which concrete instance
//! services a request.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │            (CLI, per-role service facades)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   Fallback Resolver                         │
//! │   primary → fallbacks, strict order, full audit trail       │
//! ├─────────────────────────────────────────────────────────────┤
//! │     Registry                │          Validator            │
//! │  (role, name) → provider    │   bounded classified probe    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    Engine Providers                         │
//! │  ┌────────┐ ┌────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐ │
//! │  │  STT   │ │  TTS   │ │ WakeWord │ │ SoundFx │ │ Audio  │ │
//! │  │        │ │        │ │          │ │         │ │Backend │ │
//! │  └────────┘ └────────┘ └──────────┘ └─────────┘ └────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod descriptor;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod validator;

pub use descriptor::{Capability, EngineDescriptor, EngineRole};
pub use registry::{global_registry, EngineRegistry};
pub use resolver::{
    candidate_order, FallbackResolver, ResolutionRecord, RECORD_HISTORY_LIMIT,
};
pub use traits::{
    AudioBackend, AudioHandle, DeepValidation, Detection, DetectionCallback, Engine,
    EngineProvider, ProbeError, ProbeResult, SoundFxEngine, SttEngine, TtsEngine, VoiceParams,
    WakeWordEngine, WakeWordOptions, WakeWordSession,
};
pub use validator::{FailureReason, Validation, Validator};
