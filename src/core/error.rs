//! Structured error handling for voicehub
//!
//! One taxonomy covers the whole engine lifecycle: registration,
//! availability probing, fallback resolution and live provider calls.
//! Resolution-time failures are data (recorded, logged, swallowed by the
//! resolver); only the terminal "no candidate left" condition reaches the
//! caller, as [`VoiceError::EngineUnavailable`] carrying the full audit
//! trail.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::engine::descriptor::EngineRole;
use crate::engine::resolver::ResolutionRecord;

/// Result type alias with VoiceError
pub type Result<T> = std::result::Result<T, VoiceError>;

/// Main error type for voicehub
#[derive(Error, Debug)]
pub enum VoiceError {
    /// An engine name was registered twice for the same role.
    ///
    /// Fatal to that single registration, never to the process: two
    /// independently authored integrations must not silently mask each
    /// other.
    #[error("engine '{name}' is already registered for role {role}")]
    DuplicateName { role: EngineRole, name: String },

    /// A candidate name is unknown to the registry.
    #[error("no engine named '{name}' is registered for role {role}")]
    NotRegistered { role: EngineRole, name: String },

    /// A required library, binary or service credential is absent.
    #[error("required dependency '{name}' is missing")]
    DependencyMissing { name: String },

    /// A configured model or data file path does not exist.
    #[error("required resource not found: {}", path.display())]
    ResourceMissing { path: PathBuf },

    /// An availability probe exceeded its time budget.
    #[error("availability probe exceeded its budget of {budget:?}")]
    ProbeTimeout { budget: Duration },

    /// A bound provider failed during an actual call.
    ///
    /// `fault` distinguishes a broken provider (subprocess gone, device
    /// lost) from a transient input problem; only faults trigger
    /// demote-and-retry in the facades.
    #[error("engine '{engine}' failed during {operation}: {message}")]
    ProviderRuntime {
        engine: String,
        operation: String,
        message: String,
        fault: bool,
    },

    /// Every candidate for a role failed; carries the audit trail so the
    /// failure is explainable, not just boolean.
    #[error("no usable {role} engine: all {} candidates failed", record.attempted.len())]
    EngineUnavailable {
        role: EngineRole,
        record: Box<ResolutionRecord>,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Audio capture/playback errors
    #[error("audio {operation} failed: {message}")]
    Audio { operation: String, message: String },

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl VoiceError {
    /// Transient provider-call failure (bad input, missing per-call data).
    pub fn runtime(
        engine: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRuntime {
            engine: engine.into(),
            operation: operation.into(),
            message: message.into(),
            fault: false,
        }
    }

    /// Provider-call failure that marks the provider itself as broken.
    pub fn runtime_fault(
        engine: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRuntime {
            engine: engine.into(),
            operation: operation.into(),
            message: message.into(),
            fault: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn audio(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Audio {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Does this error indicate the bound provider is now broken?
    ///
    /// The facades demote the provider and retry the call once against the
    /// next candidate when this returns true.
    pub fn is_provider_fault(&self) -> bool {
        matches!(self, Self::ProviderRuntime { fault: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        assert!(
            VoiceError::runtime_fault("piper_tts", "synthesize", "process died")
                .is_provider_fault()
        );
        assert!(!VoiceError::runtime("piper_tts", "synthesize", "empty text")
            .is_provider_fault());
        assert!(!VoiceError::config("bad field").is_provider_fault());
    }

    #[test]
    fn test_display_messages() {
        let err = VoiceError::DuplicateName {
            role: EngineRole::Tts,
            name: "piper_tts".to_string(),
        };
        assert!(err.to_string().contains("piper_tts"));
        assert!(err.to_string().contains("tts"));

        let err = VoiceError::ResourceMissing {
            path: PathBuf::from("models/ggml-base.bin"),
        };
        assert!(err.to_string().contains("ggml-base.bin"));
    }
}
