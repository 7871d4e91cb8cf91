//! Engine identity and capability metadata
//!
//! An [`EngineDescriptor`] is created once at registration time and is
//! immutable thereafter; everything the registry, resolver and diagnostics
//! surfaces know about an engine without touching it comes from here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability category an engine fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineRole {
    /// Speech-to-text
    Stt,
    /// Text-to-speech
    Tts,
    /// Wake word detection
    WakeWord,
    /// Sound effects
    SoundFx,
    /// Audio playback backend
    AudioBackend,
}

impl EngineRole {
    /// Every role, in a stable order (used by diagnostics surfaces).
    pub const ALL: [EngineRole; 5] = [
        EngineRole::Stt,
        EngineRole::Tts,
        EngineRole::WakeWord,
        EngineRole::SoundFx,
        EngineRole::AudioBackend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stt => "stt",
            Self::Tts => "tts",
            Self::WakeWord => "wakeword",
            Self::SoundFx => "soundfx",
            Self::AudioBackend => "audio_backend",
        }
    }
}

impl fmt::Display for EngineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability tags an engine claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Works without network access
    Offline,
    /// Requires network access
    Online,
    /// Produces incremental output
    Streaming,
    /// Supports more than one language
    MultiLanguage,
    /// Cheap enough for interactive feedback sounds
    LowLatency,
    /// Runs an external executable
    Subprocess,
}

/// Identity and capability metadata for one engine implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDescriptor {
    /// Unique key within the role (e.g. "whisper_cpp")
    pub name: String,
    /// Capability category
    pub role: EngineRole,
    /// Human-readable description
    pub description: String,
    /// Engine version
    pub version: String,
    /// Claimed capability tags
    pub capabilities: Vec<Capability>,
}

impl EngineDescriptor {
    /// Create a descriptor with empty description and version "1.0.0".
    pub fn new(name: impl Into<String>, role: EngineRole) -> Self {
        Self {
            name: name.into(),
            role,
            description: String::new(),
            version: "1.0.0".to_string(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let descriptor = EngineDescriptor::new("whisper_cpp", EngineRole::Stt)
            .with_description("Offline speech-to-text via whisper.cpp")
            .with_version("1.2.0")
            .with_capability(Capability::Offline)
            .with_capability(Capability::MultiLanguage);

        assert_eq!(descriptor.name, "whisper_cpp");
        assert_eq!(descriptor.role, EngineRole::Stt);
        assert_eq!(descriptor.version, "1.2.0");
        assert!(descriptor.has_capability(Capability::Offline));
        assert!(!descriptor.has_capability(Capability::Online));
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&EngineRole::AudioBackend).unwrap();
        assert_eq!(json, "\"audio_backend\"");
        assert_eq!(EngineRole::WakeWord.to_string(), "wakeword");
    }
}
