//! Audio backend probe chain
//!
//! Playback backend choice is a platform-capability question, not a user
//! preference, so the candidate order is a fixed built-in priority list
//! rather than configuration: the native mixer first, then command-line
//! players, then the platform's own player. The chain is probed once per
//! process and the result cached by the playback facade; a failed
//! `play_file` at runtime demotes that backend for the rest of the
//! process.

use std::sync::Arc;

use crate::core::error::Result;
use crate::engine::registry::EngineRegistry;
use crate::engine::traits::EngineProvider;

use super::playback::{CommandBackend, CpalBackend};

#[cfg(target_os = "macos")]
const PLATFORM_PLAYER: &str = "afplay";
#[cfg(target_os = "windows")]
const PLATFORM_PLAYER: &str = "powershell";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PLATFORM_PLAYER: &str = "sox";

/// Fixed probe order for audio playback backends.
pub const BACKEND_PRIORITY: [&str; 6] = [
    "cpal",
    "ffplay",
    "aplay",
    "paplay",
    "mpg123",
    PLATFORM_PLAYER,
];

/// Candidate list for the playback facade, in priority order.
pub fn backend_candidates() -> Vec<String> {
    BACKEND_PRIORITY.iter().map(|s| s.to_string()).collect()
}

/// Register every built-in playback backend.
pub fn register_default_backends(registry: &EngineRegistry) -> Result<()> {
    registry.register(EngineProvider::AudioBackend(Arc::new(CpalBackend::new())))?;
    registry.register(EngineProvider::AudioBackend(Arc::new(
        CommandBackend::ffplay(),
    )))?;
    registry.register(EngineProvider::AudioBackend(Arc::new(
        CommandBackend::aplay(),
    )))?;
    registry.register(EngineProvider::AudioBackend(Arc::new(
        CommandBackend::paplay(),
    )))?;
    registry.register(EngineProvider::AudioBackend(Arc::new(
        CommandBackend::mpg123(),
    )))?;
    registry.register(EngineProvider::AudioBackend(Arc::new(
        CommandBackend::platform_player(),
    )))?;
    Ok(())
}
