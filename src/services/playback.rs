//! Audio playback facade
//!
//! Fronts the audio backend probe chain (`audio::chain`). Unlike the
//! content roles, the candidate order is the fixed built-in priority list;
//! the chain is resolved once per process and the winner reused for every
//! subsequent `play_file` without re-probing earlier entries. A runtime
//! playback failure demotes the backend and moves on to the next one.

use std::path::Path;
use std::sync::Arc;

use crate::audio::chain::backend_candidates;
use crate::core::error::Result;
use crate::engine::descriptor::EngineRole;
use crate::engine::resolver::{FallbackResolver, ResolutionRecord};

use super::binding::RoleBinding;

/// Plays audio files through the first working backend.
pub struct Playback {
    binding: RoleBinding,
}

impl Playback {
    pub fn new(resolver: Arc<FallbackResolver>) -> Self {
        Self {
            binding: RoleBinding::new(EngineRole::AudioBackend, backend_candidates(), resolver),
        }
    }

    /// Play an audio file to completion through the bound backend.
    pub async fn play_file(&self, path: &Path) -> Result<()> {
        self.binding
            .call(|provider| {
                let path = path.to_path_buf();
                async move { provider.try_audio_backend()?.play_file(&path) }
            })
            .await
    }

    /// Name of the backend currently bound, if any.
    pub async fn bound_backend(&self) -> Option<String> {
        self.binding.bound_name().await
    }

    pub async fn reload(&self) -> ResolutionRecord {
        self.binding.reload().await
    }

    pub fn status(&self) -> Option<ResolutionRecord> {
        self.binding.status()
    }
}
