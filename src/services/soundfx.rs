//! Sound effects facade
//!
//! Named audio feedback (start, stop, success, error, notification).
//! Disabled sound effects are a silent no-op, never an error: feedback
//! sounds must not break the interaction that triggered them.

use std::sync::Arc;

use crate::core::config::SoundFxConfig;
use crate::core::error::Result;
use crate::engine::descriptor::EngineRole;
use crate::engine::resolver::{dedup_candidates, FallbackResolver, ResolutionRecord};

use super::binding::RoleBinding;

/// Plays named feedback sounds through the first usable engine.
pub struct SoundFx {
    binding: RoleBinding,
    enabled: bool,
}

impl SoundFx {
    pub fn new(config: &SoundFxConfig, resolver: Arc<FallbackResolver>) -> Self {
        Self {
            binding: RoleBinding::new(
                EngineRole::SoundFx,
                dedup_candidates(&config.candidates()),
                resolver,
            ),
            enabled: config.enabled,
        }
    }

    /// Play a named effect.
    pub async fn play(&self, effect: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.binding
            .call(|provider| {
                let effect = effect.to_string();
                async move { provider.try_soundfx()?.play(&effect).await }
            })
            .await
    }

    pub async fn play_start(&self) -> Result<()> {
        self.play("start").await
    }

    pub async fn play_stop(&self) -> Result<()> {
        self.play("stop").await
    }

    pub async fn play_success(&self) -> Result<()> {
        self.play("success").await
    }

    pub async fn play_error(&self) -> Result<()> {
        self.play("error").await
    }

    pub async fn play_notification(&self) -> Result<()> {
        self.play("notification").await
    }

    pub async fn bound_engine(&self) -> Option<String> {
        self.binding.bound_name().await
    }

    pub async fn reload(&self) -> ResolutionRecord {
        self.binding.reload().await
    }

    pub fn status(&self) -> Option<ResolutionRecord> {
        self.binding.status()
    }
}
