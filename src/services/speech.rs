//! Text-to-speech facade
//!
//! Applies text preprocessing (digit expansion) before synthesis and
//! routes the produced audio through the playback facade when speaking
//! aloud.

use std::sync::Arc;

use tracing::debug;

use crate::core::config::EngineSelection;
use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::EngineRole;
use crate::engine::resolver::{candidate_order, FallbackResolver, ResolutionRecord};
use crate::engine::traits::{AudioHandle, VoiceParams};
use crate::text::expand_numbers;
use crate::utils::temp_wav_path;

use super::binding::RoleBinding;
use super::playback::Playback;

/// Synthesizes and speaks text through the first usable TTS engine.
pub struct Speech {
    binding: RoleBinding,
    language: String,
    params: VoiceParams,
    playback: Arc<Playback>,
}

impl Speech {
    pub fn new(
        selection: &EngineSelection,
        resolver: Arc<FallbackResolver>,
        playback: Arc<Playback>,
    ) -> Self {
        let candidates =
            candidate_order(&selection.primary_engine, &selection.fallback_engines);
        Self {
            binding: RoleBinding::new(EngineRole::Tts, candidates, resolver),
            language: selection.language.clone(),
            params: VoiceParams {
                extra: selection.extra.clone(),
                ..VoiceParams::default()
            },
            playback,
        }
    }

    /// Synthesize speech without playing it.
    pub async fn synthesize(&self, text: &str) -> Result<AudioHandle> {
        self.synthesize_in(text, &self.language).await
    }

    pub async fn synthesize_in(&self, text: &str, language: &str) -> Result<AudioHandle> {
        if text.trim().is_empty() {
            return Err(VoiceError::config("empty text provided for synthesis"));
        }

        let processed = expand_numbers(text);
        if processed != text {
            debug!(original = text, processed = %processed, "expanded digits before synthesis");
        }

        self.binding
            .call(|provider| {
                let processed = processed.clone();
                let language = language.to_string();
                let params = self.params.clone();
                async move {
                    provider
                        .try_tts()?
                        .synthesize(&processed, &language, &params)
                        .await
                }
            })
            .await
    }

    /// Synthesize and play through the resolved audio backend.
    pub async fn speak(&self, text: &str) -> Result<()> {
        let language = self.language.clone();
        self.speak_in(text, &language).await
    }

    pub async fn speak_in(&self, text: &str, language: &str) -> Result<()> {
        match self.synthesize_in(text, language).await? {
            AudioHandle::File(path) => self.playback.play_file(&path).await,
            AudioHandle::Samples {
                samples,
                sample_rate,
            } => {
                let path = temp_wav_path("tts");
                crate::audio::capture::write_wav(&samples, sample_rate, &path)?;
                let played = self.playback.play_file(&path).await;
                let _ = std::fs::remove_file(&path);
                played
            }
        }
    }

    pub fn language(&self) -> &str {
        &self.language
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
