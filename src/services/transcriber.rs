//! Speech-to-text facade

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::EngineSelection;
use crate::core::error::Result;
use crate::engine::descriptor::EngineRole;
use crate::engine::resolver::{candidate_order, FallbackResolver, ResolutionRecord};

use super::binding::RoleBinding;

/// Transcribes audio through the first usable STT engine.
pub struct Transcriber {
    binding: RoleBinding,
    language: String,
}

impl Transcriber {
    pub fn new(selection: &EngineSelection, resolver: Arc<FallbackResolver>) -> Self {
        let candidates =
            candidate_order(&selection.primary_engine, &selection.fallback_engines);
        Self {
            binding: RoleBinding::new(EngineRole::Stt, candidates, resolver),
            language: selection.language.clone(),
        }
    }

    /// Transcribe an audio file using the configured language.
    pub async fn transcribe_file(&self, path: &Path) -> Result<String> {
        self.transcribe_file_in(path, &self.language).await
    }

    pub async fn transcribe_file_in(&self, path: &Path, language: &str) -> Result<String> {
        self.binding
            .call(|provider| {
                let path = path.to_path_buf();
                let language = language.to_string();
                async move { provider.try_stt()?.transcribe_file(&path, &language).await }
            })
            .await
    }

    /// Record from the microphone for `duration`, then transcribe.
    pub async fn transcribe_live(&self, duration: Duration) -> Result<String> {
        self.transcribe_live_in(duration, &self.language).await
    }

    pub async fn transcribe_live_in(&self, duration: Duration, language: &str) -> Result<String> {
        self.binding
            .call(|provider| {
                let language = language.to_string();
                async move {
                    provider
                        .try_stt()?
                        .transcribe_live(duration, &language)
                        .await
                }
            })
            .await
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
