//! Top-level owner and operator surface
//!
//! [`VoiceHub`] owns the registry, the resolver, and one facade per role;
//! application code depends on the facades, operators and the CLI on the
//! `reload` / `status` / `validate_all` controls.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::adapters::register_default_engines;
use crate::audio::chain::register_default_backends;
use crate::core::config::VoiceConfig;
use crate::core::error::Result;
use crate::engine::descriptor::EngineRole;
use crate::engine::registry::EngineRegistry;
use crate::engine::resolver::{FallbackResolver, ResolutionRecord};
use crate::engine::traits::DeepValidation;
use crate::engine::validator::Validator;

use super::playback::Playback;
use super::soundfx::SoundFx;
use super::speech::Speech;
use super::transcriber::Transcriber;
use super::wakeword::WakeWord;

/// Deep-validation outcome for one registered engine.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationEntry {
    pub role: EngineRole,
    pub name: String,
    pub result: DeepValidation,
}

/// Owns all per-role services plus the registry and resolver behind them.
pub struct VoiceHub {
    config: VoiceConfig,
    registry: Arc<EngineRegistry>,
    resolver: Arc<FallbackResolver>,
    transcriber: Arc<Transcriber>,
    speech: Arc<Speech>,
    wakeword: Arc<WakeWord>,
    soundfx: Arc<SoundFx>,
    playback: Arc<Playback>,
}

impl VoiceHub {
    pub fn builder() -> VoiceHubBuilder {
        VoiceHubBuilder::new()
    }

    /// Hub with default configuration and every built-in engine.
    pub fn new_default() -> Result<Self> {
        Self::builder().with_default_engines().build()
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    pub fn transcriber(&self) -> &Arc<Transcriber> {
        &self.transcriber
    }

    pub fn speech(&self) -> &Arc<Speech> {
        &self.speech
    }

    pub fn wakeword(&self) -> &Arc<WakeWord> {
        &self.wakeword
    }

    pub fn soundfx(&self) -> &Arc<SoundFx> {
        &self.soundfx
    }

    pub fn playback(&self) -> &Arc<Playback> {
        &self.playback
    }

    /// Clear demotions for a role and re-run resolution from scratch.
    pub async fn reload(&self, role: EngineRole) -> Result<ResolutionRecord> {
        info!(role = %role, "operator reload requested");
        match role {
            EngineRole::Stt => Ok(self.transcriber.reload().await),
            EngineRole::Tts => Ok(self.speech.reload().await),
            EngineRole::WakeWord => self.wakeword.reload().await,
            EngineRole::SoundFx => Ok(self.soundfx.reload().await),
            EngineRole::AudioBackend => Ok(self.playback.reload().await),
        }
    }

    /// Last resolution outcome for a role, if it has resolved at all.
    pub fn status(&self, role: EngineRole) -> Option<ResolutionRecord> {
        self.resolver.last_record(role)
    }

    /// Run deep validation over every registered engine.
    ///
    /// May be slow; intended for an operator action, never invoked inline
    /// during resolution.
    pub fn validate_all(&self) -> Vec<ValidationEntry> {
        self.registry
            .all_providers()
            .into_iter()
            .map(|provider| ValidationEntry {
                role: provider.role(),
                name: provider.name().to_string(),
                result: provider.as_engine().validate_deep(),
            })
            .collect()
    }
}

/// Builder for [`VoiceHub`].
pub struct VoiceHubBuilder {
    config: VoiceConfig,
    registry: Option<Arc<EngineRegistry>>,
    register_defaults: bool,
}

impl VoiceHubBuilder {
    pub fn new() -> Self {
        Self {
            config: VoiceConfig::default(),
            registry: None,
            register_defaults: false,
        }
    }

    pub fn config(mut self, config: VoiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a pre-populated registry (e.g. with third-party engines).
    pub fn registry(mut self, registry: Arc<EngineRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register every built-in engine and playback backend at build time.
    pub fn with_default_engines(mut self) -> Self {
        self.register_defaults = true;
        self
    }

    pub fn build(self) -> Result<VoiceHub> {
        let config = self.config;
        let registry = self.registry.unwrap_or_else(|| Arc::new(EngineRegistry::new()));
        let validator = Validator::with_timeout(config.probe_timeout());
        let resolver = Arc::new(FallbackResolver::with_validator(
            Arc::clone(&registry),
            validator,
        ));

        let playback = Arc::new(Playback::new(Arc::clone(&resolver)));
        let transcriber = Arc::new(Transcriber::new(&config.stt, Arc::clone(&resolver)));
        let speech = Arc::new(Speech::new(
            &config.tts,
            Arc::clone(&resolver),
            Arc::clone(&playback),
        ));
        let wakeword = Arc::new(WakeWord::new(&config.wakeword, Arc::clone(&resolver)));
        let soundfx = Arc::new(SoundFx::new(&config.soundfx, Arc::clone(&resolver)));

        if self.register_defaults {
            register_default_backends(&registry)?;
            register_default_engines(
                &registry,
                &config,
                Arc::clone(&transcriber),
                Arc::clone(&playback),
            )?;
        }

        Ok(VoiceHub {
            config,
            registry,
            resolver,
            transcriber,
            speech,
            wakeword,
            soundfx,
            playback,
        })
    }
}

impl Default for VoiceHubBuilder {
    fn default() -> Self {
        Self::new()
    }
}
