//! Wake word facade
//!
//! Owns the one long-lived background operation in the system: the wake
//! word listener. `stop` is idempotent (safe to call twice and after the
//! listener exited on its own) and joins the background task before
//! returning, so no listener dangles after stop.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::core::config::WakeWordConfig;
use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::EngineRole;
use crate::engine::resolver::{dedup_candidates, FallbackResolver, ResolutionRecord};
use crate::engine::traits::{DetectionCallback, WakeWordOptions, WakeWordSession};

use super::binding::RoleBinding;

/// Starts and stops wake word detection through the first usable engine.
pub struct WakeWord {
    binding: RoleBinding,
    options: WakeWordOptions,
    enabled: bool,
    session: Mutex<Option<Box<dyn WakeWordSession>>>,
}

impl WakeWord {
    pub fn new(config: &WakeWordConfig, resolver: Arc<FallbackResolver>) -> Self {
        Self {
            binding: RoleBinding::new(
                EngineRole::WakeWord,
                dedup_candidates(&config.candidates()),
                resolver,
            ),
            options: WakeWordOptions {
                keywords: config.keywords.clone(),
                sensitivity: config.sensitivity,
            },
            enabled: config.enabled,
            session: Mutex::new(None),
        }
    }

    /// Start the background listener; `on_detect` fires per detection.
    ///
    /// An already-running listener is stopped first, so `start` doubles as
    /// restart after a keyword or sensitivity change.
    pub async fn start(&self, on_detect: DetectionCallback) -> Result<()> {
        if !self.enabled {
            return Err(VoiceError::config("wake word detection is disabled"));
        }

        let mut slot = self.session.lock().await;
        if let Some(mut old) = slot.take() {
            old.stop()?;
        }

        let session = self
            .binding
            .call(|provider| {
                let options = self.options.clone();
                let on_detect = Arc::clone(&on_detect);
                async move { provider.try_wakeword()?.start(&options, on_detect) }
            })
            .await?;

        info!(keywords = ?self.options.keywords, "wake word detection started");
        *slot = Some(session);
        Ok(())
    }

    /// Stop the listener and join its background task.
    ///
    /// A no-op when nothing is running.
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.session.lock().await;
        if let Some(mut session) = slot.take() {
            session.stop()?;
            info!("wake word detection stopped");
        }
        Ok(())
    }

    pub async fn is_listening(&self) -> bool {
        let slot = self.session.lock().await;
        slot.as_ref().map(|s| s.is_active()).unwrap_or(false)
    }

    pub fn keywords(&self) -> &[String] {
        &self.options.keywords
    }

    pub async fn bound_engine(&self) -> Option<String> {
        self.binding.bound_name().await
    }

    /// Stop any active session, then rebind from scratch.
    pub async fn reload(&self) -> Result<ResolutionRecord> {
        self.stop().await?;
        Ok(self.binding.reload().await)
    }

    pub fn status(&self) -> Option<ResolutionRecord> {
        self.binding.status()
    }
}
