//! Per-role binding and failover core
//!
//! Every facade owns one [`RoleBinding`]: the single mutable slot holding
//! the currently bound provider for its role, plus the demotion set. All
//! calls and resolutions for a role are serialized through the binding's
//! lock, so a resolution in progress blocks concurrent calls to the same
//! role instead of racing a second resolution. Different roles are fully
//! independent.
//!
//! The demote-and-retry policy lives here, once, so every role shares one
//! tested ordering/audit implementation instead of per-call-site copies.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::EngineRole;
use crate::engine::resolver::{FallbackResolver, ResolutionRecord};
use crate::engine::traits::EngineProvider;

#[derive(Default)]
struct BindState {
    bound: Option<EngineProvider>,
    /// Names demoted after a runtime fault; cleared only by reload
    demoted: HashSet<String>,
    /// A fully failed resolution stays failed until reload
    exhausted: bool,
}

/// Binding state machine for one role.
pub struct RoleBinding {
    role: EngineRole,
    candidates: Vec<String>,
    resolver: Arc<FallbackResolver>,
    state: Mutex<BindState>,
}

impl RoleBinding {
    pub fn new(role: EngineRole, candidates: Vec<String>, resolver: Arc<FallbackResolver>) -> Self {
        Self {
            role,
            candidates,
            resolver,
            state: Mutex::new(BindState::default()),
        }
    }

    pub fn role(&self) -> EngineRole {
        self.role
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Invoke `op` against the bound provider, resolving first if needed.
    ///
    /// When the call fails with a provider fault, the provider is demoted
    /// for the rest of the process, the next candidate is resolved, and
    /// the same call is retried exactly once; a second failure surfaces.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(EngineProvider) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut state = self.state.lock().await;
        let provider = self.ensure_bound(&mut state)?;

        match op(provider.clone()).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_provider_fault() => {
                let failed = provider.name().to_string();
                warn!(
                    role = %self.role,
                    engine = %failed,
                    error = %err,
                    "provider fault, demoting and retrying next candidate"
                );
                // release the broken binding before activating the next
                state.bound = None;
                state.demoted.insert(failed);

                let next = self.ensure_bound(&mut state)?;
                op(next).await
            }
            Err(err) => Err(err),
        }
    }

    /// Current bound engine name, without triggering resolution.
    pub async fn bound_name(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.bound.as_ref().map(|p| p.name().to_string())
    }

    /// Clear demotions and re-resolve from scratch.
    ///
    /// This is the only way demoted providers return to eligibility; there
    /// is deliberately no automatic health-recovery polling.
    pub async fn reload(&self) -> ResolutionRecord {
        let mut state = self.state.lock().await;
        info!(role = %self.role, "reloading engine binding");

        // release the previous binding before re-resolving
        state.bound = None;
        state.demoted.clear();
        state.exhausted = false;

        let (record, provider) =
            self.resolver
                .resolve_filtered(self.role, &self.candidates, &state.demoted);
        state.exhausted = provider.is_none();
        state.bound = provider;
        record
    }

    /// Last resolution outcome for this role.
    pub fn status(&self) -> Option<ResolutionRecord> {
        self.resolver.last_record(self.role)
    }

    fn ensure_bound(&self, state: &mut BindState) -> Result<EngineProvider> {
        if let Some(provider) = &state.bound {
            return Ok(provider.clone());
        }

        if state.exhausted {
            // report unavailability on every call until a manual reload;
            // re-probing a missing dependency each call would waste cycles
            return Err(self.unavailable());
        }

        let (record, provider) =
            self.resolver
                .resolve_filtered(self.role, &self.candidates, &state.demoted);

        match provider {
            Some(provider) => {
                state.bound = Some(provider.clone());
                Ok(provider)
            }
            None => {
                state.exhausted = true;
                Err(VoiceError::EngineUnavailable {
                    role: self.role,
                    record: Box::new(record),
                })
            }
        }
    }

    fn unavailable(&self) -> VoiceError {
        let record = self.resolver.last_record(self.role).unwrap_or_else(|| {
            ResolutionRecord {
                role: self.role,
                attempted: self.candidates.clone(),
                selected: None,
                failures: Vec::new(),
                resolved_at: Utc::now(),
            }
        });
        VoiceError::EngineUnavailable {
            role: self.role,
            record: Box::new(record),
        }
    }
}
