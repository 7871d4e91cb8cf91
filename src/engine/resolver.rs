//! Fallback resolution
//!
//! Turns a `(role, candidates)` pair into a bound provider with a full
//! audit trail. The algorithm is deterministic: strict left-to-right
//! priority, duplicates collapsed keeping the first occurrence, no
//! parallel racing. Engines differ wildly in resource cost, so racing
//! fallbacks would double-pay expensive loads and complicate cleanup;
//! strict ordering also makes every selection reproducible.
//!
//! The resolver never retries on its own schedule. A fully failed
//! resolution stays failed until an explicit reload or a later call after
//! configuration changed.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::descriptor::EngineRole;
use crate::engine::registry::EngineRegistry;
use crate::engine::traits::EngineProvider;
use crate::engine::validator::{FailureReason, Validator};

/// Resolution attempts retained per role for diagnostics.
pub const RECORD_HISTORY_LIMIT: usize = 8;

/// Audit record of one resolution attempt. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub role: EngineRole,
    /// Candidate names in the exact order they were tried
    pub attempted: Vec<String>,
    /// Winning candidate, if any
    pub selected: Option<String>,
    /// Per-candidate failure reasons, in attempt order
    pub failures: Vec<(String, FailureReason)>,
    pub resolved_at: DateTime<Utc>,
}

impl ResolutionRecord {
    pub fn is_failure(&self) -> bool {
        self.selected.is_none()
    }

    /// Failure reason recorded for a candidate, if it failed.
    pub fn failure_reason(&self, name: &str) -> Option<&FailureReason> {
        self.failures
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, reason)| reason)
    }
}

/// Equality ignores the timestamp: two attempts over an unchanged
/// environment are the same resolution.
impl PartialEq for ResolutionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role
            && self.attempted == other.attempted
            && self.selected == other.selected
            && self.failures == other.failures
    }
}

/// Collapse `[primary] + fallbacks` into a deduplicated candidate list.
///
/// A primary repeated in the fallbacks is a configuration mistake, but a
/// tolerated one: the first occurrence wins.
pub fn candidate_order(primary: &str, fallbacks: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::with_capacity(1 + fallbacks.len());
    for name in std::iter::once(primary).chain(fallbacks.iter().map(String::as_str)) {
        if seen.insert(name.to_string()) {
            ordered.push(name.to_string());
        }
    }
    ordered
}

/// Deduplicate an already-assembled candidate list, keeping first
/// occurrences.
pub fn dedup_candidates(candidates: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|name| seen.insert((*name).clone()))
        .cloned()
        .collect()
}

/// Resolves role candidates against the registry, one role at a time.
pub struct FallbackResolver {
    registry: Arc<EngineRegistry>,
    validator: Validator,
    history: Mutex<HashMap<EngineRole, VecDeque<ResolutionRecord>>>,
}

impl FallbackResolver {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self::with_validator(registry, Validator::new())
    }

    pub fn with_validator(registry: Arc<EngineRegistry>, validator: Validator) -> Self {
        Self {
            registry,
            validator,
            history: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// Resolve the first registered, valid candidate.
    pub fn resolve(
        &self,
        role: EngineRole,
        candidates: &[String],
    ) -> (ResolutionRecord, Option<EngineProvider>) {
        self.resolve_filtered(role, candidates, &HashSet::new())
    }

    /// Resolve while skipping demoted names.
    ///
    /// Demoted candidates still appear in the record (reason `Demoted`) so
    /// a runtime demotion is visible in `status` output for the rest of
    /// the process.
    pub fn resolve_filtered(
        &self,
        role: EngineRole,
        candidates: &[String],
        demoted: &HashSet<String>,
    ) -> (ResolutionRecord, Option<EngineProvider>) {
        let ordered = dedup_candidates(candidates);
        let mut failures = Vec::new();
        let mut selected = None;
        let mut bound = None;

        for name in &ordered {
            if demoted.contains(name) {
                debug!(role = %role, engine = %name, "skipping demoted candidate");
                failures.push((name.clone(), FailureReason::Demoted));
                continue;
            }

            let provider = match self.registry.lookup(role, name) {
                Some(provider) => provider,
                None => {
                    debug!(role = %role, engine = %name, "candidate not registered");
                    failures.push((name.clone(), FailureReason::NotRegistered));
                    continue;
                }
            };

            let validation = self.validator.validate(&provider);
            match validation.reason {
                None => {
                    info!(role = %role, engine = %name, "resolved engine");
                    selected = Some(name.clone());
                    bound = Some(provider);
                    break;
                }
                Some(reason) => {
                    debug!(role = %role, engine = %name, reason = %reason, "candidate failed validation");
                    failures.push((name.clone(), reason));
                }
            }
        }

        if selected.is_none() {
            warn!(role = %role, candidates = ordered.len(), "resolution exhausted all candidates");
        }

        let record = ResolutionRecord {
            role,
            attempted: ordered,
            selected,
            failures,
            resolved_at: Utc::now(),
        };
        self.push_record(record.clone());

        (record, bound)
    }

    fn push_record(&self, record: ResolutionRecord) {
        if let Ok(mut history) = self.history.lock() {
            let entries = history.entry(record.role).or_default();
            if entries.len() == RECORD_HISTORY_LIMIT {
                entries.pop_front();
            }
            entries.push_back(record);
        }
    }

    /// Most recent resolution outcome for a role.
    pub fn last_record(&self, role: EngineRole) -> Option<ResolutionRecord> {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.get(&role).and_then(|entries| entries.back().cloned()))
    }

    /// Bounded record history for a role, oldest first.
    pub fn history(&self, role: EngineRole) -> Vec<ResolutionRecord> {
        self.history
            .lock()
            .map(|history| {
                history
                    .get(&role)
                    .map(|entries| entries.iter().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order_dedups_keeping_first() {
        let fallbacks = vec![
            "coqui_tts".to_string(),
            "mms_tts".to_string(),
            "piper_tts".to_string(),
            "coqui_tts".to_string(),
        ];
        assert_eq!(
            candidate_order("mms_tts", &fallbacks),
            vec!["mms_tts", "coqui_tts", "piper_tts"]
        );
    }

    #[test]
    fn test_record_equality_ignores_timestamp() {
        let base = ResolutionRecord {
            role: EngineRole::Tts,
            attempted: vec!["a".to_string()],
            selected: Some("a".to_string()),
            failures: Vec::new(),
            resolved_at: Utc::now(),
        };
        let later = ResolutionRecord {
            resolved_at: Utc::now() + chrono::Duration::seconds(60),
            ..base.clone()
        };
        assert_eq!(base, later);
    }
}
