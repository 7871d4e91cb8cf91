//! Availability validation
//!
//! Answers "is this provider usable right now" without invoking its
//! primary function. The probe runs on a helper thread under a bounded
//! time budget: a hung probe is abandoned and reported as a timeout, never
//! allowed to stall resolution. A probe that panics is contained and
//! classified as a probe failure. Validation results are data for the
//! resolver, never fatal to the process.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::DEFAULT_PROBE_TIMEOUT;
use crate::engine::traits::{EngineProvider, ProbeError};

/// Why a candidate was passed over during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FailureReason {
    /// Name unknown to the registry
    NotRegistered,
    /// Required library, binary or credential absent
    DependencyMissing(String),
    /// Configured model or data file path does not exist
    ResourceMissing(String),
    /// The provider's own self-check failed
    ProbeFailed(String),
    /// Probe exceeded the validator's time budget
    Timeout,
    /// Previously demoted after a runtime fault; only reload restores it
    Demoted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRegistered => write!(f, "not registered"),
            Self::DependencyMissing(name) => write!(f, "missing dependency: {name}"),
            Self::ResourceMissing(path) => write!(f, "missing resource: {path}"),
            Self::ProbeFailed(message) => write!(f, "probe failed: {message}"),
            Self::Timeout => write!(f, "probe timed out"),
            Self::Demoted => write!(f, "demoted after runtime failure"),
        }
    }
}

impl From<ProbeError> for FailureReason {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::MissingDependency { name } => Self::DependencyMissing(name),
            ProbeError::MissingResource { path } => {
                Self::ResourceMissing(path.display().to_string())
            }
            ProbeError::Failed { message } => Self::ProbeFailed(message),
        }
    }
}

/// Outcome of validating one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub ok: bool,
    pub reason: Option<FailureReason>,
}

impl Validation {
    pub fn passed() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }
}

/// Probes provider availability under a time budget.
#[derive(Debug, Clone)]
pub struct Validator {
    timeout: Duration,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the provider's probe, classified and bounded.
    ///
    /// On timeout the helper thread is detached, not killed; probes are
    /// required to be side-effect-free so an abandoned one cannot corrupt
    /// shared state.
    pub fn validate(&self, provider: &EngineProvider) -> Validation {
        let (tx, rx) = mpsc::channel();
        let probed = provider.clone();

        let spawned = thread::Builder::new()
            .name(format!("probe-{}", provider.name()))
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(|| probed.as_engine().probe()));
                let _ = tx.send(outcome);
            });

        if let Err(err) = spawned {
            return Validation::failed(FailureReason::ProbeFailed(format!(
                "failed to spawn probe thread: {err}"
            )));
        }

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(Ok(()))) => Validation::passed(),
            Ok(Ok(Err(probe_err))) => Validation::failed(probe_err.into()),
            Ok(Err(panic)) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "probe panicked".to_string());
                Validation::failed(FailureReason::ProbeFailed(message))
            }
            Err(_) => {
                warn!(
                    engine = provider.name(),
                    budget_ms = self.timeout.as_millis() as u64,
                    "availability probe timed out"
                );
                Validation::failed(FailureReason::Timeout)
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
