//! Engine registry
//!
//! The registry is the single place that maps (role, name) to a typed
//! engine instance. Discovery is an external concern: a loader feeds
//! entries in through [`EngineRegistry::register`] at startup. Names are
//! never silently overwritten and registration order is preserved for
//! diagnostics (it is never used for resolution order).

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::EngineRole;
use crate::engine::traits::EngineProvider;

#[derive(Default)]
struct RoleTable {
    providers: HashMap<String, EngineProvider>,
    /// Registration order, for `list_names`
    order: Vec<String>,
}

/// Per-role mapping from engine name to provider instance.
pub struct EngineRegistry {
    roles: RwLock<HashMap<EngineRole, RoleTable>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// Register a provider under its descriptor's role and name.
    ///
    /// Fails with [`VoiceError::DuplicateName`] if the name is already
    /// taken for that role; the existing entry is left intact.
    pub fn register(&self, provider: EngineProvider) -> Result<()> {
        let role = provider.role();
        let name = provider.name().to_string();

        if provider.descriptor().role != role {
            return Err(VoiceError::config(format!(
                "engine '{}' declares role {} but was constructed as {}",
                name,
                provider.descriptor().role,
                role
            )));
        }

        let mut roles = self.roles.write().map_err(|_| {
            VoiceError::internal("failed to acquire write lock on engine registry")
        })?;
        let table = roles.entry(role).or_default();

        if table.providers.contains_key(&name) {
            return Err(VoiceError::DuplicateName { role, name });
        }

        debug!(role = %role, engine = %name, "registered engine");
        table.order.push(name.clone());
        table.providers.insert(name, provider);
        Ok(())
    }

    /// Look up a provider by role and name. Pure, no side effects.
    pub fn lookup(&self, role: EngineRole, name: &str) -> Option<EngineProvider> {
        self.roles
            .read()
            .ok()
            .and_then(|roles| roles.get(&role).and_then(|t| t.providers.get(name).cloned()))
    }

    pub fn is_registered(&self, role: EngineRole, name: &str) -> bool {
        self.lookup(role, name).is_some()
    }

    /// Names registered for a role, in registration order.
    ///
    /// Diagnostics only; resolution order always comes from configuration.
    pub fn list_names(&self, role: EngineRole) -> Vec<String> {
        self.roles
            .read()
            .map(|roles| roles.get(&role).map(|t| t.order.clone()).unwrap_or_default())
            .unwrap_or_default()
    }

    /// Every registered (role, provider) pair, roles in [`EngineRole::ALL`]
    /// order, names in registration order.
    pub fn all_providers(&self) -> Vec<EngineProvider> {
        let mut providers = Vec::new();
        for role in EngineRole::ALL {
            for name in self.list_names(role) {
                if let Some(provider) = self.lookup(role, &name) {
                    providers.push(provider);
                }
            }
        }
        providers
    }

    /// Number of providers registered for a role.
    pub fn count(&self, role: EngineRole) -> usize {
        self.roles
            .read()
            .map(|roles| roles.get(&role).map(|t| t.order.len()).unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global engine registry
static REGISTRY: once_cell::sync::Lazy<EngineRegistry> =
    once_cell::sync::Lazy::new(EngineRegistry::new);

/// Get the process-wide default registry.
pub fn global_registry() -> &'static EngineRegistry {
    &REGISTRY
}
