//! Global and per-hook dispatch configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use rimuru_core::config::{HookOverrideConfig, HooksConfig};

use super::definitions::Hook;
use crate::error::{EngineResult, HookError};

/// Complete dispatch configuration for one hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Per-handler time budget in milliseconds.
    pub timeout_ms: u64,
    /// Maximum handlers registered (and invoked) for the hook.
    pub max_handlers: usize,
    /// Invoke handlers concurrently instead of in sequence.
    pub parallel: bool,
}

impl HookConfig {
    /// Returns the per-handler timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Rejects non-positive values.
    pub fn validate(&self) -> EngineResult<()> {
        if self.timeout_ms == 0 {
            return Err(HookError::InvalidConfig(
                "timeout_ms must be positive".into(),
            ));
        }
        if self.max_handlers == 0 {
            return Err(HookError::InvalidConfig(
                "max_handlers must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Applies `o` field by field.
    pub fn merged(&self, o: &HookConfigOverride) -> Self {
        Self {
            timeout_ms: o.timeout_ms.unwrap_or(self.timeout_ms),
            max_handlers: o.max_handlers.unwrap_or(self.max_handlers),
            parallel: o.parallel.unwrap_or(self.parallel),
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_handlers: 32,
            parallel: false,
        }
    }
}

impl From<&HooksConfig> for HookConfig {
    fn from(cfg: &HooksConfig) -> Self {
        Self {
            timeout_ms: cfg.default_timeout_ms,
            max_handlers: cfg.max_handlers,
            parallel: cfg.parallel,
        }
    }
}

/// Per-hook override. Unset fields inherit from the global config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfigOverride {
    /// Timeout override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Handler cap override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_handlers: Option<usize>,
    /// Concurrency mode override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

impl HookConfigOverride {
    /// Sets the timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the handler cap.
    pub fn with_max_handlers(mut self, max_handlers: usize) -> Self {
        self.max_handlers = Some(max_handlers);
        self
    }

    /// Sets the concurrency mode.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Rejects explicitly-set non-positive values.
    pub fn validate(&self) -> EngineResult<()> {
        if self.timeout_ms == Some(0) {
            return Err(HookError::InvalidConfig(
                "timeout_ms must be positive".into(),
            ));
        }
        if self.max_handlers == Some(0) {
            return Err(HookError::InvalidConfig(
                "max_handlers must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl From<&HookOverrideConfig> for HookConfigOverride {
    fn from(cfg: &HookOverrideConfig) -> Self {
        Self {
            timeout_ms: cfg.timeout_ms,
            max_handlers: cfg.max_handlers,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Default)]
struct ConfigState {
    global: HookConfig,
    overrides: HashMap<Hook, HookConfigOverride>,
}

/// Holds the global config and per-hook overrides.
#[derive(Debug, Default)]
pub struct ConfigStore {
    /// Guarded state.
    state: RwLock<ConfigState>,
}

impl ConfigStore {
    /// Creates a store with the given global config.
    pub fn new(global: HookConfig) -> EngineResult<Self> {
        global.validate()?;
        Ok(Self {
            state: RwLock::new(ConfigState {
                global,
                overrides: HashMap::new(),
            }),
        })
    }

    /// Builds a store from the `[hooks]` configuration section.
    pub fn from_config(cfg: &HooksConfig) -> EngineResult<Self> {
        let global = HookConfig::from(cfg);
        global.validate()?;

        let mut overrides = HashMap::with_capacity(cfg.overrides.len());
        for (name, raw) in &cfg.overrides {
            let o = HookConfigOverride::from(raw);
            o.validate()
                .map_err(|e| HookError::InvalidConfig(format!("hooks.overrides.{name}: {e}")))?;
            overrides.insert(Hook::from_name(name), o);
        }

        Ok(Self {
            state: RwLock::new(ConfigState { global, overrides }),
        })
    }

    /// Returns the global config.
    pub async fn global(&self) -> HookConfig {
        self.state.read().await.global
    }

    /// Replaces the global config.
    pub async fn set_global(&self, config: HookConfig) -> EngineResult<()> {
        config.validate()?;
        self.state.write().await.global = config;
        info!(
            timeout_ms = config.timeout_ms,
            max_handlers = config.max_handlers,
            parallel = config.parallel,
            "Global hook config updated"
        );
        Ok(())
    }

    /// Sets the override for one hook, replacing any previous one.
    pub async fn set_override(&self, hook: Hook, o: HookConfigOverride) -> EngineResult<()> {
        o.validate()?;
        info!(
            hook = %hook,
            timeout_ms = ?o.timeout_ms,
            max_handlers = ?o.max_handlers,
            parallel = ?o.parallel,
            "Hook config override set"
        );
        self.state
            .write()
            .await
            .overrides
            .insert(hook.normalized(), o);
        Ok(())
    }

    /// Removes the override for one hook.
    pub async fn clear_override(&self, hook: &Hook) -> Option<HookConfigOverride> {
        self.state.write().await.overrides.remove(&hook.normalized())
    }

    /// Returns the override for one hook, if set.
    pub async fn override_for(&self, hook: &Hook) -> Option<HookConfigOverride> {
        self.state
            .read()
            .await
            .overrides
            .get(&hook.normalized())
            .copied()
    }

    /// Returns all overrides sorted by hook name.
    pub async fn overrides(&self) -> Vec<(Hook, HookConfigOverride)> {
        let state = self.state.read().await;
        let mut all: Vec<_> = state
            .overrides
            .iter()
            .map(|(hook, o)| (hook.clone(), *o))
            .collect();
        all.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        all
    }

    /// Effective config for `hook`: its override merged over the global.
    pub async fn resolve(&self, hook: &Hook) -> HookConfig {
        let state = self.state.read().await;
        match state.overrides.get(&hook.normalized()) {
            Some(o) => state.global.merged(o),
            None => state.global,
        }
    }
}
