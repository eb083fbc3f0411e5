//! Hook registry: handlers registered per hook, ordered by priority.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use super::definitions::Hook;
use crate::error::{EngineResult, HookError};
use crate::handler::HookHandler;

/// A handler bound to a hook, plus its registry metadata.
#[derive(Clone)]
pub struct HandlerRegistration {
    /// Unique handler id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hook the handler is bound to, taken from the handler.
    pub(crate) hook: Hook,
    /// Priority (higher runs first).
    pub priority: i32,
    /// Disabled handlers stay listed but are skipped during dispatch.
    pub enabled: bool,
    /// Owning plugin, if any.
    pub plugin_id: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The invokable handler.
    pub handler: Arc<dyn HookHandler>,
}

impl std::fmt::Debug for HandlerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("hook", &self.hook)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("plugin_id", &self.plugin_id)
            .finish_non_exhaustive()
    }
}

impl HandlerRegistration {
    /// Creates an enabled registration taking name, hook, priority, and
    /// description from the handler.
    pub fn new(id: impl Into<String>, handler: Arc<dyn HookHandler>) -> Self {
        let description = Some(handler.description())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Self {
            id: id.into(),
            name: handler.name().to_string(),
            hook: handler.hook().normalized(),
            priority: handler.priority(),
            enabled: true,
            plugin_id: None,
            description,
            handler,
        }
    }

    /// Hook the handler is bound to.
    pub fn hook(&self) -> &Hook {
        &self.hook
    }

    /// Overrides the handler's own priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the registration as owned by a plugin.
    pub fn with_plugin(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugin_id = Some(plugin_id.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Registers the handler in the disabled state.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns the listing descriptor.
    pub fn info(&self) -> HandlerInfo {
        HandlerInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            hook_type: self.hook.clone(),
            priority: self.priority,
            enabled: self.enabled,
            plugin_id: self.plugin_id.clone(),
            description: self.description.clone(),
        }
    }

    fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(HookError::InvalidRegistration(
                "handler id must not be empty".into(),
            ));
        }
        if self.hook.as_str().is_empty() {
            return Err(HookError::InvalidRegistration(format!(
                "handler '{}' is bound to an unnamed hook",
                self.id
            )));
        }
        Ok(())
    }
}

/// Handler descriptor returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerInfo {
    /// Unique handler id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Bound hook.
    pub hook_type: Hook,
    /// Priority.
    pub priority: i32,
    /// Whether dispatch invokes it.
    pub enabled: bool,
    /// Owning plugin, if any.
    pub plugin_id: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// Registration counts maintained on every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
    /// Hooks with at least one registration.
    pub hook_types: usize,
    /// All registrations.
    pub total_handlers: usize,
    /// Enabled registrations.
    pub active_handlers: usize,
}

#[derive(Debug)]
struct Entry {
    registration: HandlerRegistration,
    /// Registration sequence number, breaks priority ties.
    seq: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    buckets: HashMap<Hook, Vec<Entry>>,
    /// Handler id → hook, for id lookups.
    index: HashMap<String, Hook>,
    next_seq: u64,
    active: usize,
}

impl RegistryState {
    fn entry_mut(&mut self, id: &str) -> EngineResult<&mut Entry> {
        let hook = self
            .index
            .get(id)
            .ok_or_else(|| HookError::NotFound(id.to_string()))?;
        self.buckets
            .get_mut(hook)
            .and_then(|bucket| bucket.iter_mut().find(|e| e.registration.id == id))
            .ok_or_else(|| HookError::NotFound(id.to_string()))
    }

    fn remove(&mut self, id: &str) -> Option<HandlerRegistration> {
        let hook = self.index.remove(id)?;
        let bucket = self.buckets.get_mut(&hook)?;
        let pos = bucket.iter().position(|e| e.registration.id == id)?;
        let removed = bucket.remove(pos).registration;
        if bucket.is_empty() {
            self.buckets.remove(&hook);
        }
        if removed.enabled {
            self.active -= 1;
        }
        Some(removed)
    }
}

/// Registry of hook handlers organized by hook.
///
/// Each bucket is kept sorted by priority descending, then registration
/// order. Mutations take the write lock once, so a failed call leaves the
/// registry untouched.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Guarded state.
    state: RwLock<RegistryState>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one handler, refusing it if the hook already holds
    /// `max_handlers` registrations.
    pub async fn register(
        &self,
        registration: HandlerRegistration,
        max_handlers: usize,
    ) -> EngineResult<()> {
        self.register_all(vec![registration], |_| max_handlers).await
    }

    /// Registers a batch all-or-nothing. `max_handlers` gives the effective
    /// cap for each hook in the batch.
    pub async fn register_all<F>(
        &self,
        registrations: Vec<HandlerRegistration>,
        max_handlers: F,
    ) -> EngineResult<()>
    where
        F: Fn(&Hook) -> usize,
    {
        let mut state = self.state.write().await;

        let mut batch_ids = HashSet::with_capacity(registrations.len());
        let mut added: HashMap<&Hook, usize> = HashMap::new();
        for reg in &registrations {
            reg.validate()?;
            if state.index.contains_key(&reg.id) || !batch_ids.insert(reg.id.as_str()) {
                return Err(HookError::DuplicateId(reg.id.clone()));
            }

            let pending = added.entry(&reg.hook).or_default();
            *pending += 1;
            let existing = state.buckets.get(&reg.hook).map_or(0, Vec::len);
            let max = max_handlers(&reg.hook);
            if existing + *pending > max {
                return Err(HookError::CapacityExceeded {
                    hook: reg.hook.to_string(),
                    max,
                });
            }
        }

        let mut touched = HashSet::new();
        for registration in registrations {
            let seq = state.next_seq;
            state.next_seq += 1;
            if registration.enabled {
                state.active += 1;
            }
            state
                .index
                .insert(registration.id.clone(), registration.hook.clone());

            info!(
                hook = %registration.hook,
                handler_id = %registration.id,
                priority = registration.priority,
                plugin_id = ?registration.plugin_id,
                "Hook handler registered"
            );

            touched.insert(registration.hook.clone());
            state
                .buckets
                .entry(registration.hook.clone())
                .or_default()
                .push(Entry { registration, seq });
        }

        for hook in touched {
            if let Some(bucket) = state.buckets.get_mut(&hook) {
                bucket.sort_by(|a, b| {
                    b.registration
                        .priority
                        .cmp(&a.registration.priority)
                        .then(a.seq.cmp(&b.seq))
                });
            }
        }

        Ok(())
    }

    /// Removes one handler.
    pub async fn unregister(&self, id: &str) -> EngineResult<HandlerInfo> {
        let mut state = self.state.write().await;
        let removed = state
            .remove(id)
            .ok_or_else(|| HookError::NotFound(id.to_string()))?;

        info!(hook = %removed.hook, handler_id = %id, "Hook handler unregistered");
        Ok(removed.info())
    }

    /// Removes every handler owned by `plugin_id`.
    pub async fn unregister_plugin(&self, plugin_id: &str) -> Vec<HandlerInfo> {
        let mut state = self.state.write().await;

        let ids: Vec<String> = state
            .buckets
            .values()
            .flatten()
            .filter(|e| e.registration.plugin_id.as_deref() == Some(plugin_id))
            .map(|e| e.registration.id.clone())
            .collect();

        let removed: Vec<HandlerInfo> = ids
            .iter()
            .filter_map(|id| state.remove(id))
            .map(|r| r.info())
            .collect();

        info!(
            plugin_id = %plugin_id,
            removed = removed.len(),
            "All hooks unregistered for plugin"
        );
        removed
    }

    /// Enables a handler.
    pub async fn enable(&self, id: &str) -> EngineResult<()> {
        self.set_enabled(id, true).await
    }

    /// Disables a handler without removing it.
    pub async fn disable(&self, id: &str) -> EngineResult<()> {
        self.set_enabled(id, false).await
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> EngineResult<()> {
        let mut state = self.state.write().await;
        let entry = state.entry_mut(id)?;
        if entry.registration.enabled == enabled {
            return Ok(());
        }
        entry.registration.enabled = enabled;
        let hook = entry.registration.hook.clone();

        if enabled {
            state.active += 1;
        } else {
            state.active -= 1;
        }

        info!(hook = %hook, handler_id = %id, enabled, "Hook handler toggled");
        Ok(())
    }

    /// Lists handler descriptors. Without a filter, hooks are listed by
    /// name; within a hook, in dispatch order.
    pub async fn list(&self, hook: Option<&Hook>) -> Vec<HandlerInfo> {
        let state = self.state.read().await;
        match hook {
            Some(hook) => state
                .buckets
                .get(&hook.normalized())
                .map(|bucket| bucket.iter().map(|e| e.registration.info()).collect())
                .unwrap_or_default(),
            None => {
                let mut hooks: Vec<&Hook> = state.buckets.keys().collect();
                hooks.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                hooks
                    .into_iter()
                    .flat_map(|h| state.buckets[h].iter().map(|e| e.registration.info()))
                    .collect()
            }
        }
    }

    /// Returns the enabled handlers of `hook` in dispatch order.
    pub async fn enabled_handlers(&self, hook: &Hook) -> Vec<HandlerRegistration> {
        let state = self.state.read().await;
        state
            .buckets
            .get(&hook.normalized())
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|e| e.registration.enabled)
                    .map(|e| e.registration.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns one handler's descriptor.
    pub async fn get(&self, id: &str) -> Option<HandlerInfo> {
        let state = self.state.read().await;
        let hook = state.index.get(id)?;
        state.buckets.get(hook).and_then(|bucket| {
            bucket
                .iter()
                .find(|e| e.registration.id == id)
                .map(|e| e.registration.info())
        })
    }

    /// Returns `(total, enabled)` registrations for `hook`.
    pub async fn handler_counts(&self, hook: &Hook) -> (usize, usize) {
        let state = self.state.read().await;
        state.buckets.get(&hook.normalized()).map_or((0, 0), |bucket| {
            let enabled = bucket.iter().filter(|e| e.registration.enabled).count();
            (bucket.len(), enabled)
        })
    }

    /// Returns every hook with at least one registration.
    pub async fn registered_hooks(&self) -> Vec<Hook> {
        let state = self.state.read().await;
        state.buckets.keys().cloned().collect()
    }

    /// Returns the maintained registration counts.
    pub async fn counts(&self) -> RegistryCounts {
        let state = self.state.read().await;
        RegistryCounts {
            hook_types: state.buckets.len(),
            total_handlers: state.index.len(),
            active_handlers: state.active,
        }
    }
}
