//! Hook manager: the engine's external interface.
//!
//! Owns the registry, config store, recorder, and dispatcher. Construct
//! one per application context and pass it by reference.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use rimuru_core::config::HooksConfig;
use rimuru_core::events::PluginInfo;
use rimuru_core::types::CorrelationId;

use crate::error::{EngineResult, HookError};
use crate::handler::HookHandler;
use crate::hooks::config::{ConfigStore, HookConfig, HookConfigOverride};
use crate::hooks::definitions::{Hook, HookContext, HookData};
use crate::hooks::dispatcher::{DispatchOutcome, HookDispatcher};
use crate::hooks::recorder::{ExecutionRecorder, HookExecution};
use crate::hooks::registry::{HandlerInfo, HandlerRegistration, HookRegistry};

/// Response to [`HookManager::trigger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerResponse {
    /// `false` when a handler aborted.
    pub success: bool,
    /// Handlers invoked.
    pub handlers_executed: usize,
    /// Whether a handler vetoed the event.
    pub aborted: bool,
    /// The veto reason.
    pub abort_reason: Option<String>,
    /// Correlation id of the dispatch; matches its execution records.
    pub execution_id: CorrelationId,
    /// Payload after modifications.
    pub final_data: HookData,
}

impl From<DispatchOutcome> for TriggerResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            success: !outcome.aborted,
            handlers_executed: outcome.executed_count,
            aborted: outcome.aborted,
            abort_reason: outcome.abort_reason,
            execution_id: outcome.correlation_id,
            final_data: outcome.final_data,
        }
    }
}

/// Hook type listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookTypeInfo {
    /// Hook name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Payload kind carried by the hook.
    pub data_type: String,
    /// Registered handlers.
    pub handler_count: usize,
    /// Whether at least one handler is enabled.
    pub enabled: bool,
    /// Last dispatch time.
    pub last_triggered: Option<DateTime<Utc>>,
}

/// Engine-wide statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookStats {
    /// Hooks with at least one registered handler.
    pub total_hook_types: usize,
    /// Enabled handlers.
    pub active_handlers: usize,
    /// All registered handlers.
    pub total_handlers: usize,
    /// Executions recorded since start.
    pub total_executions: u64,
    /// Success and Skipped executions.
    pub successful_executions: u64,
    /// Failure and Timeout executions.
    pub failed_executions: u64,
    /// Aborted executions.
    pub aborted_executions: u64,
}

/// Registers handlers, fires hooks, and answers listing/stat queries.
#[derive(Debug)]
pub struct HookManager {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Configuration store.
    config: Arc<ConfigStore>,
    /// Execution history.
    recorder: Arc<ExecutionRecorder>,
    /// Hook dispatcher.
    dispatcher: HookDispatcher,
    /// Last dispatch time per hook.
    last_triggered: RwLock<HashMap<Hook, DateTime<Utc>>>,
    /// Loaded plugins, id → name.
    plugins: RwLock<HashMap<String, String>>,
}

impl HookManager {
    /// Creates a manager with default configuration.
    pub fn new() -> Self {
        Self::with_parts(ConfigStore::default(), ExecutionRecorder::default())
    }

    /// Creates a manager from the `[hooks]` configuration section.
    pub fn from_config(cfg: &HooksConfig) -> EngineResult<Self> {
        let config = ConfigStore::from_config(cfg)?;
        let recorder = ExecutionRecorder::new(cfg.history_capacity)?;
        Ok(Self::with_parts(config, recorder))
    }

    /// Creates a manager from prebuilt parts.
    pub fn with_parts(config: ConfigStore, recorder: ExecutionRecorder) -> Self {
        let registry = Arc::new(HookRegistry::new());
        let config = Arc::new(config);
        let recorder = Arc::new(recorder);
        let dispatcher =
            HookDispatcher::new(registry.clone(), config.clone(), recorder.clone());

        Self {
            registry,
            config,
            recorder,
            dispatcher,
            last_triggered: RwLock::new(HashMap::new()),
            plugins: RwLock::new(HashMap::new()),
        }
    }

    // ── Registration ──

    /// Registers one handler under the hook's effective `max_handlers`.
    pub async fn register(&self, registration: HandlerRegistration) -> EngineResult<()> {
        let max = self.config.resolve(&registration.hook).await.max_handlers;
        self.registry.register(registration, max).await
    }

    /// Registers `handler` under `id` with the handler's own metadata.
    pub async fn register_handler(
        &self,
        id: impl Into<String>,
        handler: Arc<dyn HookHandler>,
    ) -> EngineResult<()> {
        self.register(HandlerRegistration::new(id, handler)).await
    }

    /// Removes one handler.
    pub async fn unregister(&self, id: &str) -> EngineResult<HandlerInfo> {
        self.registry.unregister(id).await
    }

    /// Registers all of a plugin's handlers at once, then fires
    /// [`Hook::OnPluginLoaded`]. Nothing is registered if any handler is
    /// rejected.
    pub async fn register_plugin(
        &self,
        plugin_id: &str,
        plugin_name: &str,
        registrations: Vec<HandlerRegistration>,
    ) -> EngineResult<usize> {
        if plugin_id.trim().is_empty() {
            return Err(HookError::InvalidRegistration(
                "plugin id must not be empty".into(),
            ));
        }
        if self.plugins.read().await.contains_key(plugin_id) {
            return Err(HookError::DuplicateId(plugin_id.to_string()));
        }

        let registrations: Vec<HandlerRegistration> = registrations
            .into_iter()
            .map(|r| r.with_plugin(plugin_id))
            .collect();

        let mut limits = HashMap::new();
        for reg in &registrations {
            if !limits.contains_key(&reg.hook) {
                let max = self.config.resolve(&reg.hook).await.max_handlers;
                limits.insert(reg.hook.clone(), max);
            }
        }

        let count = registrations.len();
        self.registry
            .register_all(registrations, |hook| limits.get(hook).copied().unwrap_or(0))
            .await?;
        self.plugins
            .write()
            .await
            .insert(plugin_id.to_string(), plugin_name.to_string());

        info!(
            plugin_id = %plugin_id,
            name = %plugin_name,
            handlers = count,
            "Plugin hooks registered"
        );

        self.announce(Hook::OnPluginLoaded, plugin_id, plugin_name)
            .await;
        Ok(count)
    }

    /// Removes every handler of a plugin, then fires
    /// [`Hook::OnPluginUnloaded`].
    pub async fn unregister_plugin(&self, plugin_id: &str) -> Vec<HandlerInfo> {
        let removed = self.registry.unregister_plugin(plugin_id).await;
        let name = self.plugins.write().await.remove(plugin_id);

        if name.is_some() || !removed.is_empty() {
            self.announce(
                Hook::OnPluginUnloaded,
                plugin_id,
                name.as_deref().unwrap_or_default(),
            )
            .await;
        }
        removed
    }

    async fn announce(&self, hook: Hook, plugin_id: &str, plugin_name: &str) {
        let data = HookData::Plugin(PluginInfo {
            id: plugin_id.to_string(),
            name: plugin_name.to_string(),
        });
        if let Err(e) = self.fire(hook.clone(), data, "plugin-host").await {
            warn!(hook = %hook, plugin_id = %plugin_id, error = %e, "Plugin lifecycle hook failed");
        }
    }

    // ── Dispatch ──

    /// Fires a hook by name with optional JSON data.
    ///
    /// Unknown names become custom hooks. `data` is decoded into the
    /// payload the hook expects; `None` sends an empty payload.
    pub async fn trigger(
        &self,
        hook_name: &str,
        data: Option<Value>,
        source: Option<&str>,
    ) -> EngineResult<TriggerResponse> {
        let hook = Hook::from_name(hook_name);
        if hook.as_str().is_empty() {
            return Err(HookError::InvalidPayload {
                hook: String::new(),
                reason: "hook name must not be empty".into(),
            });
        }

        let data = HookData::from_json(&hook, data.unwrap_or(Value::Null))?;
        let ctx = HookContext::new(hook, data)
            .with_source(source.unwrap_or(HookContext::DEFAULT_SOURCE));

        let outcome = self.execute(ctx).await?;
        Ok(TriggerResponse::from(outcome))
    }

    /// Fires a hook with a typed payload.
    pub async fn fire(
        &self,
        hook: Hook,
        data: HookData,
        source: &str,
    ) -> EngineResult<DispatchOutcome> {
        self.execute(HookContext::new(hook, data).with_source(source))
            .await
    }

    /// Dispatches a prepared context.
    ///
    /// The fire time is remembered for lifecycle hooks and for custom hooks
    /// that have handlers or a config override.
    pub async fn execute(&self, ctx: HookContext) -> EngineResult<DispatchOutcome> {
        let hook = ctx.hook.normalized();
        let fired_at = ctx.timestamp;
        let outcome = self.dispatcher.execute(ctx).await?;
        if self.is_known(&hook).await {
            self.last_triggered.write().await.insert(hook, fired_at);
        }
        Ok(outcome)
    }

    async fn is_known(&self, hook: &Hook) -> bool {
        !hook.is_custom()
            || self.registry.handler_counts(hook).await.0 > 0
            || self.config.override_for(hook).await.is_some()
    }

    // ── Queries ──

    /// Lists the lifecycle hooks followed by every custom hook that has
    /// handlers, an override, or has been fired.
    pub async fn list_hook_types(&self) -> Vec<HookTypeInfo> {
        let mut custom: BTreeSet<Hook> = self
            .registry
            .registered_hooks()
            .await
            .into_iter()
            .filter(Hook::is_custom)
            .collect();
        custom.extend(
            self.config
                .overrides()
                .await
                .into_iter()
                .map(|(hook, _)| hook)
                .filter(Hook::is_custom),
        );
        let last_triggered = self.last_triggered.read().await.clone();
        custom.extend(last_triggered.keys().filter(|h| h.is_custom()).cloned());

        let mut types = Vec::with_capacity(11 + custom.len());
        for hook in Hook::builtin().into_iter().chain(custom) {
            let (handler_count, enabled_count) = self.registry.handler_counts(&hook).await;
            types.push(HookTypeInfo {
                name: hook.to_string(),
                description: hook.description().to_string(),
                data_type: hook.data_type().to_string(),
                handler_count,
                enabled: enabled_count > 0,
                last_triggered: last_triggered.get(&hook).copied(),
            });
        }
        types
    }

    /// Lists handlers, optionally only those of one hook.
    pub async fn list_handlers(&self, hook_type: Option<&str>) -> Vec<HandlerInfo> {
        let hook = hook_type.map(Hook::from_name);
        self.registry.list(hook.as_ref()).await
    }

    /// Lists executions most recent first.
    pub async fn list_executions(
        &self,
        hook_type: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<HookExecution> {
        let hook = hook_type.map(Hook::from_name);
        self.recorder.query(hook.as_ref(), limit).await
    }

    /// Returns the executions of one dispatch.
    pub async fn executions_for(&self, execution_id: CorrelationId) -> Vec<HookExecution> {
        self.recorder.by_correlation(execution_id).await
    }

    /// Returns engine statistics.
    pub async fn get_stats(&self) -> HookStats {
        let counts = self.registry.counts().await;
        let counters = self.recorder.counters().await;
        HookStats {
            total_hook_types: counts.hook_types,
            active_handlers: counts.active_handlers,
            total_handlers: counts.total_handlers,
            total_executions: counters.total,
            successful_executions: counters.successful,
            failed_executions: counters.failed,
            aborted_executions: counters.aborted,
        }
    }

    // ── Administration ──

    /// Enables a handler.
    pub async fn enable_handler(&self, id: &str) -> EngineResult<bool> {
        self.registry.enable(id).await?;
        Ok(true)
    }

    /// Disables a handler; it stays listed but is no longer invoked.
    pub async fn disable_handler(&self, id: &str) -> EngineResult<bool> {
        self.registry.disable(id).await?;
        Ok(true)
    }

    /// Replaces the global config.
    pub async fn set_global_config(&self, config: HookConfig) -> EngineResult<()> {
        self.config.set_global(config).await
    }

    /// Sets the override for one hook.
    pub async fn set_config(&self, hook: Hook, config: HookConfigOverride) -> EngineResult<()> {
        self.config.set_override(hook, config).await
    }

    /// Removes the override for one hook so it follows the global config
    /// again. Returns the removed override.
    pub async fn clear_config(&self, hook: &Hook) -> Option<HookConfigOverride> {
        self.config.clear_override(hook).await
    }

    /// Returns the global config.
    pub async fn global_config(&self) -> HookConfig {
        self.config.global().await
    }

    /// Returns the effective config for one hook.
    pub async fn config_for(&self, hook: &Hook) -> HookConfig {
        self.config.resolve(hook).await
    }

    /// Returns the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Returns the execution recorder.
    pub fn recorder(&self) -> &Arc<ExecutionRecorder> {
        &self.recorder
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &HookDispatcher {
        &self.dispatcher
    }
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new()
    }
}
