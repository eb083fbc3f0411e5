//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional TOML file overlaid with `RIMURU__`-prefixed environment
//! variables. Each sub-module represents a logical configuration section,
//! and every field has a default so a missing file is not an error.

pub mod builtin;
pub mod hooks;
pub mod logging;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::builtin::{
    BuiltinHandlersConfig, CostAlertConfig, MetricsExportConfig, SessionLogConfig,
    SessionLogFormat,
};
pub use self::hooks::{HookOverrideConfig, HooksConfig};
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hook engine settings.
    #[serde(default)]
    #[validate(nested)]
    pub hooks: HooksConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Built-in handler settings.
    #[serde(default)]
    #[validate(nested)]
    pub builtin: BuiltinHandlersConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables prefixed with `RIMURU`
    /// and using `__` as the section separator override file values, e.g.
    /// `RIMURU__HOOKS__DEFAULT_TIMEOUT_MS=2000`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("RIMURU")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Parse configuration from a TOML string (no environment overlay).
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config.hooks.default_timeout_ms, 5000);
        assert_eq!(config.hooks.history_capacity, 1000);
        assert!(!config.hooks.parallel);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides_parse() {
        let toml = r#"
            [hooks]
            default_timeout_ms = 250

            [hooks.overrides.on_metrics_collected]
            parallel = true

            [hooks.overrides.my_custom_event]
            timeout_ms = 50
            max_handlers = 2
        "#;

        let config = AppConfig::from_toml_str(toml).expect("valid config");
        assert_eq!(config.hooks.default_timeout_ms, 250);

        let metrics = &config.hooks.overrides["on_metrics_collected"];
        assert_eq!(metrics.parallel, Some(true));
        assert_eq!(metrics.timeout_ms, None);

        let custom = &config.hooks.overrides["my_custom_event"];
        assert_eq!(custom.timeout_ms, Some(50));
        assert_eq!(custom.max_handlers, Some(2));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml = "[hooks]\ndefault_timeout_ms = 0\n";
        let err = AppConfig::from_toml_str(toml).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
        assert!(err.message.contains("default_timeout_ms"));
    }

    #[test]
    fn test_nested_override_rejected() {
        let toml = r#"
            [hooks.overrides.deploy]
            max_handlers = 0
        "#;
        let err = AppConfig::from_toml_str(toml).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_negative_cost_threshold_rejected() {
        let toml = "[builtin.cost_alert]\nthreshold_usd = -5.0\n";
        let err = AppConfig::from_toml_str(toml).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
