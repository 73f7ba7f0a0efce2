//! calfeed configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the config file
//! (`~/.config/calfeed/config.toml` unless a path is given), and
//! `CALFEED__*` environment variables (`CALFEED__SERVER__PORT=8080`).

use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

use crate::error::{CalfeedError, CalfeedResult};
use crate::feed::{FeedConfig, StaticFeed};
use crate::registry::{FailurePolicy, ListenerRegistry};

#[derive(Debug, Clone, Deserialize)]
pub struct CalfeedConfig {
    pub server: ServerConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    pub failure_policy: FailurePolicy,
    /// Upper bound on one query's dispatch, enforced by the server
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl CalfeedConfig {
    pub fn config_path() -> CalfeedResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalfeedError::Config("Could not determine config directory".into()))?
            .join("calfeed");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the per-user config file if it exists.
    pub fn load(path: Option<&Path>) -> CalfeedResult<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::config_path()?).required(false),
        };

        Self::build(Self::defaults()?.add_source(file))
    }

    /// Load from TOML text, still layering defaults and environment.
    pub fn from_toml_str(toml: &str) -> CalfeedResult<Self> {
        Self::build(Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn defaults() -> CalfeedResult<ConfigBuilder<DefaultState>> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")
            .and_then(|b| b.set_default("server.port", 4096))
            .and_then(|b| b.set_default("dispatch.failure_policy", "abort"))
            .and_then(|b| b.set_default("dispatch.timeout_secs", 10))
            .and_then(|b| b.set_default("logging.level", "info"))
            .map_err(|e| CalfeedError::Config(e.to_string()))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> CalfeedResult<Self> {
        builder
            .add_source(
                Environment::with_prefix("CALFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CalfeedError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalfeedError::Config(e.to_string()))
    }

    /// A registry holding one [`StaticFeed`] per `[[feeds]]` entry, in file
    /// order, with the configured failure policy.
    pub fn build_registry(&self) -> CalfeedResult<ListenerRegistry> {
        let mut registry = ListenerRegistry::with_policy(self.dispatch.failure_policy);

        for feed in &self.feeds {
            registry.register(StaticFeed::from_config(feed)?);
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_empty_file() {
        let config = CalfeedConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4096);
        assert_eq!(config.dispatch.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.dispatch.timeout_secs, 10);
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn test_feeds_become_listeners_in_order() {
        let config = CalfeedConfig::from_toml_str(
            r##"
[dispatch]
failure_policy = "isolate"

[[feeds]]
name = "holidays"
color = "#aa0000"

[[feeds.events]]
title = "Holiday"
start = "2024-03-05"
all_day = true

[[feeds]]
name = "meetings"

[[feeds.events]]
id = 42
title = "Standup"
start = "2024-03-04T09:00:00+00:00"
end = "2024-03-04T09:30:00+00:00"
"##,
        )
        .unwrap();

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.policy(), FailurePolicy::Isolate);
        assert_eq!(registry.listener_names(), vec!["holidays", "meetings"]);
    }

    #[test]
    fn test_bad_feed_event_fails_registry_build() {
        let config = CalfeedConfig::from_toml_str(
            r#"
[[feeds]]
name = "broken"

[[feeds.events]]
title = "No end"
start = "2024-03-04T09:00:00+00:00"
"#,
        )
        .unwrap();

        assert!(matches!(config.build_registry(), Err(CalfeedError::Config(_))));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = CalfeedConfig::from_toml_str("[dispatch]\nfailure_policy = \"retry\"\n")
            .unwrap_err();
        assert!(matches!(err, CalfeedError::Config(_)));
    }

    #[test]
    fn test_environment_overrides_file() {
        // No other test reads `logging.level`.
        unsafe { std::env::set_var("CALFEED__LOGGING__LEVEL", "debug") };
        let config = CalfeedConfig::from_toml_str("[logging]\nlevel = \"warn\"\n");
        unsafe { std::env::remove_var("CALFEED__LOGGING__LEVEL") };

        assert_eq!(config.unwrap().logging.level, "debug");
    }
}
