//! Telemetry configuration from environment variables.

use std::env;

/// Where formatted log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stdout,
    /// Used by the worker process, whose stdout carries replies.
    Stderr,
}

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    pub target: LogTarget,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "caterer".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            target: LogTarget::Stdout,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CATERER_SERVICE_NAME`: Service name (default: caterer)
    /// - `CATERER_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CATERER_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CATERER_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("CATERER_SERVICE_NAME")
                .unwrap_or_else(|_| "caterer".to_string()),

            log_level: env::var("CATERER_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("CATERER_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("CATERER_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            target: LogTarget::Stdout,
        }
    }

    /// Configuration for a named component writing to `target`.
    pub fn for_component(name: &str, target: LogTarget) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("caterer-{name}");
        config.target = target;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "caterer");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.target, LogTarget::Stdout);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_for_component() {
        let config = TelemetryConfig::for_component("worker", LogTarget::Stderr);
        assert_eq!(config.service_name, "caterer-worker");
        assert_eq!(config.target, LogTarget::Stderr);
    }
}
