//! Telemetry configuration from environment variables.

use std::env;

use serde::Deserialize;

/// Logging configuration for one node process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Subsystem identifier (`node`, `01`..`03`)
    pub subsystem_id: String,

    /// Log filter directive (`info`, `rum_03_exchange=debug,info`, ...)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// JSON formatted logs instead of the human readable layout
    pub json_logs: bool,

    /// Network name the node joins
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "rum-node".to_string(),
            subsystem_id: "node".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "nevis".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RUM_SERVICE_NAME`: Service name (default: rum-node)
    /// - `RUM_SUBSYSTEM_ID`: Subsystem ID (default: node)
    /// - `RUM_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `RUM_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `RUM_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `RUM_NETWORK`: Network name (default: nevis)
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `RUM_*` environment variables on top of `self`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        if let Ok(name) = env::var("RUM_SERVICE_NAME") {
            self.service_name = name;
        }
        if let Ok(id) = env::var("RUM_SUBSYSTEM_ID") {
            self.subsystem_id = id;
        }
        if let Ok(level) = env::var("RUM_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
            self.log_level = level;
        }
        if let Ok(v) = env::var("RUM_CONSOLE_OUTPUT") {
            self.console_output = parse_flag(&v, true);
        }
        match env::var("RUM_JSON_LOGS") {
            Ok(v) => self.json_logs = parse_flag(&v, false),
            Err(_) if is_container => self.json_logs = true,
            Err(_) => {}
        }
        if let Ok(network) = env::var("RUM_NETWORK") {
            self.network = network;
        }
        self
    }

    pub fn full_service_name(&self) -> String {
        if self.subsystem_id == "node" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.subsystem_id)
        }
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
