//! Agent configuration, loadable from TOML.

use pgerr_collector::receiver::DEFAULT_CAPACITY;
use pgerr_collector::{ErrorLogsArguments, LineFormat, LogsReceiver};
use prometheus::Registry;
use serde::Deserialize;

/// Top-level configuration for the agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Instance label attached to every counter (e.g., "orders_db").
    pub instance_key: String,
    /// Server identifier label. None renders as an empty label.
    #[serde(default)]
    pub system_id: Option<String>,
    /// Which `log_line_prefix` layout the server writes.
    #[serde(default)]
    pub log_format: LineFormat,
    /// Lines buffered between the input reader and the collector.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Where log lines come from.
    #[serde(default)]
    pub input: InputConfig,
    /// Prometheus endpoint settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Log file path, or "-" for stdin (e.g. piped from `tail -F`).
    #[serde(default = "default_input_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_channel_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_input_path() -> String {
    "-".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9187
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AgentConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// `host:port` the metrics endpoint binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.metrics.host, self.metrics.port)
    }

    /// Collector arguments for this config, exporting through `registry`.
    pub fn collector_args(&self, registry: Registry) -> ErrorLogsArguments {
        ErrorLogsArguments {
            receiver: LogsReceiver::new(self.channel_capacity),
            instance_key: self.instance_key.clone(),
            system_id: self.system_id.clone().unwrap_or_default(),
            format: self.log_format,
            registry: Some(registry),
        }
    }
}
