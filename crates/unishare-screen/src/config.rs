//! Screen node configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use unishare_core::registry::DEFAULT_CAPACITY;
use unishare_types::{DeviceId, NodeIdentity, ParseError};

/// Node configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection settings.
    pub broker: BrokerConfig,
    /// This node's identity on the bus.
    pub node: NodeConfig,
    /// Display settings.
    pub display: DisplayConfig,
    /// Button input settings.
    pub buttons: ButtonConfig,
    /// Device registry settings.
    pub registry: RegistryConfig,
}

impl Config {
    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - broker host is non-empty and port is non-zero
    /// - the node's hardware address canonicalizes
    /// - registry capacity is at least 1
    /// - debounce and refresh intervals are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.broker.host.is_empty() {
            errors.push(ValidationError {
                field: "broker.host".to_string(),
                message: "broker host cannot be empty".to_string(),
            });
        }
        if self.broker.port == 0 {
            errors.push(ValidationError {
                field: "broker.port".to_string(),
                message: "broker port cannot be 0".to_string(),
            });
        }
        if self.broker.client_id.is_empty() {
            errors.push(ValidationError {
                field: "broker.client_id".to_string(),
                message: "client id cannot be empty".to_string(),
            });
        }
        if let Err(err) = DeviceId::new(&self.node.mac_address) {
            errors.push(ValidationError {
                field: "node.mac_address".to_string(),
                message: err.to_string(),
            });
        }
        if self.node.name.is_empty() {
            errors.push(ValidationError {
                field: "node.name".to_string(),
                message: "node name cannot be empty".to_string(),
            });
        }
        if self.registry.capacity == 0 {
            errors.push(ValidationError {
                field: "registry.capacity".to_string(),
                message: "registry capacity must be at least 1".to_string(),
            });
        }
        if self.display.refresh_interval == 0 {
            errors.push(ValidationError {
                field: "display.refresh_interval".to_string(),
                message: "refresh interval must be at least 1 second".to_string(),
            });
        }
        if self.buttons.debounce_ms == 0 {
            errors.push(ValidationError {
                field: "buttons.debounce_ms".to_string(),
                message: "debounce window must be at least 1 ms".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// The bus identity this configuration describes.
    pub fn identity(&self) -> Result<NodeIdentity, ConfigError> {
        let id = DeviceId::new(&self.node.mac_address).map_err(ConfigError::Identifier)?;
        Ok(NodeIdentity::new(id, "screen", self.node.name.clone()))
    }
}

/// Broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive: u64,
    /// Optional username.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1883,
            client_id: "unishare-screen".to_string(),
            keep_alive: 62,
            username: None,
            password: None,
        }
    }
}

/// This node's identity on the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Hardware address; canonicalized (separators stripped) at load.
    pub mac_address: String,
    /// Human-readable node name announced in the setup descriptor.
    pub name: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            mac_address: String::new(),
            name: "screen1".to_string(),
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Periodic refresh interval in seconds.
    pub refresh_interval: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 5,
        }
    }
}

impl DisplayConfig {
    /// Refresh interval as a [`Duration`].
    #[must_use]
    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }
}

/// Button input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

impl ButtonConfig {
    /// Debounce window as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Device registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Fixed registry capacity.
    pub capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// One validation failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The offending field, dotted path.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read the configuration file.
    #[error("failed to read config {path:?}: {source}")]
    Read {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for the schema.
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        /// The path that failed.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },

    /// The node hardware address does not canonicalize.
    #[error("invalid node identity: {0}")]
    Identifier(ParseError),

    /// One or more fields failed validation.
    #[error("invalid configuration: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_fail_validation_without_a_mac() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("node.mac_address"));
    }

    #[test]
    fn loads_and_validates_a_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [broker]
            host = "broker.local"
            port = 1884
            client_id = "screen-a"
            keep_alive = 30

            [node]
            mac_address = "AA:11:BB:22:CC:33"
            name = "hall screen"

            [display]
            refresh_interval = 7

            [buttons]
            debounce_ms = 150

            [registry]
            capacity = 4
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.broker.host, "broker.local");
        assert_eq!(config.broker.port, 1884);
        assert_eq!(config.display.refresh(), Duration::from_secs(7));
        assert_eq!(config.buttons.debounce(), Duration::from_millis(150));
        assert_eq!(config.registry.capacity, 4);

        let identity = config.identity().unwrap();
        assert_eq!(identity.id.as_str(), "AA11BB22CC33");
        assert_eq!(identity.kind, "screen");
        assert_eq!(identity.name, "hall screen");
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [node]
            mac_address = "AA11BB22"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.registry.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.buttons.debounce_ms, 200);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = Config::default();
        config.node.mac_address = "AA11BB22".to_string();
        config.broker.port = 0;
        config.registry.capacity = 0;
        config.buttons.debounce_ms = 0;

        let err = config.validate().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("broker.port"));
        assert!(text.contains("registry.capacity"));
        assert!(text.contains("buttons.debounce_ms"));
    }

    #[test]
    fn unreadable_and_malformed_files_are_distinct_errors() {
        assert!(matches!(
            Config::load("/definitely/not/a/file.toml"),
            Err(ConfigError::Read { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "broker = 3").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
