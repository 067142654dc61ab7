//! Configuration types for the virtual LCD client.
//!
//! Every section and field has a default, so a TOML file only needs to name
//! what it changes:
//!
//! ```toml
//! [connection]
//! address = "192.168.1.50:7000"
//!
//! [reconnect]
//! enabled = true
//! ```

use crate::errors::VlcdError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vlcd_input::ThrottleConfig;
use vlcd_pixelbuffer::PixelFormat;
use vlcd_protocol::DEFAULT_MAX_PAYLOAD_LEN;

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// Wire protocol limits.
    pub protocol: ProtocolConfig,
    /// Screen parameters assumed before the device's first init.
    pub screen: ScreenConfig,
    /// Input settings.
    pub input: InputConfig,
    /// Init request timer.
    pub init_request: InitRequestConfig,
    /// Reconnection settings.
    pub reconnect: ReconnectConfig,
    /// Channel capacities.
    pub channels: ChannelConfig,
}

/// Connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Device address as `host:port`.
    pub address: String,
    /// Connection timeout in milliseconds.
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Protocol configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Largest accepted frame payload in bytes.
    pub max_payload_len: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

/// Default screen parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            format: PixelFormat::Rgb565,
        }
    }
}

/// Input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Enable pointer movement throttling.
    pub pointer_throttle: bool,
    /// Minimum interval between pointer movement events in milliseconds.
    pub pointer_interval_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pointer_throttle: default_true(),
            pointer_interval_ms: 20,
        }
    }
}

impl InputConfig {
    /// Throttle settings for the input dispatcher.
    #[must_use]
    pub fn throttle(&self) -> ThrottleConfig {
        ThrottleConfig {
            enabled: self.pointer_throttle,
            min_interval_ms: self.pointer_interval_ms,
        }
    }
}

/// Init request timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitRequestConfig {
    /// Interval between init requests while the screen is disabled.
    pub interval_ms: u64,
}

impl Default for InitRequestConfig {
    fn default() -> Self {
        Self { interval_ms: 1_000 }
    }
}

/// Reconnection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Enable automatic reconnection.
    pub enabled: bool,
    /// Delay between attempts in milliseconds.
    pub interval_ms: u64,
    /// Maximum number of retry attempts (0 = infinite).
    pub max_retries: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 100,
            max_retries: 0,
        }
    }
}

/// Channel capacities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Display events buffered for the renderer.
    pub event_capacity: usize,
    /// Input commands buffered for the event loop.
    pub command_capacity: usize,
    /// Outbound frames buffered for the writer task.
    pub outbound_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_capacity: 16,
            command_capacity: 64,
            outbound_capacity: 64,
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`VlcdError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VlcdError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            VlcdError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&text).map_err(|e| {
            VlcdError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`VlcdError::Config`] on malformed TOML or unknown values.
    pub fn from_toml(text: &str) -> Result<Self, VlcdError> {
        toml::from_str(text).map_err(|e| VlcdError::Config(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), VlcdError> {
        if self.connection.address.is_empty() {
            return Err(VlcdError::Config("Address cannot be empty".to_string()));
        }

        if self.protocol.max_payload_len == 0 {
            return Err(VlcdError::Config(
                "Maximum payload length cannot be 0".to_string(),
            ));
        }

        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(VlcdError::Config(
                "Screen dimensions cannot be 0".to_string(),
            ));
        }

        if self.init_request.interval_ms == 0 {
            return Err(VlcdError::Config(
                "Init request interval cannot be 0".to_string(),
            ));
        }

        if self.reconnect.enabled && self.reconnect.interval_ms == 0 {
            return Err(VlcdError::Config(
                "Reconnect interval cannot be 0 when enabled".to_string(),
            ));
        }

        if self.channels.event_capacity == 0
            || self.channels.command_capacity == 0
            || self.channels.outbound_capacity == 0
        {
            return Err(VlcdError::Config(
                "Channel capacities cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.connection.timeout_ms)
    }

    /// Returns the init request interval.
    #[must_use]
    pub fn init_request_interval(&self) -> Duration {
        Duration::from_millis(self.init_request.interval_ms)
    }

    /// Returns the delay between reconnection attempts.
    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect.interval_ms)
    }
}

/// Builder for creating a `Config`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Starts from an existing configuration.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Sets the device address (`host:port`).
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.connection.address = address.into();
        self
    }

    /// Sets the connection timeout in milliseconds.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.connection.timeout_ms = timeout_ms;
        self
    }

    /// Sets the largest accepted payload length.
    #[must_use]
    pub fn max_payload_len(mut self, len: usize) -> Self {
        self.config.protocol.max_payload_len = len;
        self
    }

    /// Enables or disables pointer throttling.
    #[must_use]
    pub fn pointer_throttle(mut self, enabled: bool) -> Self {
        self.config.input.pointer_throttle = enabled;
        self
    }

    /// Sets the init request interval in milliseconds.
    #[must_use]
    pub fn init_request_interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.init_request.interval_ms = interval_ms;
        self
    }

    /// Enables automatic reconnection.
    #[must_use]
    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.config.reconnect.enabled = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Config, VlcdError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .address("localhost:7000")
            .max_payload_len(1024)
            .build()
            .unwrap();

        assert_eq!(config.connection.address, "localhost:7000");
        assert_eq!(config.protocol.max_payload_len, 1024);
        assert_eq!(config.input.pointer_interval_ms, 20);
    }

    #[test]
    fn test_config_validation_empty_address() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_payload() {
        let result = Config::builder()
            .address("localhost:7000")
            .max_payload_len(0)
            .build();
        assert!(matches!(result, Err(VlcdError::Config(_))));
    }

    #[test]
    fn test_config_validation_zero_reconnect_interval() {
        let mut config = Config::default();
        config.connection.address = "localhost:7000".to_string();
        config.reconnect.enabled = true;
        config.reconnect.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.screen.width, 800);
        assert_eq!(config.screen.height, 480);
        assert_eq!(config.screen.format, PixelFormat::Rgb565);
        assert_eq!(config.protocol.max_payload_len, 16 * 1024 * 1024);
        assert_eq!(config.init_request_interval(), Duration::from_secs(1));
        assert_eq!(config.reconnect_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [connection]
            address = "10.0.0.2:9000"

            [screen]
            format = "mono_inv"

            [input]
            pointer_throttle = false
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.address, "10.0.0.2:9000");
        assert_eq!(config.connection.timeout_ms, 10_000);
        assert_eq!(config.screen.format, PixelFormat::MonoInv);
        assert_eq!(config.screen.width, 800);
        assert!(!config.input.throttle().enabled);
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Config::from_toml("[screen]\nformat = \"rgb999\"").unwrap_err();
        assert!(matches!(err, VlcdError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[connection]\naddress = \"dev:1\"\n[reconnect]\nenabled = true").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.connection.address, "dev:1");
        assert!(config.reconnect.enabled);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/vlcd.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::builder().address("a:1").build().unwrap();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
