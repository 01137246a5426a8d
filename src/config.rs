//! # Configuration Management
//!
//! Centralized configuration for buffers, the inbound decoder and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - TOML strings via `from_toml()`
//! - Environment overrides via `from_env()`
//! - Direct instantiation with defaults
//!
//! ## Example
//! ```toml
//! [buffer]
//! initial_capacity = 64
//! growth = "grow"
//! max_capacity = 65536
//!
//! [decoder]
//! max_payload_size = 5000
//!
//! [[decoder.packets]]
//! opcode = 4
//! length = { fixed = 6 }
//!
//! [[decoder.packets]]
//! opcode = 10
//! length = "variable_byte"
//! ```

use crate::core::writer::{GrowthPolicy, WritableByteBuffer};
use crate::error::{ProtocolError, Result};
use crate::protocol::inbound::{PacketLength, PacketSizeTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Initial store size of a default-constructed buffer
pub const DEFAULT_CAPACITY: usize = 16;

/// Upper bound a growable buffer may reach (16 MB)
pub const MAX_BUFFER_CAPACITY: usize = 16 * 1024 * 1024;

/// Largest payload a length header can describe (2-byte header)
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Byte that ends every string on the wire
pub const STRING_TERMINATOR: u8 = 0x0A;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CodecConfig {
    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub decoder: DecoderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults overridden by `PACKET_BUFFER_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("PACKET_BUFFER_INITIAL_CAPACITY") {
            if let Ok(val) = capacity.parse::<usize>() {
                config.buffer.initial_capacity = val;
            }
        }

        if let Ok(capacity) = std::env::var("PACKET_BUFFER_MAX_CAPACITY") {
            if let Ok(val) = capacity.parse::<usize>() {
                config.buffer.max_capacity = val;
            }
        }

        if let Ok(growth) = std::env::var("PACKET_BUFFER_GROWTH") {
            config.buffer.growth = match growth.to_ascii_lowercase().as_str() {
                "grow" => GrowthPolicy::Grow,
                "fixed" => GrowthPolicy::Fixed,
                other => {
                    return Err(ProtocolError::ConfigError(format!(
                        "Invalid PACKET_BUFFER_GROWTH: '{other}' (expected 'grow' or 'fixed')"
                    )))
                }
            };
        }

        if let Ok(max_payload) = std::env::var("PACKET_BUFFER_MAX_PAYLOAD") {
            if let Ok(val) = max_payload.parse::<usize>() {
                config.decoder.max_payload_size = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Validate the configuration. An empty list means the configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.buffer.validate());
        errors.extend(self.decoder.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Outbound buffer sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    /// Store size allocated up front
    pub initial_capacity: usize,

    /// Behaviour when a write runs past the store
    pub growth: GrowthPolicy,

    /// Ceiling for growable buffers
    pub max_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            growth: GrowthPolicy::Grow,
            max_capacity: MAX_BUFFER_CAPACITY,
        }
    }
}

impl BufferConfig {
    /// Build an empty buffer with these settings
    pub fn build(&self) -> WritableByteBuffer {
        WritableByteBuffer::with_policy(self.initial_capacity, self.growth, self.max_capacity)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.initial_capacity == 0 && self.growth == GrowthPolicy::Fixed {
            errors.push("A fixed buffer needs an initial capacity greater than 0".to_string());
        }

        if self.growth == GrowthPolicy::Grow && self.max_capacity < self.initial_capacity {
            errors.push(format!(
                "Max capacity ({}) is smaller than initial capacity ({})",
                self.max_capacity, self.initial_capacity
            ));
        }

        if self.initial_capacity > MAX_BUFFER_CAPACITY {
            errors.push(format!(
                "Initial capacity too large: {} bytes (maximum: {MAX_BUFFER_CAPACITY})",
                self.initial_capacity
            ));
        }

        errors
    }
}

/// One entry of the opcode to packet-length table
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct PacketDefinition {
    pub opcode: u8,
    pub length: PacketLength,
}

/// Inbound decoder settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecoderConfig {
    /// Largest payload the decoder will buffer for a single packet
    pub max_payload_size: usize,

    /// Known packets and their lengths
    #[serde(default)]
    pub packets: Vec<PacketDefinition>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
            packets: Vec::new(),
        }
    }
}

impl DecoderConfig {
    /// Build the opcode lookup table used by the inbound decoder
    pub fn size_table(&self) -> Result<PacketSizeTable> {
        let mut table = PacketSizeTable::new();
        for packet in &self.packets {
            if table.insert(packet.opcode, packet.length).is_some() {
                return Err(ProtocolError::ConfigError(format!(
                    "Duplicate packet definition for opcode {}",
                    packet.opcode
                )));
            }
        }
        Ok(table)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_payload_size == 0 {
            errors.push("Max payload size cannot be 0".to_string());
        } else if self.max_payload_size > MAX_BUFFER_CAPACITY {
            errors.push(format!(
                "Max payload size too large: {} bytes (maximum: {MAX_BUFFER_CAPACITY})",
                self.max_payload_size
            ));
        }

        let mut seen = HashSet::new();
        for packet in &self.packets {
            if !seen.insert(packet.opcode) {
                errors.push(format!(
                    "Duplicate packet definition for opcode {}",
                    packet.opcode
                ));
            }

            if let PacketLength::Fixed(size) = packet.length {
                if size > self.max_payload_size {
                    errors.push(format!(
                        "Opcode {} has fixed length {size} above max payload size {}",
                        packet.opcode, self.max_payload_size
                    ));
                }
            }
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to include the event target in each line
    pub with_target: bool,

    /// Whether to emit ANSI colour codes
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("packet-buffer"),
            log_level: Level::INFO,
            with_target: true,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
