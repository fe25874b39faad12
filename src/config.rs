//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use kitty_door::config::{Config, DoorConfig, SyncConfig};
//!
//! // Use defaults
//! let config = Config::default();
//!
//! // Or customize
//! let config = Config::default()
//!     .with_sync(SyncConfig::default().with_host("192.168.1.100"))
//!     .with_door(DoorConfig::default().with_open_light_level(210));
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (hostnames, client IDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (remote paths)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Take only what fits
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    let take = s.len().min(MAX_LONG_STRING);
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// WiFi connection configuration
    pub wifi: WifiConfig,
    /// Remote sync gateway configuration
    pub sync: SyncConfig,
    /// Door controller configuration
    pub door: DoorConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set sync gateway configuration
    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Set door configuration
    pub fn with_door(mut self, door: DoorConfig) -> Self {
        self.door = door;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Sync Config
// ============================================================================

/// Remote sync gateway configuration.
///
/// The five remote paths mirror the layout the companion app reads; change
/// them only together with the app.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncConfig {
    /// Broker hostname or IP
    pub host: ShortString,
    /// Broker port
    pub port: u16,
    /// Client ID (should be unique per device)
    pub client_id: ShortString,
    /// Username for authentication (empty = no auth)
    pub username: ShortString,
    /// Password for authentication
    pub password: ShortString,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
    /// Path the options/command document lives under (inbound)
    pub options_path: LongString,
    /// Path door state records are pushed to
    pub door_state_path: LongString,
    /// Path hardware override records are pushed to
    pub override_path: LongString,
    /// Path light level records are pushed to
    pub light_level_path: LongString,
    /// Path keep-alive pings are pushed to
    pub ping_path: LongString,
    /// Whether remote sync is enabled
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            host: short_string("localhost"),
            port: 1883,
            client_id: short_string("kitty-door"),
            username: ShortString::new(),
            password: ShortString::new(),
            keep_alive_secs: 30,
            options_path: long_string("systems/kitty_door"),
            door_state_path: long_string("status/kitty_door"),
            override_path: long_string("status/kitty_door_hw_override"),
            light_level_path: long_string("status/kitty_door_light_level"),
            ping_path: long_string("debug/kitty_door/ping"),
            enabled: true,
        }
    }
}

impl SyncConfig {
    /// Set the broker host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the broker port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Self {
        self.client_id = short_string(id);
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = short_string(username);
        self.password = short_string(password);
        self
    }

    /// Set the options path
    pub fn with_options_path(mut self, path: &str) -> Self {
        self.options_path = long_string(path);
        self
    }

    /// Enable or disable remote sync
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check if authentication is configured
    pub fn has_auth(&self) -> bool {
        !self.username.is_empty()
    }
}

// ============================================================================
// Door Config
// ============================================================================

/// Door controller configuration.
///
/// The light thresholds here seed the controller's options; the remote end
/// can change them at runtime through the sync gateway.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoorConfig {
    /// Light level at or above which the door opens
    pub open_light_level: u16,
    /// Light level at or below which the door closes
    pub close_light_level: u16,
    /// Hard cap on a single door operation in milliseconds
    pub max_operation_ms: u64,
    /// Poll/settle interval in milliseconds
    pub poll_interval_ms: u32,
    /// Keep-alive ping interval in milliseconds
    pub ping_interval_ms: u64,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            open_light_level: 190,
            close_light_level: 40,
            max_operation_ms: 5000,
            poll_interval_ms: 25,
            ping_interval_ms: 600_000,
        }
    }
}

impl DoorConfig {
    /// Set the open light threshold
    pub fn with_open_light_level(mut self, level: u16) -> Self {
        self.open_light_level = level;
        self
    }

    /// Set the close light threshold
    pub fn with_close_light_level(mut self, level: u16) -> Self {
        self.close_light_level = level;
        self
    }

    /// Set the operation timeout
    pub fn with_max_operation_ms(mut self, ms: u64) -> Self {
        self.max_operation_ms = ms;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the ping interval
    pub fn with_ping_interval_ms(mut self, ms: u64) -> Self {
        self.ping_interval_ms = ms;
        self
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u32,
    /// Whether WiFi is enabled
    pub enabled: bool,
    /// Maximum connection retry attempts (0 = unlimited)
    pub max_retries: u8,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            connect_timeout_ms: 30_000,
            enabled: true,
            max_retries: 5,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout_ms(mut self, ms: u32) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Enable or disable WiFi
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the maximum retry count
    pub fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Device ID (for multi-door setups)
    pub id: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("kitty-door"),
            id: short_string("door1"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the device ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = short_string(id);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.sync.port, 1883);
        assert_eq!(config.door.open_light_level, 190);
        assert_eq!(config.door.close_light_level, 40);
        assert_eq!(config.door.max_operation_ms, 5000);
    }

    #[test]
    fn default_sync_paths() {
        let sync = SyncConfig::default();
        assert_eq!(sync.options_path.as_str(), "systems/kitty_door");
        assert_eq!(sync.door_state_path.as_str(), "status/kitty_door");
        assert_eq!(sync.override_path.as_str(), "status/kitty_door_hw_override");
        assert_eq!(
            sync.light_level_path.as_str(),
            "status/kitty_door_light_level"
        );
        assert_eq!(sync.ping_path.as_str(), "debug/kitty_door/ping");
    }

    #[test]
    fn sync_auth_detection() {
        let no_auth = SyncConfig::default();
        assert!(!no_auth.has_auth());

        let with_auth = SyncConfig::default().with_auth("user", "pass");
        assert!(with_auth.has_auth());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_sync(
                SyncConfig::default()
                    .with_host("broker.local")
                    .with_port(8883),
            )
            .with_door(DoorConfig::default().with_open_light_level(250))
            .with_device(DeviceConfig::default().with_name("Back Door"));

        assert_eq!(config.sync.host.as_str(), "broker.local");
        assert_eq!(config.sync.port, 8883);
        assert_eq!(config.door.open_light_level, 250);
        assert_eq!(config.device.name.as_str(), "Back Door");
    }

    #[test]
    fn door_config_builder() {
        let door = DoorConfig::default()
            .with_close_light_level(60)
            .with_max_operation_ms(8000)
            .with_poll_interval_ms(50)
            .with_ping_interval_ms(300_000);

        assert_eq!(door.close_light_level, 60);
        assert_eq!(door.max_operation_ms, 8000);
        assert_eq!(door.poll_interval_ms, 50);
        assert_eq!(door.ping_interval_ms, 300_000);
    }

    #[test]
    fn wifi_config_is_configured() {
        let unconfigured = WifiConfig::default();
        assert!(!unconfigured.is_configured());

        let configured = WifiConfig::default().with_ssid("MyNetwork");
        assert!(configured.is_configured());
    }

    #[test]
    fn device_config_default() {
        let device = DeviceConfig::default();
        assert_eq!(device.name.as_str(), "kitty-door");
        assert_eq!(device.id.as_str(), "door1");
    }

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert!(s.len() <= MAX_SHORT_STRING);
    }

    #[test]
    fn long_string_truncation() {
        let long_input = "b".repeat(200);
        let s = long_string(&long_input);
        assert!(s.len() <= MAX_LONG_STRING);
    }

    #[test]
    fn string_helpers_utf8_boundary() {
        // Multi-byte UTF-8 input must not split a character.
        let input = "🐱🐱🐱🐱";
        let s = short_string(input);
        assert!(s.len() <= MAX_SHORT_STRING);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());
    }
}
