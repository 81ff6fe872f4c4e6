use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub profile: DeviceProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (holds the control socket)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Per-device settings applied to every feature on startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceProfile {
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub haptic: HapticConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Delay between drain ticks in milliseconds (values below 1 are clamped)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: i32,
    /// Divisor for the amount released per tick (values below 1 are clamped)
    #[serde(default = "default_steps")]
    pub steps: i32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            steps: default_steps(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Effect strength, clamped to 1..=100
    #[serde(default = "default_strength")]
    pub strength: i32,
    #[serde(default)]
    pub battery_saving: bool,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            strength: default_strength(),
            battery_saving: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("peripherald")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> i32 {
    8
}

fn default_steps() -> i32 {
    10
}

fn default_strength() -> i32 {
    60
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/peripherald/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("peripherald")
            .join("config.toml")
    }

    /// Get the Unix socket path for IPC
    pub fn socket_path(&self) -> PathBuf {
        self.data_dir().join("peripherald.sock")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.profile.scroll, ScrollConfig::default());
        assert_eq!(config.profile.scroll.interval_ms, 8);
        assert_eq!(config.profile.scroll.steps, 10);
        assert!(config.profile.haptic.enabled);
        assert_eq!(config.profile.haptic.strength, 60);
        assert!(!config.profile.haptic.battery_saving);
    }

    #[test]
    fn test_partial_profile() {
        let config = AppConfig::from_toml(
            r#"
            [general]
            data_dir = "/tmp/peripherald-test"

            [profile.scroll]
            steps = 4

            [profile.haptic]
            battery_saving = true
            "#,
        )
        .unwrap();

        assert_eq!(config.profile.scroll.steps, 4);
        assert_eq!(config.profile.scroll.interval_ms, 8);
        assert!(config.profile.haptic.battery_saving);
        assert_eq!(
            config.socket_path(),
            PathBuf::from("/tmp/peripherald-test/peripherald.sock")
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[profile.scroll]\nsteps = \"many\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        let path = PathBuf::from("/var/lib/peripherald");
        assert_eq!(expand_tilde(&path), path);
    }
}
