use holoscene_locomotion::LocomotionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating session configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error in config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Avatar-handshake settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeSettings {
    /// Subdomain of the creation service the embedded frame is pointed at.
    pub subdomain: String,
    /// Where the durable record store lives.
    pub store_path: PathBuf,
}

impl Default for HandshakeSettings {
    fn default() -> Self {
        Self {
            subdomain: "holoim".to_string(),
            store_path: PathBuf::from("./holoscene_data/records.json"),
        }
    }
}

/// Immersive-session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XrSettings {
    /// Master switch; when false the coordinator is never driven even on
    /// capable hardware.
    pub enabled: bool,
}

impl Default for XrSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Top-level session configuration, loaded from YAML with defaults for
/// every omitted section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub handshake: HandshakeSettings,
    pub locomotion: LocomotionConfig,
    pub xr: XrSettings,
}

impl SessionConfig {
    /// Parse from a YAML string.
    pub fn from_yaml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or fall back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        tracing::info!(path = %path.display(), "loading config");
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Reject values the controllers cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handshake.subdomain.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "handshake.subdomain",
                message: "must not be empty".to_string(),
            });
        }
        let l = &self.locomotion;
        if l.walk_speed <= 0.0 || l.run_speed <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "locomotion.walk_speed/run_speed",
                message: "speeds must be positive".to_string(),
            });
        }
        if l.run_speed < l.walk_speed {
            return Err(ConfigError::InvalidValue {
                field: "locomotion.run_speed",
                message: "must be at least walk_speed".to_string(),
            });
        }
        if !(0.0..=90.0).contains(&l.slope_limit_degrees) {
            return Err(ConfigError::InvalidValue {
                field: "locomotion.slope_limit_degrees",
                message: "must be within 0..=90".to_string(),
            });
        }
        if l.step_offset < 0.0 || l.blend_seconds < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "locomotion.step_offset/blend_seconds",
                message: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}
