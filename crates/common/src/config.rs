//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ClipmarksError, ClipmarksResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Frame rate assumed when a video's frame rate cannot be detected.
    pub default_fps: f64,

    /// Live preview settings.
    #[serde(default)]
    pub preview: PreviewDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for the live speed preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewDefaults {
    /// Easing applied between speed points ("linear" or "cubicInOut").
    pub easing: String,

    /// Decimal digits kept after rounding a sampled speed.
    pub round_precision: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipmarks_timing=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

/// Frame rate used when none is configured or detected.
pub const DEFAULT_FPS: f64 = 60.0;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_fps: DEFAULT_FPS,
            preview: PreviewDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PreviewDefaults {
    fn default() -> Self {
        Self {
            easing: "linear".to_string(),
            round_precision: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    ///
    /// A missing file is silent; an unreadable or invalid one is logged.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        match Self::try_load_from(config_path) {
            Ok(config) => config,
            Err(ClipmarksError::FileNotFound { .. }) => Self::default(),
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "Ignoring config, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path, failing on any problem.
    pub fn try_load_from(config_path: &std::path::Path) -> ClipmarksResult<Self> {
        if !config_path.exists() {
            return Err(ClipmarksError::FileNotFound {
                path: config_path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(config_path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ClipmarksResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> ClipmarksResult<()> {
        self.validate()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }

    fn validate(&self) -> ClipmarksResult<()> {
        if !(self.default_fps.is_finite() && self.default_fps > 0.0) {
            return Err(ClipmarksError::config(format!(
                "default_fps must be positive, got {}",
                self.default_fps
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipmarks").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_fps, 60.0);
        assert_eq!(config.preview.easing, "linear");
        assert_eq!(config.preview.round_precision, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("clipmarks_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.default_fps = 30.0;
        config.preview.easing = "cubicInOut".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.default_fps, 30.0);
        assert_eq!(loaded.preview.easing, "cubicInOut");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_falls_back_on_garbage() {
        let dir = std::env::temp_dir().join("clipmarks_test_config_garbage");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.default_fps, DEFAULT_FPS);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_non_positive_fps_is_rejected() {
        let dir = std::env::temp_dir().join("clipmarks_test_config_fps");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"default_fps": 0.0}"#).unwrap();

        let err = AppConfig::try_load_from(&path).unwrap_err();
        assert!(matches!(err, ClipmarksError::Config { .. }));
        assert_eq!(AppConfig::load_from(&path).default_fps, DEFAULT_FPS);

        let mut config = AppConfig::default();
        config.default_fps = f64::NAN;
        assert!(matches!(
            config.save_to(&path),
            Err(ClipmarksError::Config { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_reported() {
        let path = std::env::temp_dir().join("clipmarks_test_config_missing.json");
        let _ = std::fs::remove_file(&path);
        let err = AppConfig::try_load_from(&path).unwrap_err();
        assert!(matches!(err, ClipmarksError::FileNotFound { .. }));
        assert_eq!(AppConfig::load_from(&path).default_fps, DEFAULT_FPS);
    }
}
