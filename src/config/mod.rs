use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gesture::InputMode;
use crate::share::capture::CaptureOptions;
use crate::theme::parse_hex_rgb;

/// Hex color overrides for the TUI palette
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// How slots are moved: "click" (select, then target) or "drag"
    pub input_mode: InputMode,

    /// Show desktop notifications after sharing
    pub notifications: bool,

    /// Where the image is saved when the clipboard is unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Where the pyramid and contacts are stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Pixel multiplier for the shared image
    pub capture_scale: u32,

    /// Background of the shared image (#RRGGBB)
    pub capture_background: String,

    pub theme: ThemeOverrides,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Click,
            notifications: true,
            export_dir: None,
            data_dir: None,
            capture_scale: 2,
            capture_background: "#2d8b4e".to_string(),
            theme: ThemeOverrides::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tennis-pyramid");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Ok(Self::load_from(&path)),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load config from `path`, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Leave a broken file alone so the user can fix it
            return AppConfig::default();
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        config
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Capture settings, falling back to the default background on a bad
    /// color and clamping the scale to something sane
    pub fn capture_options(&self) -> CaptureOptions {
        let defaults = CaptureOptions::default();
        let background = parse_hex_rgb(&self.capture_background).unwrap_or_else(|| {
            tracing::warn!("Invalid capture_background {:?}", self.capture_background);
            defaults.background
        });
        CaptureOptions {
            scale: self.capture_scale.clamp(1, 4),
            background,
        }
    }

    /// Directory for downloaded images: config, then the user's downloads
    /// folder, then `fallback`
    pub fn download_dir(&self, fallback: &Path) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            input_mode: InputMode::Drag,
            notifications: false,
            export_dir: Some(PathBuf::from("/tmp/pyramids")),
            data_dir: None,
            capture_scale: 3,
            capture_background: "#112233".to_string(),
            theme: ThemeOverrides {
                accent: Some("#ffc107".to_string()),
                ..Default::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        assert!(serialized.contains("input_mode = \"drag\""));

        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("input_mode = \"drag\"\n").unwrap();
        assert_eq!(config.input_mode, InputMode::Drag);
        assert!(config.notifications);
        assert_eq!(config.capture_options(), CaptureOptions::default());
    }

    #[test]
    fn test_capture_options_sanitized() {
        let config = AppConfig {
            capture_scale: 40,
            capture_background: "green".to_string(),
            ..Default::default()
        };
        let options = config.capture_options();
        assert_eq!(options.scale, 4);
        assert_eq!(options.background, CaptureOptions::default().background);
    }

    #[test]
    fn test_load_from_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
        assert!(path.exists());

        std::fs::write(&path, "notifications = false\n").unwrap();
        assert!(!AppConfig::load_from(&path).notifications);

        std::fs::write(&path, "notifications = [").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }

    #[test]
    fn test_download_dir_prefers_config() {
        let config = AppConfig {
            export_dir: Some(PathBuf::from("/srv/share")),
            ..Default::default()
        };
        assert_eq!(config.download_dir(Path::new("/data")), PathBuf::from("/srv/share"));
    }
}
