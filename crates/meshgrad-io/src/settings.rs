use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use meshgrad_core::config::{DEFAULT_HISTORY_LIMIT, DEFAULT_SHAPE_COUNT};
use meshgrad_core::StoreConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::ExportFormat;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Editor preferences read from a JSON file. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    pub storage_path: PathBuf,
    pub history_limit: usize,
    pub default_shape_count: usize,
    pub export_scale: f64,
    pub export_format: ExportFormat,
    pub grain_tile_size: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("meshgrad-state.json"),
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_shape_count: DEFAULT_SHAPE_COUNT,
            export_scale: 1.0,
            export_format: ExportFormat::Png,
            grain_tile_size: meshgrad_renderer::grain::DEFAULT_TILE_SIZE,
        }
    }
}

impl EditorSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            history_limit: self.history_limit,
            default_shape_count: meshgrad_core::config::clamp_shape_count(self.default_shape_count),
            ..StoreConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_merges_defaults() {
        let s = EditorSettings::from_json(r#"{ "exportScale": 2.0, "exportFormat": "webp" }"#).unwrap();
        assert_eq!(s.export_scale, 2.0);
        assert_eq!(s.export_format, ExportFormat::Webp);
        assert_eq!(s.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(s.grain_tile_size, 128);
    }

    #[test]
    fn test_store_config_clamps_count() {
        let s = EditorSettings {
            default_shape_count: 50,
            history_limit: 10,
            ..EditorSettings::default()
        };
        let c = s.store_config();
        assert_eq!(c.default_shape_count, 10);
        assert_eq!(c.history_limit, 10);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("meshgrad-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        let s = EditorSettings {
            export_format: ExportFormat::Svg,
            ..EditorSettings::default()
        };
        s.save(&path).unwrap();
        assert_eq!(EditorSettings::load(&path).unwrap(), s);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(EditorSettings::from_json("[1, 2]"), Err(SettingsError::Json(_))));
    }
}
