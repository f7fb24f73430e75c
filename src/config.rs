use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::palette::DEFAULT_PALETTE;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    pub palette: String,
    pub tunnel: TunnelConfig,
    pub motion: MotionConfig,
    pub window: WindowConfig,
}

/// Grid dimensions and the shared tube template's shape. Fixed for the
/// session once the GPU buffers are built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TunnelConfig {
    pub rings: u32,
    pub segments: u32,
    pub tube_radius: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_string(),
            tunnel: TunnelConfig {
                rings: 40,
                segments: 32,
                tube_radius: 2.0 / 3.0,
                radial_segments: 8,
                height_segments: 2,
            },
            motion: MotionConfig { speed: 1.0 },
            window: WindowConfig {
                width: 1280,
                height: 800,
            },
        }
    }
}

fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tubeloop")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

impl DemoConfig {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };

        if path.exists() {
            Self::load_from(&path).unwrap_or_default()
        } else {
            // First run: put the defaults on disk so they can be edited.
            let config = Self::default();
            config.save();
            config
        }
    }

    pub fn save(&self) {
        let Some(path) = config_path() else {
            log::warn!("Could not determine config directory");
            return;
        };
        self.save_to(&path);
    }

    /// Read and parse a settings file; `None` with a warning on any
    /// failure, so callers can fall back to defaults.
    pub fn load_from(path: &Path) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Failed to read config: {e}. Using defaults.");
                return None;
            }
        };
        match toml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to parse config: {e}. Using defaults.");
                None
            }
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Failed to create config directory: {e}");
                return;
            }
        }

        match toml::to_string_pretty(self) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(path, contents) {
                    log::warn!("Failed to write config: {e}");
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize config: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_construction_parameters() {
        let config = DemoConfig::default();
        assert_eq!(config.palette, "blue");
        assert_eq!(config.tunnel.rings, 40);
        assert_eq!(config.tunnel.segments, 32);
        assert_eq!(config.tunnel.tube_radius, 2.0 / 3.0);
        assert_eq!(config.tunnel.radial_segments, 8);
        assert_eq!(config.tunnel.height_segments, 2);
        assert_eq!(config.motion.speed, 1.0);
    }

    #[test]
    fn toml_roundtrip_preserves_everything() {
        let config = DemoConfig::default();
        let serialized = toml::to_string_pretty(&config).expect("serialize");
        let deserialized: DemoConfig = toml::from_str(&serialized).expect("deserialize");
        assert_eq!(deserialized, config);
    }

    #[test]
    fn save_and_load_through_a_real_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut config = DemoConfig::default();
        config.palette = "green".to_string();
        config.motion.speed = 2.5;
        config.save_to(&path);

        let loaded = DemoConfig::load_from(&path).expect("load saved config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn unreadable_or_garbled_files_fall_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        assert!(DemoConfig::load_from(&missing).is_none());

        let garbled = dir.path().join("settings.toml");
        std::fs::write(&garbled, "rings = \"many\"").expect("write");
        assert!(DemoConfig::load_from(&garbled).is_none());
    }
}
