//! Ambient engine configuration, persisted as RON. Mirrors the document
//! format split: `EngineConfig` lives in `config.ron`, drawings live in
//! JSON (`serialize.rs`).

use crate::audio::SoundProfile;
use crate::grid::GridType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub raw_mode: bool,
    pub surface_texture: f32,
    pub sound_profile: SoundProfile,
    pub sound_volume: f32,
    pub haptic_enabled: bool,
    pub default_grid_type: GridType,
    pub palm_rejection_pressure_floor: f32,
    pub allow_coalesced_samples: bool,
    pub motion_prediction_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            raw_mode: false,
            surface_texture: 0.3,
            sound_profile: SoundProfile::default(),
            sound_volume: 0.8,
            haptic_enabled: true,
            default_grid_type: GridType::None,
            palm_rejection_pressure_floor: 0.05,
            allow_coalesced_samples: true,
            motion_prediction_enabled: false,
        }
    }
}

impl EngineConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quillcore").join("config.ron"))
    }

    pub fn from_disk(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("failed to parse config at {}: {e}", path.display());
                    EngineConfig::default()
                }
            },
            Err(_) => EngineConfig::default(),
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron_string())
    }

    pub fn to_ron_string(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .unwrap_or_else(|_| "()".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = EngineConfig::from_disk(Path::new("/nonexistent/quillcore/config.ron"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn round_trips_through_ron() {
        let mut config = EngineConfig::default();
        config.surface_texture = 0.75;
        config.sound_profile = SoundProfile::Marker;
        let text = config.to_ron_string();
        let parsed: EngineConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed.surface_texture, 0.75);
        assert_eq!(parsed.sound_profile, SoundProfile::Marker);
    }
}
