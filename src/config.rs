use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::WeaponKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameEngineOptions {
    pub seed: u32,
    pub starting_floor: u32,
    pub starting_weapon: WeaponKind,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            starting_floor: 0,
            starting_weapon: WeaponKind::Blade,
            viewport_width: 960.0,
            viewport_height: 640.0,
        }
    }
}

pub fn load_options(path: &Path) -> Result<GameEngineOptions, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string_lossy().to_string(),
        source,
    })?;
    parse_options(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_string_lossy().to_string(),
        source,
    })
}

pub fn parse_options(raw: &str) -> Result<GameEngineOptions, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn parse_weapon(raw: &str) -> Result<WeaponKind, ConfigError> {
    let normalized = raw.trim().to_ascii_lowercase();
    WeaponKind::parse(&normalized).ok_or_else(|| ConfigError::UnknownWeapon(raw.to_string()))
}
