use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

/// Optional engine config file (TOML). Every field has a CLI counterpart;
/// command-line values win over the file.
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    pub grid: Option<GridConfig>,
    pub window: Option<WindowConfig>,
    pub assets_root: Option<PathBuf>,
    pub diagonal_routing: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    pub target_fps: Option<u32>,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("config parse failed for {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("config read failed for {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
