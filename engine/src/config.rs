//! Viewer Configuration
//!
//! JSON file, every field optional:
//!
//! ```json
//! {
//!   "window": { "width": 1280, "height": 720, "vsync": true },
//!   "terrain": { "gridSize": 512, "seed": 42 },
//!   "moistureSeeding": "derived",
//!   "shaderDir": "shaders"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::terrain::codec::MoistureSeeding;
use crate::terrain::params::TerrainParameters;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Terrain Viewer".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub terrain: TerrainParameters,
    pub moisture_seeding: MoistureSeeding,
    /// Load WGSL artifacts from here instead of the embedded copies.
    pub shader_dir: Option<PathBuf>,
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.terrain.validate()?;
        info!(path = %path.display(), "loaded viewer config");
        Ok(config)
    }

    /// Config from `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
