//! Shader Loading Utilities
//!
//! The three terrain shader artifacts are embedded at compile time. A
//! directory can override them at runtime (handy when iterating on WGSL
//! without rebuilding).

use std::path::Path;

use tracing::info;

use crate::error::ConfigError;

/// Shader source that can be either embedded at compile time or loaded at runtime.
pub enum ShaderSource {
    /// Embedded shader source (faster, no file I/O at runtime)
    Embedded(&'static str),
    /// Runtime-loaded shader source
    Runtime(String),
}

impl ShaderSource {
    /// Get the shader source as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShaderSource::Embedded(s) => s,
            ShaderSource::Runtime(s) => s.as_str(),
        }
    }
}

/// Load a shader from the filesystem at runtime.
pub fn load_shader_file(path: impl AsRef<Path>) -> Result<ShaderSource, ConfigError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::ShaderArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ShaderSource::Runtime(source))
}

/// Create a wgpu shader module from the given source.
pub fn create_shader_module(
    device: &wgpu::Device,
    label: &str,
    source: &ShaderSource,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
    })
}

/// Artifact file names, relative to the crate root or an override directory.
pub mod paths {
    /// Noise kernel: params uniform (28 B) + output storage (16 B/cell)
    pub const COMPUTE_PERLIN: &str = "compute_perlin.wgsl";
    /// Color kernel: dims uniform (8 B) + height/color/moisture storage
    pub const COMPUTE_NOISE_TO_COLORS: &str = "compute_noise_to_colors.wgsl";
    /// Terrain render shader (`vs` / `fs`)
    pub const TERRAIN: &str = "shader.wgsl";
}

pub mod embedded {
    pub const COMPUTE_PERLIN: &str = include_str!("../../../shaders/compute_perlin.wgsl");
    pub const COMPUTE_NOISE_TO_COLORS: &str =
        include_str!("../../../shaders/compute_noise_to_colors.wgsl");
    pub const TERRAIN: &str = include_str!("../../../shaders/shader.wgsl");
}

/// All shader artifacts the terrain pipelines need.
pub struct ShaderSet {
    pub compute_perlin: ShaderSource,
    pub compute_noise_to_colors: ShaderSource,
    pub terrain: ShaderSource,
}

impl ShaderSet {
    pub fn embedded() -> Self {
        Self {
            compute_perlin: ShaderSource::Embedded(embedded::COMPUTE_PERLIN),
            compute_noise_to_colors: ShaderSource::Embedded(embedded::COMPUTE_NOISE_TO_COLORS),
            terrain: ShaderSource::Embedded(embedded::TERRAIN),
        }
    }

    /// Load every artifact from `dir`. All three must be present.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "loading shader artifacts from override directory");
        Ok(Self {
            compute_perlin: load_shader_file(dir.join(paths::COMPUTE_PERLIN))?,
            compute_noise_to_colors: load_shader_file(dir.join(paths::COMPUTE_NOISE_TO_COLORS))?,
            terrain: load_shader_file(dir.join(paths::TERRAIN))?,
        })
    }

    /// Embedded set, or the override directory when one is configured.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, ConfigError> {
        match override_dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::embedded()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_source_embedded() {
        let source = ShaderSource::Embedded("@compute fn main() {}");
        assert_eq!(source.as_str(), "@compute fn main() {}");
    }

    #[test]
    fn test_shader_source_runtime() {
        let source = ShaderSource::Runtime("fn f() {}".to_string());
        assert_eq!(source.as_str(), "fn f() {}");
    }

    #[test]
    fn test_embedded_set_has_entry_points() {
        let set = ShaderSet::embedded();
        assert!(set.compute_perlin.as_str().contains("fn main"));
        assert!(set.compute_noise_to_colors.as_str().contains("fn main"));
        assert!(set.terrain.as_str().contains("fn vs"));
        assert!(set.terrain.as_str().contains("fn fs"));
    }

    #[test]
    fn test_missing_override_dir_is_config_error() {
        let err = ShaderSet::from_dir("/nonexistent/terrain-shaders").err().unwrap();
        assert!(matches!(err, ConfigError::ShaderArtifact { .. }));
    }

    #[test]
    fn test_override_dir_loads_runtime_sources() {
        let dir = std::env::temp_dir().join(format!("terrain-shaders-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in [paths::COMPUTE_PERLIN, paths::COMPUTE_NOISE_TO_COLORS, paths::TERRAIN] {
            std::fs::write(dir.join(name), format!("// {name}")).unwrap();
        }
        let set = ShaderSet::resolve(Some(&dir)).unwrap();
        assert!(matches!(set.terrain, ShaderSource::Runtime(_)));
        assert_eq!(set.compute_perlin.as_str(), "// compute_perlin.wgsl");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
