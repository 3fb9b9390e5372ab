//! Terrain Parameters
//!
//! Scalar inputs to one generation run, their documented ranges, and the
//! defensive sanitation applied before any GPU work starts.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Grid sizes are quantized to this step (and the render aspect ratio uses it too).
pub const GRID_QUANTUM: u32 = 64;

/// Each field cell is four `f32` channels; the fourth is reserved for alignment.
pub const BYTES_PER_CELL: u64 = 16;

/// Inclusive range with the value a fresh settings panel starts at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const GRID_SIZE_RANGE: ParamRange = ParamRange::new(64.0, 2304.0, 1024.0);
pub const SCALE_RANGE: ParamRange = ParamRange::new(100.0, 500.0, 250.0);
pub const OCTAVES_RANGE: ParamRange = ParamRange::new(1.0, 12.0, 8.0);
pub const PERSISTENCE_RANGE: ParamRange = ParamRange::new(0.1, 1.0, 0.5);
pub const LACUNARITY_RANGE: ParamRange = ParamRange::new(1.1, 4.0, 2.0);

/// Monotonically increasing identity of a terrain instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationId(pub u64);

impl GenerationId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for GenerationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generation parameters for one terrain instance.
///
/// Immutable once a run starts: the scheduler copies the value into the
/// instance and never reads external state again for that run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainParameters {
    pub grid_size: u32,
    pub noise_scale: f32,
    pub octaves: i32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub seed: i32,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE_RANGE.default as u32,
            noise_scale: SCALE_RANGE.default,
            octaves: OCTAVES_RANGE.default as i32,
            persistence: PERSISTENCE_RANGE.default,
            lacunarity: LACUNARITY_RANGE.default,
            seed: rand::random(),
        }
    }
}

impl TerrainParameters {
    /// Reject values no amount of clamping can repair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("noiseScale", self.noise_scale),
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    /// Validate, then clamp every value into its documented range and
    /// truncate the grid size to a multiple of [`GRID_QUANTUM`].
    pub fn sanitized(&self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(Self {
            grid_size: quantize_grid_size(self.grid_size),
            noise_scale: SCALE_RANGE.clamp(self.noise_scale),
            octaves: self
                .octaves
                .clamp(OCTAVES_RANGE.min as i32, OCTAVES_RANGE.max as i32),
            persistence: PERSISTENCE_RANGE.clamp(self.persistence),
            lacunarity: LACUNARITY_RANGE.clamp(self.lacunarity),
            seed: self.seed,
        })
    }

    /// Grid is always square.
    pub fn grid_dims(&self) -> (u32, u32) {
        (self.grid_size, self.grid_size)
    }
}

/// Round down to a multiple of `multiple` (0 stays 0).
pub fn round_down_to_multiple(value: u32, multiple: u32) -> u32 {
    (value / multiple) * multiple
}

/// Truncate to a multiple of 64 within [64, 2304].
pub fn quantize_grid_size(grid_size: u32) -> u32 {
    let min = GRID_SIZE_RANGE.min as u32;
    let max = GRID_SIZE_RANGE.max as u32;
    round_down_to_multiple(grid_size, GRID_QUANTUM).clamp(min, max)
}

/// Byte size of one height/moisture/color field for a square grid.
pub fn field_byte_size(grid_size: u32) -> u64 {
    grid_size as u64 * grid_size as u64 * BYTES_PER_CELL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TerrainParameters {
        TerrainParameters {
            grid_size: 1024,
            noise_scale: 250.0,
            octaves: 8,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 42,
        }
    }

    #[test]
    fn test_field_byte_size_for_every_valid_grid() {
        for grid in (64..=2304).step_by(64) {
            assert_eq!(field_byte_size(grid), grid as u64 * grid as u64 * 16);
        }
    }

    #[test]
    fn test_quantize_truncates_to_multiple_of_64() {
        assert_eq!(quantize_grid_size(1000), 960);
        assert_eq!(quantize_grid_size(1024), 1024);
        assert_eq!(quantize_grid_size(127), 64);
    }

    #[test]
    fn test_quantize_clamps_to_range() {
        assert_eq!(quantize_grid_size(0), 64);
        assert_eq!(quantize_grid_size(10), 64);
        assert_eq!(quantize_grid_size(100_000), 2304);
    }

    #[test]
    fn test_sanitized_keeps_valid_params() {
        let p = params();
        assert_eq!(p.sanitized().unwrap(), p);
    }

    #[test]
    fn test_sanitized_clamps_out_of_range() {
        let p = TerrainParameters {
            grid_size: 5000,
            noise_scale: 10.0,
            octaves: 40,
            persistence: 3.0,
            lacunarity: 0.0,
            seed: -7,
        };
        let s = p.sanitized().unwrap();
        assert_eq!(s.grid_size, 2304);
        assert_eq!(s.noise_scale, 100.0);
        assert_eq!(s.octaves, 12);
        assert_eq!(s.persistence, 1.0);
        assert_eq!(s.lacunarity, 1.1);
        assert_eq!(s.seed, -7);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut p = params();
        p.persistence = f32::NAN;
        assert!(matches!(
            p.sanitized(),
            Err(ConfigError::NonFinite { field: "persistence", .. })
        ));

        let mut p = params();
        p.noise_scale = f32::INFINITY;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_generation_id_is_monotonic() {
        let id = GenerationId::default();
        assert!(id.next() > id);
        assert_eq!(id.next().next(), GenerationId(2));
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let p: TerrainParameters =
            serde_json::from_str(r#"{ "gridSize": 512, "seed": 9 }"#).unwrap();
        assert_eq!(p.grid_size, 512);
        assert_eq!(p.seed, 9);
        assert_eq!(p.octaves, 8);
        assert_eq!(p.noise_scale, 250.0);
    }
}
