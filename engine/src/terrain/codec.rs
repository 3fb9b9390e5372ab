//! Generation Parameter Codec
//!
//! Host-side mirrors of the uniform records consumed by the compute kernels.
//! Layouts must match the WGSL structs in `shaders/compute_perlin.wgsl` and
//! `shaders/compute_noise_to_colors.wgsl` exactly; both are plain scalar
//! records in native byte order.

use rand::Rng;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use super::params::{
    LACUNARITY_RANGE, OCTAVES_RANGE, PERSISTENCE_RANGE, SCALE_RANGE, TerrainParameters,
};
use crate::error::EncodingError;

pub const GENERATION_PARAMS_SIZE: usize = 28;
pub const GRID_DIMS_SIZE: usize = 8;

/// `NoiseParams` uniform of the noise kernel.
///
/// Layout (28 bytes):
/// - grid_width: i32, grid_height: i32
/// - noise_scale: f32, octaves: i32, persistence: f32, lacunarity: f32
/// - seed: i32
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuGenerationParams {
    pub grid_width: i32,
    pub grid_height: i32,
    pub noise_scale: f32,
    pub octaves: i32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub seed: i32,
}

const_assert_eq!(std::mem::size_of::<GpuGenerationParams>(), GENERATION_PARAMS_SIZE);

/// `GridDims` uniform of the color kernel (8 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuGridDims {
    pub width: i32,
    pub height: i32,
}

const_assert_eq!(std::mem::size_of::<GpuGridDims>(), GRID_DIMS_SIZE);

/// Which field a params record drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamVariant {
    /// Heightfield: parameters copied verbatim.
    Primary,
    /// Moisture field: seed + 1, shape parameters re-sampled from their ranges.
    Secondary,
}

/// How the RNG used for [`ParamVariant::Secondary`] is seeded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoistureSeeding {
    /// Fresh entropy every run; moisture shape differs between runs with the same seed.
    #[default]
    Independent,
    /// Seeded from the public seed; the whole terrain is reproducible.
    Derived,
}

impl MoistureSeeding {
    pub fn toggled(self) -> Self {
        match self {
            Self::Independent => Self::Derived,
            Self::Derived => Self::Independent,
        }
    }
}

impl GpuGenerationParams {
    pub fn to_bytes(&self) -> [u8; GENERATION_PARAMS_SIZE] {
        bytemuck::cast(*self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytemuck::try_pod_read_unaligned(bytes).ok()
    }
}

impl GpuGridDims {
    pub fn to_bytes(&self) -> [u8; GRID_DIMS_SIZE] {
        bytemuck::cast(*self)
    }
}

fn finite(field: &'static str, value: f32) -> Result<f32, EncodingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EncodingError::NonFinite { field, value })
    }
}

/// Build the noise-kernel record for one field of `params`.
///
/// `rng` is only consulted for [`ParamVariant::Secondary`].
pub fn encode_generation_params<R: Rng + ?Sized>(
    params: &TerrainParameters,
    variant: ParamVariant,
    rng: &mut R,
) -> Result<GpuGenerationParams, EncodingError> {
    let noise_scale = finite("noiseScale", params.noise_scale)?;
    let persistence = finite("persistence", params.persistence)?;
    let lacunarity = finite("lacunarity", params.lacunarity)?;
    let (width, height) = params.grid_dims();

    let record = match variant {
        ParamVariant::Primary => GpuGenerationParams {
            grid_width: width as i32,
            grid_height: height as i32,
            noise_scale,
            octaves: params.octaves,
            persistence,
            lacunarity,
            seed: params.seed,
        },
        ParamVariant::Secondary => GpuGenerationParams {
            grid_width: width as i32,
            grid_height: height as i32,
            noise_scale: rng.gen_range(SCALE_RANGE.min..=SCALE_RANGE.max),
            octaves: rng.gen_range(OCTAVES_RANGE.min as i32..=OCTAVES_RANGE.max as i32),
            persistence: rng.gen_range(PERSISTENCE_RANGE.min..=PERSISTENCE_RANGE.max),
            lacunarity: rng.gen_range(LACUNARITY_RANGE.min..=LACUNARITY_RANGE.max),
            seed: params.seed.wrapping_add(1),
        },
    };
    Ok(record)
}

pub fn encode_grid_dims(width: u32, height: u32) -> GpuGridDims {
    GpuGridDims {
        width: width as i32,
        height: height as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

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
    fn test_primary_record_decodes_to_written_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let record = encode_generation_params(&params(), ParamVariant::Primary, &mut rng).unwrap();
        let bytes = record.to_bytes();
        assert_eq!(bytes.len(), 28);

        let decoded = GpuGenerationParams::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.grid_width, 1024);
        assert_eq!(decoded.grid_height, 1024);
        assert_eq!(decoded.noise_scale, 250.0);
        assert_eq!(decoded.octaves, 8);
        assert_eq!(decoded.persistence, 0.5);
        assert_eq!(decoded.lacunarity, 2.0);
        assert_eq!(decoded.seed, 42);
    }

    #[test]
    fn test_field_order_in_native_bytes() {
        let mut rng = StdRng::seed_from_u64(1);
        let bytes = encode_generation_params(&params(), ParamVariant::Primary, &mut rng)
            .unwrap()
            .to_bytes();
        assert_eq!(&bytes[0..4], &1024i32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &250.0f32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &8i32.to_ne_bytes());
        assert_eq!(&bytes[24..28], &42i32.to_ne_bytes());
    }

    #[test]
    fn test_secondary_seed_offset_and_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = params();
        let primary = encode_generation_params(&p, ParamVariant::Primary, &mut rng).unwrap();

        for _ in 0..200 {
            let secondary =
                encode_generation_params(&p, ParamVariant::Secondary, &mut rng).unwrap();
            assert_eq!(secondary.seed - primary.seed, 1);
            assert_eq!(secondary.grid_width, primary.grid_width);
            assert!(SCALE_RANGE.contains(secondary.noise_scale));
            assert!((1..=12).contains(&secondary.octaves));
            assert!(PERSISTENCE_RANGE.contains(secondary.persistence));
            assert!(LACUNARITY_RANGE.contains(secondary.lacunarity));
            assert_ne!(secondary.to_bytes(), primary.to_bytes());
        }
    }

    #[test]
    fn test_secondary_seed_wraps_at_max() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = params();
        p.seed = i32::MAX;
        let secondary = encode_generation_params(&p, ParamVariant::Secondary, &mut rng).unwrap();
        assert_eq!(secondary.seed, i32::MIN);
    }

    #[test]
    fn test_derived_rng_is_reproducible() {
        let p = params();
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = encode_generation_params(&p, ParamVariant::Secondary, &mut rng_a).unwrap();
        let b = encode_generation_params(&p, ParamVariant::Secondary, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_finite_is_encoding_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = params();
        p.lacunarity = f32::NEG_INFINITY;
        let err = encode_generation_params(&p, ParamVariant::Primary, &mut rng).unwrap_err();
        assert!(matches!(err, EncodingError::NonFinite { field: "lacunarity", .. }));

        // Secondary ignores the caller's shape values but still refuses garbage input.
        let err = encode_generation_params(&p, ParamVariant::Secondary, &mut rng).unwrap_err();
        assert!(matches!(err, EncodingError::NonFinite { .. }));
    }

    #[test]
    fn test_grid_dims_record() {
        let dims = encode_grid_dims(256, 256);
        let bytes = dims.to_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &256i32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &256i32.to_ne_bytes());
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert!(GpuGenerationParams::from_bytes(&[0u8; 27]).is_none());
    }

    #[test]
    fn test_moisture_seeding_toggle() {
        assert_eq!(MoistureSeeding::default(), MoistureSeeding::Independent);
        assert_eq!(MoistureSeeding::Independent.toggled(), MoistureSeeding::Derived);
    }
}
