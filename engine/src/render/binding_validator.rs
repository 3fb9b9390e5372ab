//! Shader Binding Validator
//!
//! Checks the Rust-side bind group layouts against the bindings the WGSL
//! artifacts declare, at pipeline creation time. A mismatch here would
//! otherwise surface as a GPU validation error on the first dispatch or draw.
//!
//! The expectations below are the canonical description of the shader
//! interface; `tests/shader_contracts.rs` checks the WGSL side of it.

use std::fmt;

use tracing::{debug, error};

#[derive(Debug, Clone)]
struct ExpectedBinding {
    binding: u32,
    binding_type: ExpectedBindingType,
    label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedBindingType {
    UniformBuffer,
    StorageBufferReadOnly,
    StorageBufferReadWrite,
    Other,
}

impl fmt::Display for ExpectedBindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniformBuffer => write!(f, "uniform buffer"),
            Self::StorageBufferReadOnly => write!(f, "storage buffer (read-only)"),
            Self::StorageBufferReadWrite => write!(f, "storage buffer (read-write)"),
            Self::Other => write!(f, "non-buffer binding"),
        }
    }
}

struct ExpectedBindGroup {
    pipeline_name: &'static str,
    bindings: &'static [ExpectedBinding],
}

const fn uniform(binding: u32, label: &'static str) -> ExpectedBinding {
    ExpectedBinding {
        binding,
        binding_type: ExpectedBindingType::UniformBuffer,
        label,
    }
}

const fn storage_ro(binding: u32, label: &'static str) -> ExpectedBinding {
    ExpectedBinding {
        binding,
        binding_type: ExpectedBindingType::StorageBufferReadOnly,
        label,
    }
}

const fn storage_rw(binding: u32, label: &'static str) -> ExpectedBinding {
    ExpectedBinding {
        binding,
        binding_type: ExpectedBindingType::StorageBufferReadWrite,
        label,
    }
}

/// compute_perlin.wgsl, group 0
const NOISE_BINDINGS: ExpectedBindGroup = ExpectedBindGroup {
    pipeline_name: "Noise Field",
    bindings: &[uniform(0, "NoiseParams"), storage_rw(1, "output")],
};

/// compute_noise_to_colors.wgsl, group 0
const COLOR_BINDINGS: ExpectedBindGroup = ExpectedBindGroup {
    pipeline_name: "Color Field",
    bindings: &[
        uniform(0, "GridDims"),
        storage_ro(1, "heights"),
        storage_rw(2, "colors"),
        storage_ro(3, "moisture"),
    ],
};

/// shader.wgsl, group 0
const TERRAIN_BINDINGS: ExpectedBindGroup = ExpectedBindGroup {
    pipeline_name: "Terrain Render",
    bindings: &[uniform(0, "Camera"), storage_ro(1, "heights"), storage_ro(2, "colors")],
};

fn classify_entry(entry: &wgpu::BindGroupLayoutEntry) -> ExpectedBindingType {
    match &entry.ty {
        wgpu::BindingType::Buffer { ty, .. } => match ty {
            wgpu::BufferBindingType::Uniform => ExpectedBindingType::UniformBuffer,
            wgpu::BufferBindingType::Storage { read_only: true } => {
                ExpectedBindingType::StorageBufferReadOnly
            }
            wgpu::BufferBindingType::Storage { read_only: false } => {
                ExpectedBindingType::StorageBufferReadWrite
            }
        },
        _ => ExpectedBindingType::Other,
    }
}

/// Returns the number of mismatches found.
fn validate_bind_group(
    expected: &ExpectedBindGroup,
    actual_entries: &[wgpu::BindGroupLayoutEntry],
) -> u32 {
    let mut mismatches = 0u32;

    for exp in expected.bindings {
        match actual_entries.iter().find(|e| e.binding == exp.binding) {
            None => {
                error!(
                    pipeline = expected.pipeline_name,
                    binding = exp.binding,
                    expected = %exp.binding_type,
                    label = exp.label,
                    "binding missing from layout"
                );
                mismatches += 1;
            }
            Some(actual) => {
                let actual_type = classify_entry(actual);
                if actual_type != exp.binding_type {
                    error!(
                        pipeline = expected.pipeline_name,
                        binding = exp.binding,
                        expected = %exp.binding_type,
                        actual = %actual_type,
                        label = exp.label,
                        "binding type mismatch"
                    );
                    mismatches += 1;
                }
            }
        }
    }

    for actual in actual_entries {
        if !expected.bindings.iter().any(|e| e.binding == actual.binding) {
            error!(
                pipeline = expected.pipeline_name,
                binding = actual.binding,
                actual = %classify_entry(actual),
                "layout has a binding the shader does not declare"
            );
            mismatches += 1;
        }
    }

    if mismatches == 0 {
        debug!(pipeline = expected.pipeline_name, "bindings validated");
    }
    mismatches
}

/// Validate the two compute layouts. Returns total mismatches.
pub fn validate_compute_bindings(
    noise_entries: &[wgpu::BindGroupLayoutEntry],
    color_entries: &[wgpu::BindGroupLayoutEntry],
) -> u32 {
    validate_bind_group(&NOISE_BINDINGS, noise_entries)
        + validate_bind_group(&COLOR_BINDINGS, color_entries)
}

/// Validate the terrain render layout. Returns mismatches.
pub fn validate_render_bindings(entries: &[wgpu::BindGroupLayoutEntry]) -> u32 {
    validate_bind_group(&TERRAIN_BINDINGS, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    const UNIFORM: wgpu::BufferBindingType = wgpu::BufferBindingType::Uniform;
    const RO: wgpu::BufferBindingType = wgpu::BufferBindingType::Storage { read_only: true };
    const RW: wgpu::BufferBindingType = wgpu::BufferBindingType::Storage { read_only: false };

    #[test]
    fn test_matching_compute_layouts_pass() {
        let noise = [buffer_entry(0, UNIFORM), buffer_entry(1, RW)];
        let color = [
            buffer_entry(0, UNIFORM),
            buffer_entry(1, RO),
            buffer_entry(2, RW),
            buffer_entry(3, RO),
        ];
        assert_eq!(validate_compute_bindings(&noise, &color), 0);
    }

    #[test]
    fn test_wrong_access_is_reported() {
        // heights bound read-write instead of read-only
        let entries = [buffer_entry(0, UNIFORM), buffer_entry(1, RW), buffer_entry(2, RO)];
        assert_eq!(validate_render_bindings(&entries), 1);
    }

    #[test]
    fn test_missing_and_extra_bindings_are_reported() {
        let entries = [
            buffer_entry(0, UNIFORM),
            buffer_entry(1, RO),
            buffer_entry(7, RO),
        ];
        // binding 2 missing, binding 7 extra
        assert_eq!(validate_render_bindings(&entries), 2);
    }
}
