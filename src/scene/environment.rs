//! Environment probe (IBL) data

use glam::{Vec3, Vec4};

use crate::gpu::TextureHandle;
use crate::shader_config;

/// Precomputed environment lighting for a scene: a GGX-prefiltered radiance
/// cubemap for specular IBL and nine spherical-harmonics coefficients for
/// low-frequency irradiance.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentProbe {
    /// GGX-prefiltered radiance environment map
    pub filtered_radiance: TextureHandle,
    /// Mip count of `filtered_radiance`
    pub mip_count: u32,
    /// SH9 irradiance coefficients, RGB in xyz
    pub irradiance_sh9: [Vec4; 9],
    /// HDR intensity tint
    pub intensity: Vec3,
    /// Whether IBL normalization is applied (published in intensity.w)
    pub normalization: bool,
    /// Rotation around the up axis, degrees
    pub rotation_angle: f32,
}

impl EnvironmentProbe {
    pub fn new(filtered_radiance: TextureHandle, mip_count: u32) -> Self {
        Self {
            filtered_radiance,
            mip_count,
            irradiance_sh9: [Vec4::ZERO; 9],
            intensity: Vec3::ONE,
            normalization: true,
            rotation_angle: 0.0,
        }
    }

    /// Difference between the map's actual mip chain and the mip layout the
    /// shaders were built for
    pub fn mipmap_offset(&self) -> f32 {
        self.mip_count as f32 - shader_config::IBL_NUM_OF_MIP_LEVELS_IN_TOTAL as f32
    }

    /// `(cos phi, -sin phi, sin phi, cos phi)` rotation parameter; identity
    /// rotation when the rotation feature is compiled out
    pub fn rotation_parameter(&self) -> Vec4 {
        let phi = if shader_config::ENVMAP_ROTATION {
            self.rotation_angle.to_radians()
        } else {
            0.0
        };
        let (sin_phi, cos_phi) = phi.sin_cos();
        Vec4::new(cos_phi, -sin_phi, sin_phi, cos_phi)
    }
}
