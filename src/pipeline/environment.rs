//! Environment (IBL) global publication
//!
//! When the scene has no probe, the fallback must fully overwrite every
//! global a previous frame may have published, since the globals persist
//! across frames on the GPU side.

use glam::Vec4;

use crate::gpu::{CommandStream, GpuResources};
use crate::scene::EnvironmentProbe;

pub fn publish_environment(
    cmd: &mut CommandStream,
    gpu: &GpuResources,
    probe: Option<&EnvironmentProbe>,
) {
    match probe {
        Some(probe) => {
            cmd.set_global_float("g_EnvmapMipmapOffset", probe.mipmap_offset());
            cmd.set_global_texture("g_EnvmapFilterWithGGX", probe.filtered_radiance);
            cmd.set_global_vec4_array("g_EnvmapSH9Coeffs", &probe.irradiance_sh9);
            cmd.set_global_vec4(
                "g_EnvmapIntensity",
                probe
                    .intensity
                    .extend(if probe.normalization { 1.0 } else { 0.0 }),
            );
            cmd.set_global_vec4("g_EnvmapRotationParam", probe.rotation_parameter());
        }
        None => {
            cmd.set_global_float("g_EnvmapMipmapOffset", 0.0);
            cmd.set_global_texture("g_EnvmapFilterWithGGX", gpu.black_texture());
            cmd.set_global_vec4_array("g_EnvmapSH9Coeffs", &[Vec4::ZERO; 9]);
            cmd.set_global_vec4("g_EnvmapIntensity", Vec4::ZERO);
            cmd.set_global_vec4("g_EnvmapRotationParam", Vec4::ZERO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::TextureDescriptor;
    use glam::Vec3;

    #[test]
    fn probe_publication() {
        let mut gpu = GpuResources::new();
        let radiance = gpu.create_texture(TextureDescriptor::default());
        let mut probe = EnvironmentProbe::new(radiance, 9);
        probe.intensity = Vec3::new(2.0, 2.0, 2.0);
        probe.normalization = true;
        probe.irradiance_sh9[0] = Vec4::splat(0.5);

        let mut cmd = CommandStream::new();
        publish_environment(&mut cmd, &gpu, Some(&probe));

        assert_eq!(cmd.global_float("g_EnvmapMipmapOffset"), Some(0.0));
        assert_eq!(cmd.global_texture("g_EnvmapFilterWithGGX"), Some(radiance));
        assert_eq!(
            cmd.global_vec4("g_EnvmapIntensity"),
            Some(Vec4::new(2.0, 2.0, 2.0, 1.0))
        );
        let sh9 = cmd.global_vec4_array("g_EnvmapSH9Coeffs").unwrap();
        assert_eq!(sh9.len(), 9);
        assert_eq!(sh9[0], Vec4::splat(0.5));
    }

    #[test]
    fn fallback_overwrites_previous_probe_frame() {
        let mut gpu = GpuResources::new();
        let radiance = gpu.create_texture(TextureDescriptor::default());
        let mut probe = EnvironmentProbe::new(radiance, 11);
        probe.irradiance_sh9 = [Vec4::ONE; 9];
        probe.rotation_angle = 45.0;

        let mut cmd = CommandStream::new();
        publish_environment(&mut cmd, &gpu, Some(&probe));
        // Next frame: probe removed, globals persist until overwritten
        cmd.clear();
        publish_environment(&mut cmd, &gpu, None);

        assert_eq!(cmd.global_float("g_EnvmapMipmapOffset"), Some(0.0));
        assert_eq!(
            cmd.global_texture("g_EnvmapFilterWithGGX"),
            Some(gpu.black_texture())
        );
        assert_eq!(cmd.global_vec4("g_EnvmapIntensity"), Some(Vec4::ZERO));
        assert_eq!(cmd.global_vec4("g_EnvmapRotationParam"), Some(Vec4::ZERO));
        assert!(cmd
            .global_vec4_array("g_EnvmapSH9Coeffs")
            .unwrap()
            .iter()
            .all(|v| *v == Vec4::ZERO));
    }
}
