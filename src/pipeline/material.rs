//! Per-frame camera, exposure and debug-view globals

use glam::{Vec3, Vec4};

use crate::gpu::CommandStream;
use crate::scene::{Camera, CommonSetting, ViewMode};

/// Publish the primary camera's frame globals
pub fn setup_primary_camera(
    cmd: &mut CommandStream,
    settings: &CommonSetting,
    camera: &Camera,
    frame_index: u64,
) {
    let exposure = settings.fixed_exposure;
    cmd.set_global_vec4(
        "g_ExposureValue",
        Vec4::new(exposure.exp2(), (-exposure).exp2(), 0.0, 0.0),
    );
    cmd.set_global_vec4("g_ScreenParams", camera.screen_params());
    cmd.set_global_vec4(
        "g_FrameIndexModX",
        Vec4::new(
            (frame_index % 4) as f32,
            (frame_index % 8) as f32,
            (frame_index % 16) as f32,
            0.0,
        ),
    );
    cmd.set_global_vec4("g_ViewCameraPosition", camera.position.extend(1.0));
    cmd.set_global_vec4("g_ViewCameraDirection", camera.forward.extend(0.0));
    cmd.set_global_mat4("g_ViewCameraViewProjMat", camera.view_proj());
    cmd.set_global_mat4("g_ViewCameraInvViewProjMat", camera.view_proj().inverse());
}

/// Publish the editor debug-view overrides for the active view mode.
///
/// `Lit` publishes pass-through overrides (w = 1 keeps the material color);
/// the detail modes replace albedo with flat grey so lighting structure is
/// visible on its own.
pub fn setup_debug_options(cmd: &mut CommandStream, settings: &CommonSetting) {
    let (diffuse, specular) = match settings.view_mode {
        ViewMode::Lit => (
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ),
        ViewMode::DetailLighting => (
            Vec3::splat(0.3).extend(0.0),
            Vec3::splat(0.1).extend(0.0),
        ),
        ViewMode::LightingOnly => (Vec3::splat(0.3).extend(0.0), Vec4::ZERO),
    };
    cmd.set_global_int(
        "g_DebugFlagsLightingComponents",
        settings.lighting_components.bits() as i32,
    );
    cmd.set_global_vec4("g_DebugDiffuseOverrideParameter", diffuse);
    cmd.set_global_vec4("g_DebugSpecularOverrideParameter", specular);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::CameraId;
    use approx::assert_relative_eq;

    #[test]
    fn exposure_publishes_scale_and_inverse() {
        let settings = CommonSetting {
            fixed_exposure: 2.0,
            ..Default::default()
        };
        let camera = Camera::new(CameraId(1), 128, 128);
        let mut cmd = CommandStream::new();
        setup_primary_camera(&mut cmd, &settings, &camera, 0);

        let exposure = cmd.global_vec4("g_ExposureValue").unwrap();
        assert_relative_eq!(exposure.x, 4.0);
        assert_relative_eq!(exposure.y, 0.25);
    }

    #[test]
    fn frame_index_wraps_per_component() {
        let settings = CommonSetting::default();
        let camera = Camera::new(CameraId(1), 128, 128);
        let mut cmd = CommandStream::new();
        setup_primary_camera(&mut cmd, &settings, &camera, 21);

        let frame = cmd.global_vec4("g_FrameIndexModX").unwrap();
        assert_eq!(frame.x, 1.0); // 21 % 4
        assert_eq!(frame.y, 5.0); // 21 % 8
        assert_eq!(frame.z, 5.0); // 21 % 16
    }

    #[test]
    fn debug_overrides_per_view_mode() {
        let mut cmd = CommandStream::new();

        let lit = CommonSetting::default();
        setup_debug_options(&mut cmd, &lit);
        assert_eq!(
            cmd.global_vec4("g_DebugDiffuseOverrideParameter"),
            Some(Vec4::new(0.0, 0.0, 0.0, 1.0))
        );

        let lighting_only = CommonSetting {
            view_mode: ViewMode::LightingOnly,
            ..Default::default()
        };
        setup_debug_options(&mut cmd, &lighting_only);
        assert_eq!(
            cmd.global_vec4("g_DebugDiffuseOverrideParameter"),
            Some(Vec4::new(0.3, 0.3, 0.3, 0.0))
        );
        assert_eq!(
            cmd.global_vec4("g_DebugSpecularOverrideParameter"),
            Some(Vec4::ZERO)
        );
    }
}
