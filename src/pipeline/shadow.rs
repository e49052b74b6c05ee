//! Shadow-map pass: atlas ownership, split assignment and shadow globals
//!
//! All shadow maps render into one atlas. Spot lights get one split each in
//! scan order while capacity remains; the sun renders through the cascaded
//! (CSM) path with its own matrix array and never consumes a regular split.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::PipelineResult;
use crate::gpu::{
    CommandStream, GpuResources, TextureDescriptor, TextureDimension, TextureFormat,
    TextureHandle, TextureUsage,
};
use crate::scene::{Camera, LightKind, WorldSnapshot};
use crate::shader_config::{
    CSM_MAX_CASCADES, MAX_SHADOW_SPLITS, SHADOW_ATLAS_SIZE, SHADOW_SPLIT_BORDER,
};

/// Keyword selecting the fixed-kernel PCF filter in the lighting shaders
pub const SHADOW_FILTER_KEYWORD: &str = "_SHADOW_FILTER_FIXED_SIZE_PCF";

/// Shader-ready shadow state for one frame
#[derive(Debug, Clone)]
pub struct ShadowData {
    pub shadow_matrices: [Mat4; MAX_SHADOW_SPLITS],
    /// `(u0, v0, u1, v1)` of each split in atlas uv space, border excluded
    pub shadow_split_uv_range: [Vec4; MAX_SHADOW_SPLITS],
    /// `(normal bias, depth slope bias, 0, 0)` per split
    pub shadow_normal_bias: [Vec4; MAX_SHADOW_SPLITS],
    pub num_splits: usize,
    pub cascade_count: usize,
    pub csm_shadow_matrices: [Mat4; CSM_MAX_CASCADES],
    pub csm_valid_uv: [Vec4; CSM_MAX_CASCADES],
    pub csm_normal_bias: Vec4,
}

impl Default for ShadowData {
    fn default() -> Self {
        Self {
            shadow_matrices: [Mat4::IDENTITY; MAX_SHADOW_SPLITS],
            shadow_split_uv_range: [Vec4::ZERO; MAX_SHADOW_SPLITS],
            shadow_normal_bias: [Vec4::ZERO; MAX_SHADOW_SPLITS],
            num_splits: 0,
            cascade_count: 0,
            csm_shadow_matrices: [Mat4::IDENTITY; CSM_MAX_CASCADES],
            csm_valid_uv: [Vec4::ZERO; CSM_MAX_CASCADES],
            csm_normal_bias: Vec4::ZERO,
        }
    }
}

/// Shelf allocator over the shadow atlas
struct AtlasAllocator {
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl AtlasAllocator {
    fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
        }
    }

    /// Reserve a square cell, returning its uv range with the border inset
    fn allocate(&mut self, resolution: u32) -> Option<Vec4> {
        let cell = resolution + 2 * SHADOW_SPLIT_BORDER;
        if cell > SHADOW_ATLAS_SIZE {
            return None;
        }
        if self.cursor_x + cell > SHADOW_ATLAS_SIZE {
            self.cursor_x = 0;
            self.cursor_y += self.row_height;
            self.row_height = 0;
        }
        if self.cursor_y + cell > SHADOW_ATLAS_SIZE {
            return None;
        }

        let x = self.cursor_x + SHADOW_SPLIT_BORDER;
        let y = self.cursor_y + SHADOW_SPLIT_BORDER;
        self.cursor_x += cell;
        self.row_height = self.row_height.max(cell);

        let inv = 1.0 / SHADOW_ATLAS_SIZE as f32;
        Some(Vec4::new(
            x as f32 * inv,
            y as f32 * inv,
            (x + resolution) as f32 * inv,
            (y + resolution) as f32 * inv,
        ))
    }
}

/// Owns the shadow atlas and derives the per-frame shadow state
pub struct ShadowMapPass {
    atlas: Option<TextureHandle>,
    data: ShadowData,
}

impl ShadowMapPass {
    pub fn new() -> Self {
        Self {
            atlas: None,
            data: ShadowData::default(),
        }
    }

    pub fn data(&self) -> &ShadowData {
        &self.data
    }

    pub fn init(&mut self, gpu: &mut GpuResources) {
        self.atlas = Some(gpu.create_texture(TextureDescriptor {
            label: Some("shadow atlas".to_string()),
            width: SHADOW_ATLAS_SIZE,
            height: SHADOW_ATLAS_SIZE,
            dimension: TextureDimension::D2,
            mip_levels: 1,
            format: TextureFormat::Shadowmap,
            usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        }));
    }

    pub fn dispose(&mut self, gpu: &mut GpuResources) -> PipelineResult<()> {
        if let Some(atlas) = self.atlas.take() {
            gpu.release_texture(atlas)?;
        }
        Ok(())
    }

    pub fn atlas(&self) -> Option<TextureHandle> {
        self.atlas
    }

    /// Assign splits and derive shadow matrices for the frame.
    ///
    /// Mutates the snapshot's lights: every shadow-casting spot gets its
    /// split index (scan order, while capacity remains), everything else
    /// reads -1.
    pub fn build(&mut self, snapshot: &mut WorldSnapshot, camera: &Camera) {
        self.data = ShadowData::default();
        let mut allocator = AtlasAllocator::new();

        for light in snapshot.all_punctual_lights.iter_mut() {
            light.shadow_split_index = -1;
            if !light.cast_shadows || light.kind != LightKind::Spot {
                continue;
            }
            if self.data.num_splits >= MAX_SHADOW_SPLITS {
                log::warn!(
                    "Maximum number of shadow splits reached ({}), remaining casters are unshadowed",
                    MAX_SHADOW_SPLITS
                );
                break;
            }
            let Some(uv_range) = allocator.allocate(light.shadow.shadow_map_resolution) else {
                log::warn!("Shadow atlas is full, remaining casters are unshadowed");
                break;
            };

            let i = self.data.num_splits;
            light.shadow_split_index = i as i32;
            self.data.shadow_matrices[i] = spot_shadow_matrix(
                light.position,
                light.direction,
                light.outer_cone_angle,
                light.shadow.near_plane,
                light.shadow.far_plane.max(light.range),
            );
            self.data.shadow_split_uv_range[i] = uv_range;
            self.data.shadow_normal_bias[i] = Vec4::new(
                light.shadow.normal_bias,
                light.shadow.depth_slope_bias,
                0.0,
                0.0,
            );
            self.data.num_splits += 1;
        }

        if let Some(sun) = &mut snapshot.sun_light {
            debug_assert!(sun.shadow_split_index <= 0);
            if sun.cast_shadows {
                let cascades = sun.shadow.directional_split_count();
                self.data.cascade_count = cascades;
                self.data.csm_normal_bias = Vec4::new(
                    sun.shadow.normal_bias,
                    sun.shadow.depth_slope_bias,
                    0.0,
                    0.0,
                );
                let shadow_far = snapshot.shadow_distance.y;
                for cascade in 0..cascades {
                    let extent = shadow_far * (cascade + 1) as f32 / cascades as f32;
                    self.data.csm_shadow_matrices[cascade] = directional_shadow_matrix(
                        camera.position,
                        sun.direction,
                        extent,
                        sun.shadow.near_plane,
                        shadow_far,
                    );
                    self.data.csm_valid_uv[cascade] = allocator
                        .allocate(sun.shadow.shadow_map_resolution)
                        .unwrap_or(Vec4::ZERO);
                }
            }
        }
    }

    /// Publish the shadow globals for the frame
    pub fn setup(&self, cmd: &mut CommandStream, snapshot: &WorldSnapshot) {
        if let Some(atlas) = self.atlas {
            cmd.set_global_texture("g_ShadowTexture", atlas);
        }
        cmd.set_global_vec4(
            "g_ShadowDistanceFalloff",
            distance_falloff(snapshot.shadow_distance, snapshot.shadow_distance_fade),
        );
        cmd.set_global_vec4_array("g_ShadowNormalBias", &self.data.shadow_normal_bias);
        cmd.set_global_mat4_array("g_ShadowSplitMatrices", &self.data.shadow_matrices);
        cmd.set_global_vec4_array("g_ShadowSplitUvRange", &self.data.shadow_split_uv_range);
        cmd.set_global_int("g_NumOfCsmCascades", self.data.cascade_count as i32);
        cmd.set_global_mat4_array("g_CsmShadowMatrices", &self.data.csm_shadow_matrices);
        cmd.set_global_vec4_array("g_CsmCascadeValidUv", &self.data.csm_valid_uv);
        cmd.set_global_vec4("g_CsmNormalBias", self.data.csm_normal_bias);
        cmd.enable_keyword(SHADOW_FILTER_KEYWORD);
    }
}

impl Default for ShadowMapPass {
    fn default() -> Self {
        Self::new()
    }
}

/// `(near, far, fade scale, fade offset)` as the shaders unpack it
fn distance_falloff(distance: Vec2, fade: Vec2) -> Vec4 {
    Vec4::new(distance.x, distance.y, fade.x, fade.y)
}

fn shadow_up_vector(direction: Vec3) -> Vec3 {
    if direction.dot(Vec3::Y).abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    }
}

fn spot_shadow_matrix(position: Vec3, direction: Vec3, fov: f32, near: f32, far: f32) -> Mat4 {
    let view = Mat4::look_at_rh(position, position + direction, shadow_up_vector(direction));
    let projection = Mat4::perspective_rh(fov.max(0.01), 1.0, near, far);
    projection * view
}

fn directional_shadow_matrix(
    focus: Vec3,
    direction: Vec3,
    extent: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let eye = focus - direction * far;
    let view = Mat4::look_at_rh(eye, focus, shadow_up_vector(direction));
    let projection = Mat4::orthographic_rh(-extent, extent, -extent, extent, near, far * 2.0);
    projection * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{CameraId, Light};

    fn shadowed_spot(x: f32) -> Light {
        let mut light = Light::spot(
            Vec3::new(x, 0.0, 0.0),
            Vec3::NEG_Z,
            Vec3::ONE,
            1.0,
            5.0,
            0.3,
            0.5,
        );
        light.cast_shadows = true;
        light
    }

    fn camera() -> Camera {
        Camera::new(CameraId(1), 128, 128)
    }

    #[test]
    fn atlas_lifecycle() {
        let mut gpu = GpuResources::new();
        let mut pass = ShadowMapPass::new();
        pass.init(&mut gpu);
        let atlas = pass.atlas().unwrap();
        assert!(gpu.is_alive(atlas));
        assert_eq!(
            gpu.descriptor(atlas).unwrap().format,
            TextureFormat::Shadowmap
        );

        pass.dispose(&mut gpu).unwrap();
        assert!(!gpu.is_alive(atlas));
        assert_eq!(gpu.live_count(), 0);
    }

    #[test]
    fn splits_assigned_in_scan_order() {
        let mut snapshot = WorldSnapshot::new();
        let mut unshadowed = Light::point(Vec3::ZERO, Vec3::ONE, 1.0, 5.0);
        unshadowed.cast_shadows = true; // points have no shadow path
        snapshot.all_punctual_lights =
            vec![shadowed_spot(1.0), unshadowed, shadowed_spot(2.0)];

        let mut pass = ShadowMapPass::new();
        pass.build(&mut snapshot, &camera());

        assert_eq!(snapshot.all_punctual_lights[0].shadow_split_index, 0);
        assert_eq!(snapshot.all_punctual_lights[1].shadow_split_index, -1);
        assert_eq!(snapshot.all_punctual_lights[2].shadow_split_index, 1);
        assert_eq!(pass.data().num_splits, 2);
    }

    #[test]
    fn split_uv_ranges_do_not_overlap() {
        let mut snapshot = WorldSnapshot::new();
        snapshot.all_punctual_lights = vec![shadowed_spot(1.0), shadowed_spot(2.0)];

        let mut pass = ShadowMapPass::new();
        pass.build(&mut snapshot, &camera());

        let a = pass.data().shadow_split_uv_range[0];
        let b = pass.data().shadow_split_uv_range[1];
        for range in [a, b] {
            assert!(range.x >= 0.0 && range.z <= 1.0);
            assert!(range.y >= 0.0 && range.w <= 1.0);
            assert!(range.x < range.z && range.y < range.w);
        }
        // Same shelf row, disjoint in u
        assert!(a.z <= b.x || b.z <= a.x);
    }

    #[test]
    fn sun_uses_cascades_not_splits() {
        let mut sun = Light::directional(Vec3::NEG_Y, Vec3::ONE, 1.0);
        sun.cast_shadows = true;
        sun.shadow.num_of_splits = 2;

        let mut snapshot = WorldSnapshot::new();
        snapshot.all_punctual_lights = vec![sun.clone()];
        snapshot.sun_light = Some(sun);
        snapshot.shadow_distance = Vec2::new(0.1, 100.0);

        let mut pass = ShadowMapPass::new();
        pass.build(&mut snapshot, &camera());

        assert_eq!(pass.data().num_splits, 0);
        assert_eq!(pass.data().cascade_count, 2);
        assert!(snapshot.sun_light.as_ref().unwrap().shadow_split_index <= 0);
    }

    #[test]
    fn setup_publishes_shadow_globals() {
        let mut gpu = GpuResources::new();
        let mut snapshot = WorldSnapshot::new();
        snapshot.all_punctual_lights = vec![shadowed_spot(1.0)];
        snapshot.shadow_distance = Vec2::new(0.1, 50.0);
        snapshot.shadow_distance_fade = Vec2::new(-0.1, 5.0);

        let mut pass = ShadowMapPass::new();
        pass.init(&mut gpu);
        pass.build(&mut snapshot, &camera());

        let mut cmd = CommandStream::new();
        pass.setup(&mut cmd, &snapshot);

        assert_eq!(cmd.global_texture("g_ShadowTexture"), pass.atlas());
        assert_eq!(
            cmd.global_vec4("g_ShadowDistanceFalloff"),
            Some(Vec4::new(0.1, 50.0, -0.1, 5.0))
        );
        assert_eq!(cmd.global_int("g_NumOfCsmCascades"), Some(0));
        assert!(cmd.is_keyword_enabled(SHADOW_FILTER_KEYWORD));
        assert_eq!(
            cmd.global_mat4_array("g_ShadowSplitMatrices").unwrap().len(),
            MAX_SHADOW_SPLITS
        );

        pass.dispose(&mut gpu).unwrap();
    }
}
