//! Punctual-light loop: packs the snapshot's lights into the fixed-size
//! shader arrays
//!
//! The shaders declare `MAX_PUNCTUAL_LIGHTS` entries per array and index
//! them with `g_NumPunctualLights`, so entries beyond the count are never
//! read and are deliberately left stale rather than re-zeroed.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::gpu::CommandStream;
use crate::scene::{Camera, Light, LightKind, WorldSnapshot};
use crate::shader_config::MAX_PUNCTUAL_LIGHTS;

/// Which light loop implementation the pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightLoopKind {
    #[default]
    Simple,
}

/// Shader-ready punctual light arrays for one frame
#[derive(Debug, Clone)]
pub struct LightLoopState {
    /// `-forward` for spots, zero for points
    pub direction: [Vec4; MAX_PUNCTUAL_LIGHTS],
    /// World position; w carries the soft-shadow source radius in editor
    /// builds and 0 otherwise
    pub position: [Vec4; MAX_PUNCTUAL_LIGHTS],
    pub intensity: [Vec4; MAX_PUNCTUAL_LIGHTS],
    /// `(1/range^2, falloff_exponent, angular_scale, angular_offset)`
    pub falloff: [Vec4; MAX_PUNCTUAL_LIGHTS],
    /// `(light kind id, shadow split index, 0, 0)`
    pub info: [Vec4; MAX_PUNCTUAL_LIGHTS],
    pub num_punctual_lights: usize,
    /// `-forward` of the sun; w carries the source angle in editor builds
    pub dominant_light_direction: Vec4,
    pub dominant_light_intensity: Vec4,
}

impl Default for LightLoopState {
    fn default() -> Self {
        Self {
            direction: [Vec4::ZERO; MAX_PUNCTUAL_LIGHTS],
            position: [Vec4::ZERO; MAX_PUNCTUAL_LIGHTS],
            intensity: [Vec4::ZERO; MAX_PUNCTUAL_LIGHTS],
            falloff: [Vec4::ZERO; MAX_PUNCTUAL_LIGHTS],
            info: [Vec4::ZERO; MAX_PUNCTUAL_LIGHTS],
            num_punctual_lights: 0,
            dominant_light_direction: Vec4::ZERO,
            dominant_light_intensity: Vec4::ZERO,
        }
    }
}

/// Constant-buffer layout of the punctual light state, for hosts that
/// upload the whole block as one contiguous buffer instead of reading the
/// named globals individually
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PackedLightData {
    pub direction: [Vec4; MAX_PUNCTUAL_LIGHTS],
    pub position: [Vec4; MAX_PUNCTUAL_LIGHTS],
    pub intensity: [Vec4; MAX_PUNCTUAL_LIGHTS],
    pub falloff: [Vec4; MAX_PUNCTUAL_LIGHTS],
    pub info: [Vec4; MAX_PUNCTUAL_LIGHTS],
    pub dominant_light_direction: Vec4,
    pub dominant_light_intensity: Vec4,
    /// Count in x, yzw padding for 16-byte alignment
    pub num_punctual_lights: [u32; 4],
}

impl PackedLightData {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl LightLoopState {
    pub fn packed(&self) -> PackedLightData {
        PackedLightData {
            direction: self.direction,
            position: self.position,
            intensity: self.intensity,
            falloff: self.falloff,
            info: self.info,
            dominant_light_direction: self.dominant_light_direction,
            dominant_light_intensity: self.dominant_light_intensity,
            num_punctual_lights: [self.num_punctual_lights as u32, 0, 0, 0],
        }
    }
}

/// A light loop turns the snapshot's light list into published globals.
/// `build` must run before `setup` within a frame; `setup` publishes
/// whatever state `build` last produced.
pub trait LightLoop {
    fn init(&mut self);
    fn build(&mut self, snapshot: &WorldSnapshot, camera: &Camera);
    fn setup(&self, cmd: &mut CommandStream);
    fn dispose(&mut self);
}

pub fn create_light_loop(kind: LightLoopKind, editor_mode: bool) -> Box<dyn LightLoop> {
    match kind {
        LightLoopKind::Simple => Box::new(SimpleLightLoop::new(editor_mode)),
    }
}

/// The shipped light loop: no clustering, one flat array of up to
/// `MAX_PUNCTUAL_LIGHTS` lights evaluated per pixel
pub struct SimpleLightLoop {
    state: LightLoopState,
    editor_mode: bool,
}

impl SimpleLightLoop {
    pub fn new(editor_mode: bool) -> Self {
        Self {
            state: LightLoopState::default(),
            editor_mode,
        }
    }

    pub fn state(&self) -> &LightLoopState {
        &self.state
    }

    /// Append every light of `kind` from `lights` until the arrays are
    /// full. Returns false once capacity is exhausted.
    fn pack_lights_of_kind(&mut self, lights: &[Light], kind: LightKind) -> bool {
        for light in lights.iter().filter(|l| l.kind == kind) {
            if self.state.num_punctual_lights >= MAX_PUNCTUAL_LIGHTS {
                log::warn!(
                    "Maximum number of punctual lights reached ({}), remaining lights are ignored",
                    MAX_PUNCTUAL_LIGHTS
                );
                return false;
            }
            let i = self.state.num_punctual_lights;

            let inv_sqr_radius = 1.0 / (light.range * light.range);
            let falloff_exponent = if light.inverse_square_falloff {
                0.0
            } else {
                light.falloff_exponent
            };

            let (angular_scale, angular_offset) = if kind == LightKind::Spot {
                let cos_inner = (light.inner_cone_angle * 0.5).cos();
                let cos_outer = (light.outer_cone_angle * 0.5).cos();
                let scale = 1.0 / (cos_inner - cos_outer).max(0.001);
                (scale, -cos_outer * scale)
            } else {
                (0.0, 1.0)
            };

            self.state.direction[i] = if kind == LightKind::Spot {
                (-light.direction).extend(0.0)
            } else {
                Vec4::ZERO
            };
            let position_w = if self.editor_mode {
                light.shadow_radius.abs()
            } else {
                0.0
            };
            self.state.position[i] = light.position.extend(position_w);
            self.state.intensity[i] = light.color_intensity();
            self.state.falloff[i] =
                Vec4::new(inv_sqr_radius, falloff_exponent, angular_scale, angular_offset);
            self.state.info[i] = Vec4::new(
                light.kind.shader_id(),
                light.shadow_split_index as f32,
                0.0,
                0.0,
            );
            self.state.num_punctual_lights += 1;
        }
        true
    }
}

impl LightLoop for SimpleLightLoop {
    fn init(&mut self) {
        self.state = LightLoopState::default();
    }

    fn build(&mut self, snapshot: &WorldSnapshot, _camera: &Camera) {
        match &snapshot.sun_light {
            Some(sun) => {
                let w = if self.editor_mode { sun.shadow_angle } else { 0.0 };
                self.state.dominant_light_direction = (-sun.direction).extend(w);
                self.state.dominant_light_intensity = sun.color_intensity();
            }
            None => {
                self.state.dominant_light_direction = Vec4::ZERO;
                self.state.dominant_light_intensity = Vec4::ZERO;
            }
        }

        self.state.num_punctual_lights = 0;
        let lights = snapshot.visible_punctual_lights();
        if self.pack_lights_of_kind(lights, LightKind::Point) {
            self.pack_lights_of_kind(lights, LightKind::Spot);
        }
    }

    fn setup(&self, cmd: &mut CommandStream) {
        cmd.set_global_vec4("g_DominantLightDirection", self.state.dominant_light_direction);
        cmd.set_global_vec4("g_DominantLightIntensity", self.state.dominant_light_intensity);
        cmd.set_global_int("g_NumPunctualLights", self.state.num_punctual_lights as i32);
        cmd.set_global_vec4_array("g_PunctualLightsDirection", &self.state.direction);
        cmd.set_global_vec4_array("g_PunctualLightsPosition", &self.state.position);
        cmd.set_global_vec4_array("g_PunctualLightsIntensity", &self.state.intensity);
        cmd.set_global_vec4_array("g_PunctualLightsFalloff", &self.state.falloff);
        cmd.set_global_vec4_array("g_PunctualLightsInfo", &self.state.info);
    }

    fn dispose(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{CameraId, Light};
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn snapshot_with(lights: Vec<Light>) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::new();
        let set = crate::scene::classify_lights(&lights);
        snapshot.sun_light = set.sun_light;
        snapshot.all_punctual_lights = set.punctual_lights;
        snapshot
    }

    fn camera() -> Camera {
        Camera::new(CameraId(1), 128, 128)
    }

    #[test]
    fn point_light_packing() {
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(
            &snapshot_with(vec![Light::point(
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(1.0, 0.5, 0.25),
                4.0,
                10.0,
            )]),
            &camera(),
        );

        let state = lights.state();
        assert_eq!(state.num_punctual_lights, 1);
        assert_eq!(state.direction[0], Vec4::ZERO);
        assert_eq!(state.position[0], Vec4::new(1.0, 2.0, 3.0, 0.0));
        assert_eq!(state.intensity[0], Vec4::new(4.0, 2.0, 1.0, 0.0));
        // inverse-square falloff zeroes the custom exponent
        assert_relative_eq!(state.falloff[0].x, 0.01);
        assert_eq!(state.falloff[0].y, 0.0);
        assert_eq!(state.falloff[0].z, 0.0);
        assert_eq!(state.falloff[0].w, 1.0);
        assert_eq!(state.info[0].x, LightKind::Point.shader_id());
        assert_eq!(state.info[0].y, -1.0);
    }

    #[test]
    fn spot_angular_falloff() {
        let inner = 30f32.to_radians();
        let outer = 60f32.to_radians();
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(
            &snapshot_with(vec![Light::spot(
                Vec3::ZERO,
                Vec3::NEG_Z,
                Vec3::ONE,
                1.0,
                5.0,
                inner,
                outer,
            )]),
            &camera(),
        );

        let state = lights.state();
        let cos_inner = (inner * 0.5).cos();
        let cos_outer = (outer * 0.5).cos();
        let scale = 1.0 / (cos_inner - cos_outer).max(0.001);
        assert_relative_eq!(state.falloff[0].z, scale);
        assert_relative_eq!(state.falloff[0].w, -cos_outer * scale);
        // spots publish the negated forward vector
        assert_eq!(state.direction[0], Vec4::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(state.info[0].x, LightKind::Spot.shader_id());
    }

    #[test]
    fn degenerate_spot_cone_stays_finite() {
        let angle = 30f32.to_radians();
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(
            &snapshot_with(vec![Light::spot(
                Vec3::ZERO,
                Vec3::NEG_Z,
                Vec3::ONE,
                1.0,
                5.0,
                angle,
                angle,
            )]),
            &camera(),
        );

        let falloff = lights.state().falloff[0];
        assert!(falloff.z.is_finite());
        assert!(falloff.w.is_finite());
        assert_relative_eq!(falloff.z, 1000.0);
    }

    #[test]
    fn points_pack_before_spots() {
        let lights_in = vec![
            Light::spot(Vec3::X, Vec3::NEG_Z, Vec3::ONE, 1.0, 5.0, 0.3, 0.5),
            Light::point(Vec3::Y, Vec3::ONE, 1.0, 5.0),
            Light::spot(Vec3::Z, Vec3::NEG_Z, Vec3::ONE, 1.0, 5.0, 0.3, 0.5),
        ];
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(&snapshot_with(lights_in), &camera());

        let state = lights.state();
        assert_eq!(state.num_punctual_lights, 3);
        assert_eq!(state.info[0].x, LightKind::Point.shader_id());
        assert_eq!(state.info[1].x, LightKind::Spot.shader_id());
        assert_eq!(state.info[2].x, LightKind::Spot.shader_id());
        // scan order preserved within the spot pass
        assert_eq!(state.position[1].x, 1.0);
        assert_eq!(state.position[2].z, 1.0);
    }

    #[test]
    fn overflow_truncates_at_capacity() {
        let many: Vec<Light> = (0..MAX_PUNCTUAL_LIGHTS + 4)
            .map(|i| Light::point(Vec3::new(i as f32, 0.0, 0.0), Vec3::ONE, 1.0, 5.0))
            .collect();
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(&snapshot_with(many), &camera());
        assert_eq!(lights.state().num_punctual_lights, MAX_PUNCTUAL_LIGHTS);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let lights_in = vec![
            Light::directional(Vec3::NEG_Y, Vec3::ONE, 2.0),
            Light::point(Vec3::X, Vec3::ONE, 1.0, 5.0),
            Light::spot(Vec3::Y, Vec3::NEG_Z, Vec3::ONE, 1.0, 5.0, 0.3, 0.5),
        ];
        let snapshot = snapshot_with(lights_in);
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(&snapshot, &camera());
        let first = lights.state().clone();
        lights.build(&snapshot, &camera());
        let second = lights.state();

        assert_eq!(first.num_punctual_lights, second.num_punctual_lights);
        assert_eq!(first.direction, second.direction);
        assert_eq!(first.position, second.position);
        assert_eq!(first.intensity, second.intensity);
        assert_eq!(first.falloff, second.falloff);
        assert_eq!(first.info, second.info);
        assert_eq!(first.dominant_light_direction, second.dominant_light_direction);
    }

    #[test]
    fn editor_mode_publishes_source_extents() {
        let mut sun = Light::directional(Vec3::NEG_Y, Vec3::ONE, 1.0);
        sun.shadow_angle = 0.5;
        let mut point = Light::point(Vec3::X, Vec3::ONE, 1.0, 5.0);
        point.shadow_radius = -0.25;

        let snapshot = snapshot_with(vec![sun.clone(), point.clone()]);

        let mut editor = SimpleLightLoop::new(true);
        editor.init();
        editor.build(&snapshot, &camera());
        assert_eq!(editor.state().dominant_light_direction.w, 0.5);
        assert_eq!(editor.state().position[0].w, 0.25);

        let mut shipping = SimpleLightLoop::new(false);
        shipping.init();
        shipping.build(&snapshot, &camera());
        assert_eq!(shipping.state().dominant_light_direction.w, 0.0);
        assert_eq!(shipping.state().position[0].w, 0.0);
    }

    #[test]
    fn no_sun_zeroes_dominant_light() {
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(&snapshot_with(vec![]), &camera());
        assert_eq!(lights.state().dominant_light_direction, Vec4::ZERO);
        assert_eq!(lights.state().dominant_light_intensity, Vec4::ZERO);
    }

    #[test]
    fn packed_layout_is_tightly_sized() {
        // 5 arrays of 16 vec4s, 2 vec4s, one padded u32 count
        let expected = 5 * MAX_PUNCTUAL_LIGHTS * 16 + 2 * 16 + 16;
        assert_eq!(std::mem::size_of::<PackedLightData>(), expected);

        let state = LightLoopState::default();
        let packed = state.packed();
        assert_eq!(packed.as_bytes().len(), expected);
        assert_eq!(packed.num_punctual_lights[0], 0);
    }

    #[test]
    fn setup_publishes_full_arrays() {
        let mut lights = SimpleLightLoop::new(false);
        lights.init();
        lights.build(
            &snapshot_with(vec![Light::point(Vec3::X, Vec3::ONE, 1.0, 5.0)]),
            &camera(),
        );

        let mut cmd = CommandStream::new();
        lights.setup(&mut cmd);
        assert_eq!(cmd.global_int("g_NumPunctualLights"), Some(1));
        let positions = cmd.global_vec4_array("g_PunctualLightsPosition").unwrap();
        assert_eq!(positions.len(), MAX_PUNCTUAL_LIGHTS);
        assert_eq!(positions[0].x, 1.0);
    }
}
