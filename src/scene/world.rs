//! World snapshot: per-scene aggregation of lights, probe and settings
//!
//! The snapshot is the pipeline's only view of the scene. It is rebuilt
//! wholesale from a `SceneSource` on every invalidation signal (light,
//! material or scene edits) and never patched incrementally, so a frame
//! can never observe a half-updated light list.

use glam::Vec2;

use crate::scene::camera::Camera;
use crate::scene::environment::EnvironmentProbe;
use crate::scene::light::{Light, LightKind};
use crate::scene::settings::RenderSettings;
use crate::shader_config;

/// The injected scene query: how the pipeline reaches the host engine's
/// scene graph without owning it.
pub trait SceneSource {
    /// All lights currently in the scene, enabled or not, in scan order
    fn active_lights(&self) -> Vec<Light>;
    /// All environment probes in the scene (at most one is meaningful)
    fn environment_probes(&self) -> Vec<EnvironmentProbe>;
    fn render_settings(&self) -> RenderSettings;
}

/// Result of classifying a scene's light list
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    pub sun_light: Option<Light>,
    /// `[sun?] ++ other punctual lights in scan order`
    pub punctual_lights: Vec<Light>,
    pub area_lights: Vec<Light>,
}

/// Split a flat light list into sun, punctual and area groups.
///
/// Disabled lights are excluded. When the scene erroneously contains more
/// than one directional light, the last one in scan order wins the sun
/// slot; this is a documented ambiguity, not an error. Capacity limits are
/// enforced downstream by the light loop, not here.
pub fn classify_lights(lights: &[Light]) -> LightSet {
    let mut set = LightSet::default();

    for light in lights {
        if !light.enabled {
            continue;
        }

        if light.is_punctual() {
            if light.kind == LightKind::Directional {
                set.sun_light = Some(light.clone());
            } else {
                set.punctual_lights.push(light.clone());
            }
        } else {
            set.area_lights.push(light.clone());
        }
    }

    if let Some(sun) = &set.sun_light {
        set.punctual_lights.insert(0, sun.clone());
    }
    set
}

/// Per-scene snapshot of everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub sun_light: Option<Light>,
    /// Sun (if any) at index 0, then points and spots in scan order
    pub all_punctual_lights: Vec<Light>,
    pub all_area_lights: Vec<Light>,
    pub environment_probe: Option<EnvironmentProbe>,
    pub render_settings: RenderSettings,
    /// Near/far distance of the directional shadow range
    pub shadow_distance: Vec2,
    /// `(-1/range, far/range)` fade encoding consumed by the shaders
    pub shadow_distance_fade: Vec2,
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self {
            sun_light: None,
            all_punctual_lights: Vec::new(),
            all_area_lights: Vec::new(),
            environment_probe: None,
            render_settings: RenderSettings::default(),
            shadow_distance: Vec2::new(0.0, 1.0),
            shadow_distance_fade: Vec2::new(0.0, 1.0),
        }
    }

    /// Rebuild the snapshot in full from the scene source
    pub fn rebuild(&mut self, scene: &dyn SceneSource) {
        let LightSet {
            sun_light,
            punctual_lights,
            mut area_lights,
        } = classify_lights(&scene.active_lights());

        if area_lights.len() > shader_config::MAX_AREA_LIGHTS {
            log::warn!(
                "Maximum number of area lights reached ({} of {}), extras are ignored",
                area_lights.len(),
                shader_config::MAX_AREA_LIGHTS
            );
            area_lights.truncate(shader_config::MAX_AREA_LIGHTS);
        }

        self.sun_light = sun_light;
        self.all_punctual_lights = punctual_lights;
        self.all_area_lights = area_lights;

        let probes = scene.environment_probes();
        if probes.len() > 1 {
            log::error!("Found {} environment lights in scene", probes.len());
        }
        self.environment_probe = probes.into_iter().next();

        self.render_settings = scene.render_settings();
    }

    /// Punctual lights visible this frame (the snapshot currently keeps all
    /// of them; per-camera culling belongs to the host)
    pub fn visible_punctual_lights(&self) -> &[Light] {
        &self.all_punctual_lights
    }

    /// Update the directional shadow range and fade for the given camera.
    ///
    /// Without a sun, the range matches the camera's near/far planes so
    /// punctual lights can still cast shadows anywhere in view.
    pub fn update_shadow_distance(&mut self, camera: &Camera) {
        let Some(sun) = &self.sun_light else {
            self.shadow_distance = Vec2::new(camera.near_clip, camera.far_clip);
            self.shadow_distance_fade = Vec2::new(0.0, 1.0);
            return;
        };

        let setting = &sun.shadow;
        self.shadow_distance = Vec2::new(camera.near_clip, setting.far_plane.max(camera.near_clip));

        if setting.distance_fade >= 1.0 {
            self.shadow_distance_fade = Vec2::new(0.0, 1.0);
        } else {
            let fade_far = setting.far_plane;
            let fade_start = setting.distance_fade * fade_far;
            let fade_range = fade_far - fade_start;
            self.shadow_distance_fade = Vec2::new(-1.0 / fade_range, fade_far / fade_range);
        }
    }
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
