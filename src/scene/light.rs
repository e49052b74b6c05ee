//! Light types for the scene

use glam::{Vec3, Vec4};

use crate::shader_config;

/// Light shape classification.
///
/// Discriminants match the ids the lighting shaders read from the
/// punctual-light info array, so they are part of the shader contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Spot = 0,
    Directional = 1,
    Point = 2,
    Area = 3,
}

impl LightKind {
    pub fn shader_id(&self) -> f32 {
        *self as i32 as f32
    }
}

/// Shadow-map configuration carried by each shadow-casting light
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSetting {
    /// Number of splits for directional lights (clamped to the CSM cascade cap)
    pub num_of_splits: usize,
    /// 0..1, where along the shadow range the directional fade begins
    pub distance_fade: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub normal_bias: f32,
    pub depth_slope_bias: f32,
    /// Side length of this light's shadow map in the atlas
    pub shadow_map_resolution: u32,
}

impl Default for ShadowSetting {
    fn default() -> Self {
        Self {
            num_of_splits: 1,
            distance_fade: 0.8,
            near_plane: 0.1,
            far_plane: 10.0,
            normal_bias: 2.0,
            depth_slope_bias: 2.0,
            shadow_map_resolution: 512,
        }
    }
}

impl ShadowSetting {
    pub fn directional_split_count(&self) -> usize {
        self.num_of_splits.clamp(1, shader_config::CSM_MAX_CASCADES)
    }
}

/// A light source in the scene.
///
/// The snapshot clones these wholesale on every rebuild; a `Light` is plain
/// data with no backing scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    /// World position (point/spot/area lights)
    pub position: Vec3,
    /// World forward vector (directional/spot lights), normalized
    pub direction: Vec3,
    /// Attenuation range (point/spot lights)
    pub range: f32,
    /// Full inner cone angle in radians (spot lights)
    pub inner_cone_angle: f32,
    /// Full outer cone angle in radians (spot lights)
    pub outer_cone_angle: f32,
    /// Custom falloff exponent, used when inverse-square falloff is off
    pub falloff_exponent: f32,
    pub inverse_square_falloff: bool,
    /// Split index assigned by the shadow pass this frame, -1 when unshadowed
    pub shadow_split_index: i32,
    pub cast_shadows: bool,
    pub enabled: bool,
    /// Editor-only soft-shadow source radius hint
    pub shadow_radius: f32,
    /// Editor-only soft-shadow source angle hint (directional)
    pub shadow_angle: f32,
    pub shadow: ShadowSetting,
}

impl Light {
    fn base(kind: LightKind) -> Self {
        Self {
            kind,
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            range: 10.0,
            inner_cone_angle: 0.0,
            outer_cone_angle: 0.0,
            falloff_exponent: 8.0,
            inverse_square_falloff: true,
            shadow_split_index: -1,
            cast_shadows: false,
            enabled: true,
            shadow_radius: 0.0,
            shadow_angle: 0.0,
            shadow: ShadowSetting::default(),
        }
    }

    /// Create a directional light (like sunlight)
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize(),
            color,
            intensity,
            range: 0.0,
            ..Self::base(LightKind::Directional)
        }
    }

    /// Create a point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            range,
            ..Self::base(LightKind::Point)
        }
    }

    /// Create a spot light
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone_angle: f32,
        outer_cone_angle: f32,
    ) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            color,
            intensity,
            range,
            inner_cone_angle,
            outer_cone_angle,
            ..Self::base(LightKind::Spot)
        }
    }

    /// Create an area light
    pub fn area(position: Vec3, direction: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            color,
            intensity,
            range,
            ..Self::base(LightKind::Area)
        }
    }

    /// Punctual at the scene level: a light with a well-defined direction or
    /// position sample point. The classifier routes directionals to the sun
    /// slot afterwards.
    pub fn is_punctual(&self) -> bool {
        matches!(
            self.kind,
            LightKind::Directional | LightKind::Point | LightKind::Spot
        )
    }

    /// Color pre-multiplied by intensity, as published to shaders
    pub fn color_intensity(&self) -> Vec4 {
        (self.color * self.intensity).extend(0.0)
    }
}
