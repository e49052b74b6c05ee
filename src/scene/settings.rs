//! Render settings, grouped by concern

use glam::Vec3;

/// Shading view mode, mostly useful in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Lit = 0,
    DetailLighting = 1,
    LightingOnly = 2,
}

/// Which lighting components contribute to the final image (debug mask)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingComponents(u32);

impl LightingComponents {
    pub const EMISSIVE: Self = Self(1 << 0);
    pub const DIRECT_LIGHT: Self = Self(1 << 1);
    pub const DIFFUSE_GLOBAL_ILLUMINATION: Self = Self(1 << 2);
    pub const SPECULAR_REFLECTION: Self = Self(1 << 3);
    pub const ALL: Self = Self(u32::MAX);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl Default for LightingComponents {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::ops::BitOr for LightingComponents {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// General per-frame settings
#[derive(Debug, Clone, PartialEq)]
pub struct CommonSetting {
    /// 0.25..2.0 scale applied to the primary camera's pixel dimensions
    pub primary_screen_percentage: f32,
    /// Exposure in stops; EV = 2^exposure
    pub fixed_exposure: f32,
    pub view_mode: ViewMode,
    pub lighting_components: LightingComponents,
}

impl Default for CommonSetting {
    fn default() -> Self {
        Self {
            primary_screen_percentage: 1.0,
            fixed_exposure: 0.0,
            view_mode: ViewMode::Lit,
            lighting_components: LightingComponents::ALL,
        }
    }
}

/// Bloom post-processing settings
#[derive(Debug, Clone, PartialEq)]
pub struct BloomSetting {
    pub enable: bool,
    pub threshold: f32,
    pub soft_knee: f32,
    pub intensity: f32,
    pub diffusion: f32,
    pub firefly_removal_strength: f32,
    pub clamp: f32,
    pub tint: Vec3,
    pub half_size_downsample: bool,
    pub quarter_size_upsample: bool,
}

impl Default for BloomSetting {
    fn default() -> Self {
        Self {
            enable: true,
            threshold: 0.9,
            soft_knee: 0.5,
            intensity: 0.0,
            diffusion: 0.7,
            firefly_removal_strength: 1.0,
            clamp: 65472.0,
            tint: Vec3::ONE,
            half_size_downsample: true,
            quarter_size_upsample: true,
        }
    }
}

impl BloomSetting {
    pub fn is_activated(&self) -> bool {
        self.enable && self.intensity > 0.0
    }
}

/// Scene-wide render settings exposed as typed setting groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSettings {
    pub common: CommonSetting,
    pub bloom: BloomSetting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_components_include_everything() {
        let components = LightingComponents::default();
        assert!(components.contains(LightingComponents::EMISSIVE));
        assert!(components.contains(LightingComponents::SPECULAR_REFLECTION));
    }

    #[test]
    fn bloom_activation_needs_intensity() {
        let mut bloom = BloomSetting::default();
        assert!(!bloom.is_activated());
        bloom.intensity = 0.5;
        assert!(bloom.is_activated());
        bloom.enable = false;
        assert!(!bloom.is_activated());
    }
}
