//! Per-camera descriptor

use glam::{Mat4, Vec3, Vec4};

/// Stable identity of a logical camera, assigned by the host engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u32);

/// What the camera clears its target to before drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearFlags {
    #[default]
    Skybox,
    SolidColor,
    Depth,
    Nothing,
}

/// A camera as the pipeline sees it: identity, target dimensions, view
/// transforms and clear behavior. The host engine owns the real camera
/// object; this descriptor is refreshed every frame.
#[derive(Debug, Clone)]
pub struct Camera {
    pub id: CameraId,
    /// Unscaled target width in pixels
    pub pixel_width: u32,
    /// Unscaled target height in pixels
    pub pixel_height: u32,
    /// Primary-screen-percentage scale applied to the pixel dimensions
    pub screen_percentage: f32,
    pub position: Vec3,
    /// World forward vector, normalized
    pub forward: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub near_clip: f32,
    pub far_clip: f32,
    pub clear_flags: ClearFlags,
    pub background_color: Vec4,
    /// Set by the host when the renderer must be rebuilt (e.g. a
    /// render-target format change); cleared once the registry handles it
    pub reset_renderer: bool,
}

impl Camera {
    pub fn new(id: CameraId, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            id,
            pixel_width,
            pixel_height,
            screen_percentage: 1.0,
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            near_clip: 0.1,
            far_clip: 1000.0,
            clear_flags: ClearFlags::default(),
            background_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            reset_renderer: false,
        }
    }

    /// Target width after screen-percentage scaling
    pub fn scaled_pixel_width(&self) -> u32 {
        (self.screen_percentage * self.pixel_width as f32) as u32
    }

    /// Target height after screen-percentage scaling
    pub fn scaled_pixel_height(&self) -> u32 {
        (self.screen_percentage * self.pixel_height as f32) as u32
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    /// `(w, h, 1/w, 1/h)` as published to shaders
    pub fn screen_params(&self) -> Vec4 {
        let w = self.scaled_pixel_width().max(1) as f32;
        let h = self.scaled_pixel_height().max(1) as f32;
        Vec4::new(w, h, 1.0 / w, 1.0 / h)
    }
}
