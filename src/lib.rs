//! Forward-lit mobile render pipeline core
//!
//! A lightweight forward renderer built for mobile GPU budgets: one flat
//! light loop with a fixed punctual-light capacity, a single shadow atlas,
//! prefiltered-environment IBL, and per-camera renderers with refcounted
//! retirement. The host engine injects its scene through `SceneSource` and
//! consumes the published shader globals and command stream after each
//! `MobileRenderPipeline::render` call.
//!
//! # Features
//! - Fixed-capacity punctual light loop (sun + points + spots)
//! - Shadow atlas with per-light splits and directional cascades
//! - Environment probe publication with a bit-reproducible fallback
//! - Camera-renderer registry that keeps renderers warm across dropped
//!   frames before releasing their GPU resources

pub mod error;
pub mod gpu;
pub mod pipeline;
pub mod scene;
pub mod shader_config;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{CameraRenderer, LightLoopKind, MobileRenderPipeline};
pub use scene::{Camera, CameraId, Light, LightKind, SceneSource, WorldSnapshot};

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Editor builds publish extra per-light data (soft-shadow source
    /// extents, debug view overrides) and probe renderer liveness
    pub editor_mode: bool,
    /// Which light loop implementation to run
    pub light_loop: LightLoopKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            editor_mode: false,
            light_loop: LightLoopKind::Simple,
        }
    }
}
