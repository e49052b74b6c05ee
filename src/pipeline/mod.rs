//! Forward-lit mobile render pipeline
//!
//! One flat forward pass per camera: shadow atlas, fixed-capacity punctual
//! light loop, environment (IBL) globals, then post-process parameters.
//! `MobileRenderPipeline` is the per-frame entry point the host engine
//! calls with the frame's cameras and a scene query.

pub mod environment;
pub mod forward;
pub mod light_loop;
pub mod material;
pub mod post;
pub mod registry;
pub mod renderer;
pub mod shadow;

pub use forward::LiteForwardRenderer;
pub use light_loop::{LightLoop, LightLoopKind, LightLoopState, PackedLightData, SimpleLightLoop};
pub use registry::{CameraRendererBundle, RendererRegistry, BUNDLE_REF_COUNT};
pub use renderer::CameraRenderer;
pub use shadow::{ShadowData, ShadowMapPass};

use crate::error::{PipelineError, PipelineResult};
use crate::gpu::{CommandStream, GpuResources};
use crate::scene::{Camera, SceneSource, WorldSnapshot};
use crate::PipelineConfig;

/// The pipeline instance: owns the GPU arena, the command stream and the
/// per-camera renderers. One instance per host render context.
pub struct MobileRenderPipeline {
    config: PipelineConfig,
    gpu: GpuResources,
    commands: CommandStream,
    registry: RendererRegistry,
    snapshot: WorldSnapshot,
    frame_index: u64,
    disposed: bool,
}

impl MobileRenderPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        log::info!(
            "Creating render pipeline (editor mode: {})",
            config.editor_mode
        );
        Self {
            registry: RendererRegistry::new(config.editor_mode),
            config,
            gpu: GpuResources::new(),
            commands: CommandStream::new(),
            snapshot: WorldSnapshot::new(),
            frame_index: 0,
            disposed: false,
        }
    }

    /// The command stream recorded by the last `render` call
    pub fn commands(&self) -> &CommandStream {
        &self.commands
    }

    pub fn gpu(&self) -> &GpuResources {
        &self.gpu
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Render one frame for the given cameras.
    ///
    /// Without a scene source each camera is skipped with a warning; the
    /// frame itself still advances so renderer retirement keeps counting.
    pub fn render(
        &mut self,
        scene: Option<&dyn SceneSource>,
        cameras: &mut [Camera],
    ) -> PipelineResult<()> {
        if self.disposed {
            return Err(PipelineError::Disposed);
        }

        self.commands.clear();

        let light_loop = self.config.light_loop;
        let editor_mode = self.config.editor_mode;
        let mut factory = move || -> Box<dyn CameraRenderer> {
            Box::new(LiteForwardRenderer::new(light_loop, editor_mode))
        };
        self.registry
            .resolve(cameras, self.frame_index, &mut self.gpu, &mut factory)?;

        if let Some(scene) = scene {
            self.snapshot.rebuild(scene);
        }

        for camera in cameras.iter() {
            if scene.is_none() {
                log::warn!("No scene source bound, skipping camera {:?}", camera.id);
                continue;
            }
            self.snapshot.update_shadow_distance(camera);

            let Some(renderer) = self.registry.renderer_mut(camera.id) else {
                return Err(PipelineError::UnknownCamera(camera.id));
            };
            renderer.render(
                &mut self.gpu,
                &mut self.commands,
                camera,
                &self.snapshot,
                self.frame_index,
            )?;
        }

        self.frame_index += 1;
        Ok(())
    }

    /// Tear down every renderer and verify nothing leaked
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.registry.dispose_all(&mut self.gpu);
        self.disposed = true;

        let leaked = self.gpu.live_count();
        if leaked > 0 {
            log::error!("{leaked} GPU resources leaked at pipeline teardown");
        }
    }
}

impl Drop for MobileRenderPipeline {
    fn drop(&mut self) {
        self.dispose();
    }
}
