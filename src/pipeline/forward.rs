//! Forward renderer: one camera, one HDR target, the full pass sequence
//!
//! Pass order per frame: camera globals, shadow pass, light loop,
//! environment, target clear per the camera's clear flags, sky (when the
//! camera clears to skybox and a probe exists), then post-process
//! parameters.

use crate::error::PipelineResult;
use crate::gpu::{
    CommandStream, GpuResources, RenderTarget, RenderTargetDescriptor, TextureDescriptor,
    TextureHandle,
};
use crate::pipeline::environment::publish_environment;
use crate::pipeline::light_loop::{create_light_loop, LightLoop, LightLoopKind};
use crate::pipeline::material::{setup_debug_options, setup_primary_camera};
use crate::pipeline::post::publish_bloom;
use crate::pipeline::renderer::CameraRenderer;
use crate::pipeline::shadow::ShadowMapPass;
use crate::scene::{Camera, ClearFlags, WorldSnapshot};

pub struct LiteForwardRenderer {
    target: Option<RenderTarget>,
    light_loop: Box<dyn LightLoop>,
    shadow: ShadowMapPass,
    /// Sentinel resource for the editor liveness probe: if the host tears
    /// down graphics assets, this handle dies with them
    probe_texture: Option<TextureHandle>,
    editor_mode: bool,
}

impl LiteForwardRenderer {
    pub fn new(light_loop: LightLoopKind, editor_mode: bool) -> Self {
        Self {
            target: None,
            light_loop: create_light_loop(light_loop, editor_mode),
            shadow: ShadowMapPass::new(),
            probe_texture: None,
            editor_mode,
        }
    }
}

impl CameraRenderer for LiteForwardRenderer {
    fn init(&mut self, gpu: &mut GpuResources, camera: &Camera) -> PipelineResult<()> {
        let mut target = RenderTarget::new(
            gpu,
            RenderTargetDescriptor {
                label: Some("camera hdr target".to_string()),
                ..Default::default()
            },
        );
        target.resize(
            gpu,
            camera.scaled_pixel_width().max(1),
            camera.scaled_pixel_height().max(1),
        )?;
        self.target = Some(target);

        self.probe_texture = Some(gpu.create_texture(TextureDescriptor {
            label: Some("renderer liveness probe".to_string()),
            ..Default::default()
        }));

        self.shadow.init(gpu);
        self.light_loop.init();
        Ok(())
    }

    fn should_resize(&self, camera: &Camera) -> bool {
        let wanted = (
            camera.scaled_pixel_width().max(1),
            camera.scaled_pixel_height().max(1),
        );
        self.target.as_ref().map_or(true, |t| t.size() != wanted)
    }

    fn resize(&mut self, gpu: &mut GpuResources, camera: &Camera) -> PipelineResult<()> {
        if let Some(target) = self.target.as_mut() {
            target.resize(
                gpu,
                camera.scaled_pixel_width().max(1),
                camera.scaled_pixel_height().max(1),
            )?;
        }
        Ok(())
    }

    fn render(
        &mut self,
        gpu: &mut GpuResources,
        cmd: &mut CommandStream,
        camera: &Camera,
        snapshot: &WorldSnapshot,
        frame_index: u64,
    ) -> PipelineResult<()> {
        if self.should_resize(camera) {
            self.resize(gpu, camera)?;
        }

        // Shadow split assignment mutates light state, so the renderer
        // works on its own copy of the frame snapshot
        let mut snapshot = snapshot.clone();

        cmd.begin_sample("LiteForwardRenderer");

        setup_primary_camera(cmd, &snapshot.render_settings.common, camera, frame_index);
        if self.editor_mode {
            setup_debug_options(cmd, &snapshot.render_settings.common);
        }

        cmd.begin_sample("ShadowMapPass");
        self.shadow.build(&mut snapshot, camera);
        self.shadow.setup(cmd, &snapshot);
        cmd.end_sample();

        self.light_loop.build(&snapshot, camera);
        self.light_loop.setup(cmd);

        publish_environment(cmd, gpu, snapshot.environment_probe.as_ref());

        let target = self
            .target
            .as_ref()
            .ok_or(crate::error::PipelineError::Disposed)?;
        cmd.set_render_target(target.color(), Some(target.depth()));
        cmd.set_view_projection(camera.view, camera.projection);
        match camera.clear_flags {
            ClearFlags::Skybox | ClearFlags::SolidColor => {
                cmd.clear_render_target(true, true, camera.background_color);
            }
            ClearFlags::Depth => {
                cmd.clear_render_target(true, false, camera.background_color);
            }
            ClearFlags::Nothing => {}
        }

        if camera.clear_flags == ClearFlags::Skybox && snapshot.environment_probe.is_some() {
            cmd.begin_sample("DrawSkybox");
            cmd.end_sample();
        }

        publish_bloom(cmd, &snapshot.render_settings.bloom);

        cmd.end_sample();
        Ok(())
    }

    fn is_valid(&self, gpu: &GpuResources) -> bool {
        self.probe_texture.map_or(false, |tex| gpu.is_alive(tex))
    }

    fn dispose(&mut self, gpu: &mut GpuResources) -> PipelineResult<()> {
        if let Some(target) = self.target.take() {
            target.release(gpu)?;
        }
        if let Some(probe) = self.probe_texture.take() {
            gpu.release_texture(probe)?;
        }
        self.shadow.dispose(gpu)?;
        self.light_loop.dispose();
        Ok(())
    }
}
