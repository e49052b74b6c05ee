//! Camera-renderer registry
//!
//! Cameras come and go every frame (editor panels, scene views, one-shot
//! thumbnail captures). Renderers are expensive, so a renderer whose
//! camera disappears is kept warm for a few frames before its resources
//! are released. The ref count is reset whenever the camera is seen again.

use std::collections::{HashMap, HashSet};

use crate::error::PipelineResult;
use crate::gpu::GpuResources;
use crate::pipeline::renderer::CameraRenderer;
use crate::scene::{Camera, CameraId};

/// Frames a renderer survives without its camera before disposal
pub const BUNDLE_REF_COUNT: i32 = 3;

/// A renderer bound to one camera, with its retirement countdown
pub struct CameraRendererBundle {
    pub camera_id: CameraId,
    pub renderer: Box<dyn CameraRenderer>,
    ref_count: i32,
}

/// Registry of per-camera renderers with refcounted retirement
pub struct RendererRegistry {
    bundles: HashMap<CameraId, CameraRendererBundle>,
    /// Guard so multiple resolve calls within one frame decrement once
    last_decrement_frame: Option<u64>,
    editor_mode: bool,
}

impl RendererRegistry {
    pub fn new(editor_mode: bool) -> Self {
        Self {
            bundles: HashMap::new(),
            last_decrement_frame: None,
            editor_mode,
        }
    }

    pub fn renderer_mut(&mut self, camera_id: CameraId) -> Option<&mut Box<dyn CameraRenderer>> {
        self.bundles.get_mut(&camera_id).map(|b| &mut b.renderer)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Bring the registry in sync with this frame's active cameras.
    ///
    /// Active cameras get a live renderer (created, or recreated when the
    /// camera requests a reset or, in the editor, when the renderer's
    /// resources were lost). Renderers for absent cameras count down once
    /// per frame and are disposed at zero.
    pub fn resolve(
        &mut self,
        cameras: &mut [Camera],
        frame_index: u64,
        gpu: &mut GpuResources,
        factory: &mut dyn FnMut() -> Box<dyn CameraRenderer>,
    ) -> PipelineResult<()> {
        for camera in cameras.iter_mut() {
            match self.bundles.get_mut(&camera.id) {
                Some(bundle) => {
                    let lost = self.editor_mode && !bundle.renderer.is_valid(gpu);
                    if camera.reset_renderer || lost {
                        if let Err(err) = bundle.renderer.dispose(gpu) {
                            log::error!(
                                "Failed to dispose renderer for camera {:?}: {err}",
                                camera.id
                            );
                        }
                        bundle.renderer = factory();
                        bundle.renderer.init(gpu, camera)?;
                        camera.reset_renderer = false;
                    }
                    bundle.ref_count = BUNDLE_REF_COUNT;
                }
                None => {
                    let mut renderer = factory();
                    renderer.init(gpu, camera)?;
                    camera.reset_renderer = false;
                    self.bundles.insert(
                        camera.id,
                        CameraRendererBundle {
                            camera_id: camera.id,
                            renderer,
                            ref_count: BUNDLE_REF_COUNT,
                        },
                    );
                }
            }
        }

        if self.last_decrement_frame != Some(frame_index) {
            self.last_decrement_frame = Some(frame_index);
            let active: HashSet<CameraId> = cameras.iter().map(|c| c.id).collect();
            let mut retired = Vec::new();
            for (id, bundle) in self.bundles.iter_mut() {
                if !active.contains(id) {
                    bundle.ref_count -= 1;
                    if bundle.ref_count <= 0 {
                        retired.push(*id);
                    }
                }
            }
            for id in retired {
                if let Some(mut bundle) = self.bundles.remove(&id) {
                    if let Err(err) = bundle.renderer.dispose(gpu) {
                        log::error!("Failed to dispose renderer for camera {id:?}: {err}");
                    }
                }
            }
        }
        Ok(())
    }

    /// Dispose every renderer; used at pipeline teardown
    pub fn dispose_all(&mut self, gpu: &mut GpuResources) {
        for (id, mut bundle) in self.bundles.drain() {
            if let Err(err) = bundle.renderer.dispose(gpu) {
                log::error!("Failed to dispose renderer for camera {id:?}: {err}");
            }
        }
    }
}
