//! Per-camera renderer contract
//!
//! A renderer owns the GPU resources for exactly one camera. The registry
//! drives the lifecycle: `init` once after construction, `render` every
//! frame the camera is active, `dispose` exactly once before the renderer
//! is dropped. Resources must only be acquired in `init`/`resize` and only
//! released in `resize`/`dispose`.

use crate::error::PipelineResult;
use crate::gpu::{CommandStream, GpuResources};
use crate::scene::{Camera, WorldSnapshot};

pub trait CameraRenderer {
    /// Acquire GPU resources for the camera's current dimensions
    fn init(&mut self, gpu: &mut GpuResources, camera: &Camera) -> PipelineResult<()>;

    /// Whether the camera's scaled dimensions no longer match the owned
    /// render target
    fn should_resize(&self, camera: &Camera) -> bool;

    fn resize(&mut self, gpu: &mut GpuResources, camera: &Camera) -> PipelineResult<()>;

    /// Record one frame for this camera into the command stream
    fn render(
        &mut self,
        gpu: &mut GpuResources,
        cmd: &mut CommandStream,
        camera: &Camera,
        snapshot: &WorldSnapshot,
        frame_index: u64,
    ) -> PipelineResult<()>;

    /// Editor liveness probe: false once any owned resource was lost
    /// underneath the renderer (asset reimport, device reset)
    fn is_valid(&self, gpu: &GpuResources) -> bool;

    /// Release every owned GPU resource
    fn dispose(&mut self, gpu: &mut GpuResources) -> PipelineResult<()>;
}
