//! GPU resource arena
//!
//! The pipeline core never talks to a device directly; it allocates opaque
//! texture handles from this arena and publishes them by name through the
//! command stream. The host engine maps handles to real GPU objects. The
//! arena tracks liveness so the acquire-in-init/release-in-dispose
//! discipline is checkable, and supports revocation to model the editor
//! case where the host drops graphics resources out from under a renderer.

use std::collections::HashMap;

use crate::error::{PipelineError, PipelineResult};
use crate::gpu::types::*;

/// Unique identifier for a GPU texture owned by the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

#[derive(Debug)]
struct TextureSlot {
    desc: TextureDescriptor,
    alive: bool,
}

/// Arena of GPU resources owned by the pipeline
#[derive(Debug)]
pub struct GpuResources {
    textures: HashMap<TextureHandle, TextureSlot>,
    next_id: u32,
    black_texture: TextureHandle,
}

impl GpuResources {
    pub fn new() -> Self {
        let mut resources = Self {
            textures: HashMap::new(),
            next_id: 0,
            black_texture: TextureHandle(0),
        };

        // 1x1 black fallback, referenced whenever no environment probe exists.
        // Lives for the whole pipeline lifetime and is not counted as a leak.
        resources.black_texture = resources.create_texture(TextureDescriptor {
            label: Some("black 1x1".to_string()),
            ..Default::default()
        });
        resources
    }

    /// The shared 1x1 black fallback texture
    pub fn black_texture(&self) -> TextureHandle {
        self.black_texture
    }

    pub fn create_texture(&mut self, desc: TextureDescriptor) -> TextureHandle {
        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        self.textures.insert(handle, TextureSlot { desc, alive: true });
        handle
    }

    /// Release a texture. Releasing a handle twice (or a revoked handle) is
    /// an error; leaked or double-freed GPU resources are correctness bugs
    /// for long-running editor sessions and must not pass silently.
    pub fn release_texture(&mut self, handle: TextureHandle) -> PipelineResult<()> {
        match self.textures.get_mut(&handle) {
            Some(slot) if slot.alive => {
                slot.alive = false;
                Ok(())
            }
            Some(slot) => Err(PipelineError::ResourceReleased(
                slot.desc.label.clone().unwrap_or_else(|| format!("{handle:?}")),
            )),
            None => Err(PipelineError::ResourceReleased(format!("{handle:?}"))),
        }
    }

    pub fn is_alive(&self, handle: TextureHandle) -> bool {
        self.textures.get(&handle).map_or(false, |slot| slot.alive)
    }

    pub fn descriptor(&self, handle: TextureHandle) -> Option<&TextureDescriptor> {
        self.textures
            .get(&handle)
            .filter(|slot| slot.alive)
            .map(|slot| &slot.desc)
    }

    /// Number of live textures excluding the built-in black fallback
    pub fn live_count(&self) -> usize {
        self.textures
            .iter()
            .filter(|(handle, slot)| slot.alive && **handle != self.black_texture)
            .count()
    }

    /// Drop a live texture without going through release, as the host does
    /// when it tears down graphics resources behind the pipeline's back.
    /// Renderers detect this through their liveness probe.
    pub fn revoke_texture(&mut self, handle: TextureHandle) {
        if let Some(slot) = self.textures.get_mut(&handle) {
            slot.alive = false;
        }
    }
}

impl Default for GpuResources {
    fn default() -> Self {
        Self::new()
    }
}

/// A camera-sized color + depth render target pair
#[derive(Debug)]
pub struct RenderTarget {
    desc: RenderTargetDescriptor,
    color: TextureHandle,
    depth: TextureHandle,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Create with zero size; the owning renderer resizes it on first use.
    pub fn new(gpu: &mut GpuResources, desc: RenderTargetDescriptor) -> Self {
        let color = Self::create_attachment(gpu, &desc, desc.color_format, 0, 0);
        let depth = Self::create_attachment(gpu, &desc, desc.depth_format, 0, 0);
        Self {
            desc,
            color,
            depth,
            width: 0,
            height: 0,
        }
    }

    fn create_attachment(
        gpu: &mut GpuResources,
        desc: &RenderTargetDescriptor,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> TextureHandle {
        gpu.create_texture(TextureDescriptor {
            label: desc.label.clone(),
            width,
            height,
            dimension: TextureDimension::D2,
            mip_levels: 1,
            format,
            usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        })
    }

    pub fn resize(&mut self, gpu: &mut GpuResources, width: u32, height: u32) -> PipelineResult<()> {
        if self.width == width && self.height == height {
            return Ok(());
        }

        gpu.release_texture(self.color)?;
        gpu.release_texture(self.depth)?;
        self.color = Self::create_attachment(gpu, &self.desc, self.desc.color_format, width, height);
        self.depth = Self::create_attachment(gpu, &self.desc, self.desc.depth_format, width, height);
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn color(&self) -> TextureHandle {
        self.color
    }

    pub fn depth(&self) -> TextureHandle {
        self.depth
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn release(self, gpu: &mut GpuResources) -> PipelineResult<()> {
        gpu.release_texture(self.color)?;
        gpu.release_texture(self.depth)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_release() {
        let mut gpu = GpuResources::new();
        let tex = gpu.create_texture(TextureDescriptor::default());
        assert!(gpu.is_alive(tex));
        assert_eq!(gpu.live_count(), 1);

        gpu.release_texture(tex).unwrap();
        assert!(!gpu.is_alive(tex));
        assert_eq!(gpu.live_count(), 0);
    }

    #[test]
    fn double_release_is_an_error() {
        let mut gpu = GpuResources::new();
        let tex = gpu.create_texture(TextureDescriptor::default());
        gpu.release_texture(tex).unwrap();
        assert!(gpu.release_texture(tex).is_err());
    }

    #[test]
    fn black_texture_is_always_alive() {
        let gpu = GpuResources::new();
        assert!(gpu.is_alive(gpu.black_texture()));
        assert_eq!(gpu.live_count(), 0);
    }

    #[test]
    fn render_target_resize_swaps_attachments() {
        let mut gpu = GpuResources::new();
        let mut target = RenderTarget::new(&mut gpu, RenderTargetDescriptor::default());
        let old_color = target.color();

        target.resize(&mut gpu, 1280, 720).unwrap();
        assert!(!gpu.is_alive(old_color));
        assert!(gpu.is_alive(target.color()));
        assert_eq!(target.size(), (1280, 720));

        // Same size is a no-op
        let color = target.color();
        target.resize(&mut gpu, 1280, 720).unwrap();
        assert_eq!(target.color(), color);

        target.release(&mut gpu).unwrap();
        assert_eq!(gpu.live_count(), 0);
    }

    #[test]
    fn revoked_texture_reads_as_dead() {
        let mut gpu = GpuResources::new();
        let tex = gpu.create_texture(TextureDescriptor::default());
        gpu.revoke_texture(tex);
        assert!(!gpu.is_alive(tex));
    }
}
