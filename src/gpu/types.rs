//! Common GPU resource description types

/// Texture format enumeration (the subset the mobile pipeline allocates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    /// Packed HDR color, the default main-target format on mobile
    Rg11B10Float,
    Rgba16Float,
    Rgba32Float,
    Depth24PlusStencil8,
    /// Depth format with hardware comparison sampling for shadow maps
    Shadowmap,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth24PlusStencil8 | TextureFormat::Shadowmap
        )
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Rg11B10Float
            | TextureFormat::Depth24PlusStencil8
            | TextureFormat::Shadowmap => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

/// Texture shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    D2,
    Cube,
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUsage(u32);

impl TextureUsage {
    pub const COPY_SRC: Self = Self(1 << 0);
    pub const COPY_DST: Self = Self(1 << 1);
    pub const TEXTURE_BINDING: Self = Self(1 << 2);
    pub const RENDER_ATTACHMENT: Self = Self(1 << 3);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for TextureUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Texture descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub dimension: TextureDimension,
    pub mip_levels: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            width: 1,
            height: 1,
            dimension: TextureDimension::D2,
            mip_levels: 1,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        }
    }
}

/// Descriptor for a camera render target (color + depth pair)
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDescriptor {
    pub label: Option<String>,
    pub color_format: TextureFormat,
    pub depth_format: TextureFormat,
    pub sample_count: u32,
}

impl Default for RenderTargetDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            color_format: TextureFormat::Rg11B10Float,
            depth_format: TextureFormat::Depth24PlusStencil8,
            sample_count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_flags_combine() {
        let usage = TextureUsage::TEXTURE_BINDING | TextureUsage::RENDER_ATTACHMENT;
        assert!(usage.contains(TextureUsage::TEXTURE_BINDING));
        assert!(usage.contains(TextureUsage::RENDER_ATTACHMENT));
        assert!(!usage.contains(TextureUsage::COPY_SRC));
    }

    #[test]
    fn depth_formats() {
        assert!(TextureFormat::Shadowmap.is_depth());
        assert!(TextureFormat::Depth24PlusStencil8.is_depth());
        assert!(!TextureFormat::Rg11B10Float.is_depth());
    }
}
