//! GPU abstraction boundary
//!
//! The pipeline owns opaque resource handles and publishes named shader
//! globals; the host engine owns the actual device objects.

pub mod commands;
pub mod resources;
pub mod types;

pub use commands::{Command, CommandStream, GlobalParam};
pub use resources::{GpuResources, RenderTarget, TextureHandle};
pub use types::*;
