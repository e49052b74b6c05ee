//! Fixed shader-visible capacities and IBL mip layout
//!
//! These constants are baked into the shader set; changing one requires
//! recompiling the shaders that index the corresponding arrays. They mirror
//! the sizes the lighting shaders declare for their global parameter arrays.

/// Maximum number of punctual lights (sun included) visible to the light loop.
pub const MAX_PUNCTUAL_LIGHTS: usize = 16;

/// Maximum number of area lights tracked by a world snapshot.
pub const MAX_AREA_LIGHTS: usize = 4;

/// Maximum number of lights that may own shadow-map splits.
pub const MAX_SHADOWED_LIGHTS: usize = 16;

/// Maximum number of shadow-map splits across all lights (some data is
/// packed into float4s, so this can't exceed what the packing allows).
pub const MAX_SHADOW_SPLITS: usize = 64;

/// Maximum number of cascades for the directional (CSM) shadow path.
pub const CSM_MAX_CASCADES: usize = 2;

/// Number of IBL mip levels sampled by the specular path. Minimum linear
/// roughness is remapped to mip 1, so 128 texels per cubeface is enough.
pub const IBL_NUM_OF_MIP_LEVELS: u32 = 8;

/// Extra roughest mip below the sampled range (2 texels per cubeface).
pub const IBL_ROUGHEST_MIP: u32 = 1;

/// Total mip count the prefiltered environment map is expected to carry.
pub const IBL_NUM_OF_MIP_LEVELS_IN_TOTAL: u32 = IBL_NUM_OF_MIP_LEVELS + IBL_ROUGHEST_MIP;

/// Whether the environment map rotation parameter is compiled in.
pub const ENVMAP_ROTATION: bool = true;

/// Maximum number of reflection probes.
pub const MAX_REFLECTION_PROBES: usize = 8;

/// Side length of the shadow-map atlas in texels.
pub const SHADOW_ATLAS_SIZE: u32 = 2048;

/// Border around each shadow split in the atlas, in texels.
pub const SHADOW_SPLIT_BORDER: u32 = 2;
