//! Scene-side data: lights, cameras, environment and render settings

mod camera;
mod environment;
mod light;
mod settings;
mod world;

pub use camera::*;
pub use environment::*;
pub use light::*;
pub use settings::*;
pub use world::*;
