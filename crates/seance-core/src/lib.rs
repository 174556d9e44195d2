pub mod bands;
pub mod capability;
pub mod constants;
pub mod ease;
pub mod field;
pub mod phase;
pub mod pointer;
pub mod raster;
pub mod trail;

pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");
pub static STATIC_WGSL: &str = include_str!("../shaders/static.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub use bands::*;
pub use field::*;
pub use phase::*;
pub use pointer::*;
pub use raster::*;
pub use trail::*;
