// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{RenderState, CameraResources, ModelBinding};
pub use gpu_init::{GpuContext, GpuInitError};
