// VIEW: GPU setup and line rendering
pub mod render;
pub mod gpu_init;

pub use render::{GpuMesh, GpuObject, ObjectBinding, RenderState, UiFrame};
pub use gpu_init::GpuContext;
