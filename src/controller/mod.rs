// CONTROLLER: input, camera interaction, background loading and the frame loop
pub mod input;
pub mod scene_controller;
pub mod loader;
pub mod frame_loop;

pub use input::{InputEvent, InputState, KeyBindings, MouseButton, MovementKey};
pub use scene_controller::{InteractionMode, ProjectionType, SceneController};
pub use loader::{LoadedMesh, MeshLoader};
pub use frame_loop::{FrameLoopContext, FrameStats, FrameUniform, ObjectUniform};
