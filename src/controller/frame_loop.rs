use tracing::warn;

use crate::config::ViewerConfig;
use crate::controller::input::{InputEvent, InputState, KeyBindings};
use crate::controller::loader::{LoadedMesh, MeshLoader};
use crate::controller::SceneController;
use crate::model::SceneObject;

/// Per-frame camera matrices, column-major.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view: [f32; 16],
    pub proj: [f32; 16],
}

/// Per-object placement and line color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [f32; 16],
    pub color: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: [f32; 16], color: [f32; 3]) -> Self {
        Self { model, color: [color[0], color[1], color[2], 1.0] }
    }

    pub fn from_object(object: &SceneObject) -> Self {
        Self::new(object.model, object.color)
    }
}

/// Frames-per-second averaged over one-second windows.
#[derive(Debug, Default)]
pub struct FrameStats {
    pub fps: f32,
    frame_count: u32,
    timer: f32,
}

impl FrameStats {
    pub fn tick(&mut self, dt: f32) {
        self.frame_count += 1;
        self.timer += dt;
        if self.timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.timer;
            self.frame_count = 0;
            self.timer = 0.0;
        }
    }
}

/// Everything the frame loop owns apart from GPU state.
pub struct FrameLoopContext {
    pub controller: SceneController,
    pub input: InputState,
    pub bindings: KeyBindings,
    pub loader: MeshLoader,
    pub stats: FrameStats,
}

impl FrameLoopContext {
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        Self {
            controller: SceneController::with_options(
                config.camera.clone(),
                config.projection.clone(),
                width,
                height,
            ),
            input: InputState::new(),
            bindings: config.keybindings.clone(),
            loader: MeshLoader::new(),
            stats: FrameStats::default(),
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        self.input.process_event(event, &self.bindings, &mut self.controller);
    }

    /// Routes a window event that the UI overlay may have consumed. Consumed
    /// events are dropped, except releases, which always end held state.
    pub fn handle_window_event(&mut self, event: &InputEvent, captured_by_ui: bool) {
        if captured_by_ui && !event.is_release() {
            return;
        }
        self.handle_event(event);
    }

    /// Starts a background load for every object's mesh.
    pub fn request_meshes<'a>(&mut self, objects: impl IntoIterator<Item = &'a SceneObject>) {
        for (slot, object) in objects.into_iter().enumerate() {
            if let Err(e) = self.loader.request(slot, &object.mesh_path) {
                warn!(slot, object = %object.name, "could not start mesh load: {e}");
            }
        }
    }

    /// Advance one frame: apply held fly keys and collect finished loads.
    pub fn update(&mut self, dt: f32) -> Vec<LoadedMesh> {
        self.stats.tick(dt);
        let held = self.input.movement_snapshot(&self.bindings);
        if !held.is_empty() {
            self.controller.poll_movement_keys(&held);
        }
        self.loader.poll()
    }

    pub fn frame_uniform(&self) -> FrameUniform {
        FrameUniform {
            view: *self.controller.view_matrix(),
            proj: *self.controller.proj_matrix(),
        }
    }
}
