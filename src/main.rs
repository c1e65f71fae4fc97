use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use wireview::{
    config::ViewerConfig,
    controller::{FrameLoopContext, InputEvent, MouseButton},
    logging,
    model::{MeshData, Scene},
    ui::{self, UiStats},
    view::{GpuContext, GpuObject, RenderState, UiFrame},
    Result, ViewerError,
};

/// Wheel line ticks are scaled to roughly match pixel deltas.
const WHEEL_LINE_SCALE: f32 = 100.0;

struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    scene: Scene<GpuObject>,
    frame: FrameLoopContext,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,

    last_frame_time: Instant,
}

impl Viewer {
    fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let (width, height) = gpu.size();

        let grid = MeshData::grid(config.grid.half_cells, config.grid.spacing);
        let render_state = RenderState::new(&gpu, &grid, config.grid.color);

        let scene: Scene<GpuObject> = Scene::from_options(&config.objects);
        let mut frame = FrameLoopContext::new(config, width, height);
        frame.request_meshes(scene.objects());
        info!(objects = scene.len(), "scene created, meshes loading");

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Ok(Self {
            window,
            gpu,
            render_state,
            scene,
            frame,
            egui_ctx,
            egui_state,
            last_frame_time: Instant::now(),
        })
    }

    /// Translates a window event for the controller. Returns `false` for
    /// events that are not input. Releases get through even when egui
    /// captured them, so a drag ending over a UI window still ends.
    fn input(&mut self, event: &WindowEvent, captured_by_ui: bool) -> bool {
        let translated = match event {
            WindowEvent::KeyboardInput { event, .. } => match &event.physical_key {
                PhysicalKey::Code(code) => {
                    let key = format!("{code:?}");
                    match event.state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    }
                }
                PhysicalKey::Unidentified(_) => return false,
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                InputEvent::ModifiersChanged { shift: modifiers.state().shift_key() }
            }
            WindowEvent::CursorMoved { position, .. } => {
                InputEvent::CursorMoved { x: position.x as f32, y: position.y as f32 }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => return false,
                };
                InputEvent::MouseButton { button, pressed: *state == ElementState::Pressed }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * WHEEL_LINE_SCALE,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                InputEvent::MouseWheel { delta }
            }
            WindowEvent::Focused(false) => InputEvent::FocusLost,
            _ => return false,
        };
        self.frame.handle_window_event(&translated, captured_by_ui);
        true
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.render_state.resize(&self.gpu.device, width, height);
        self.frame.controller.resize(width, height);
    }

    fn update(&mut self, dt: f32) {
        for loaded in self.frame.update(dt) {
            let gpu_object = match self.scene.objects().get(loaded.slot) {
                Some(object) => self.render_state.upload_object(&self.gpu.device, &loaded.mesh, object),
                None => {
                    warn!(slot = loaded.slot, "mesh arrived for unknown slot");
                    continue;
                }
            };
            self.scene.set_mesh(loaded.slot, gpu_object);
        }
    }

    fn render_ui(&mut self) -> UiFrame {
        let stats = UiStats {
            fps: self.frame.stats.fps,
            loaded: self.scene.loaded_count(),
            total: self.scene.len(),
            pending: self.frame.loader.pending(),
        };
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let frame = &mut self.frame;
        let output = self.egui_ctx.run(raw_input, |ctx| {
            ui::draw(ctx, &mut frame.controller, &frame.bindings, stats);
        });
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let pixels_per_point = self.window.scale_factor() as f32;
        let (width, height) = self.gpu.size();
        UiFrame {
            primitives: self.egui_ctx.tessellate(output.shapes, pixels_per_point),
            textures_delta: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor { size_in_pixels: [width, height], pixels_per_point },
        }
    }

    fn render(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let ui_frame = self.render_ui();
        // after the UI so its mode, view-volume and reset changes show this frame
        self.render_state.write_frame_uniform(&self.gpu.queue, &self.frame.frame_uniform());
        self.render_state.draw_frame(&self.gpu, &self.scene, ui_frame)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.update(dt);

        match self.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => warn!("surface error: {e}"),
        }
    }
}

struct App {
    config: ViewerConfig,
    viewer: Option<Viewer>,
    error: Option<ViewerError>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self { config, viewer: None, error: None }
    }

    fn create_viewer(&self, event_loop: &ActiveEventLoop) -> Result<Viewer> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = event_loop
            .create_window(window_attributes)
            .map_err(|e| ViewerError::Window(e.to_string()))?;
        Viewer::new(Arc::new(window), &self.config)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        match self.create_viewer(event_loop) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => {
                error!("failed to start viewer: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else { return };
        if window_id != viewer.window.id() {
            return;
        }

        // egui gets first pick; of what it consumes only releases reach the camera
        let egui_captured = viewer.egui_state.on_window_event(&viewer.window, &event).consumed;
        if viewer.input(&event, egui_captured) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => viewer.resize(size.width, size.height),
            WindowEvent::RedrawRequested => viewer.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            viewer.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    let config = ViewerConfig::from_env();
    let event_loop = EventLoop::new().map_err(|e| ViewerError::Window(e.to_string()))?;
    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| ViewerError::Window(e.to_string()))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
