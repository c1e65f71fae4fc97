use egui::Context;

use crate::controller::{InteractionMode, KeyBindings, ProjectionType, SceneController};

/// Read-only numbers shown in the status window.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiStats {
    pub fps: f32,
    pub loaded: usize,
    pub total: usize,
    pub pending: usize,
}

/// Draws every window for one frame. Mode, view volume and reset go straight
/// through the controller.
pub fn draw(ctx: &Context, controller: &mut SceneController, bindings: &KeyBindings, stats: UiStats) {
    draw_status_window(ctx, controller, stats);
    draw_view_window(ctx, controller);
    draw_controls_window(ctx, controller.mode(), bindings);
}

fn draw_status_window(ctx: &Context, controller: &SceneController, stats: UiStats) {
    let cam = controller.camera();
    let (eye, center) = (cam.eye(), cam.center());

    egui::Window::new("Status")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", stats.fps)).small());
            ui.label(egui::RichText::new(format!("Eye: {:.2}, {:.2}, {:.2}", eye.x, eye.y, eye.z)).small());
            ui.label(
                egui::RichText::new(format!("Center: {:.2}, {:.2}, {:.2}", center.x, center.y, center.z)).small(),
            );
            ui.label(egui::RichText::new(format!("Distance: {:.2}", cam.distance())).small());
            ui.separator();
            ui.label(egui::RichText::new(format!("Meshes: {}/{}", stats.loaded, stats.total)).small());
            if stats.pending > 0 {
                ui.label(egui::RichText::new(format!("Loading {}...", stats.pending)).small());
            }
        });
}

fn draw_view_window(ctx: &Context, controller: &mut SceneController) {
    let width = controller.viewport().0 as f32;

    egui::Window::new("View")
        .default_pos([width - 180.0, 8.0])
        .default_size([170.0, 120.0])
        .show(ctx, |ui| {
            let mut mode = controller.mode();
            ui.label(egui::RichText::new("Interaction").small());
            ui.horizontal(|ui| {
                ui.radio_value(&mut mode, InteractionMode::Mouse, "Mouse");
                ui.radio_value(&mut mode, InteractionMode::Fly, "Fly");
            });
            if mode != controller.mode() {
                controller.set_mode(mode);
            }

            let mut projection = controller.projection_type();
            ui.label(egui::RichText::new("View volume").small());
            ui.horizontal(|ui| {
                ui.radio_value(&mut projection, ProjectionType::Perspective, "Perspective");
                ui.radio_value(&mut projection, ProjectionType::Orthographic, "Orthographic");
            });
            if projection != controller.projection_type() {
                controller.set_projection_type(projection);
            }

            ui.separator();
            if ui.button("Reset camera").clicked() {
                controller.reset_camera();
            }
        });
}

fn draw_controls_window(ctx: &Context, mode: InteractionMode, bindings: &KeyBindings) {
    egui::Window::new("Controls")
        .default_pos([8.0, 200.0])
        .default_open(false)
        .show(ctx, |ui| {
            let line = |ui: &mut egui::Ui, text: String| {
                ui.label(egui::RichText::new(text).small());
            };
            match mode {
                InteractionMode::Mouse => {
                    line(ui, "Drag - Orbit".into());
                    line(ui, "Shift + Drag - Track".into());
                    line(ui, "Wheel - Dolly".into());
                }
                InteractionMode::Fly => {
                    line(ui, "Drag - Look around".into());
                    line(ui, format!("{} / {} - Strafe", bindings.strafe_left, bindings.strafe_right));
                    line(ui, format!("{} / {} - Up / Down", bindings.up, bindings.down));
                    line(ui, format!("{} / {} - Forward / Back", bindings.dolly_in, bindings.dolly_out));
                }
            }
            ui.separator();
            line(ui, format!("{} - Switch mode", bindings.toggle_mode));
            line(ui, format!("{} - Switch view volume", bindings.toggle_view_volume));
            line(ui, format!("{} - Reset camera", bindings.reset_camera));
        });
}
