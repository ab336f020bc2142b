use egui::Context;
use crate::controller::{Control, FrameOutput, KeyBindings, Telemetry};

/// Raw input for a canvas-sized screen, used where no platform integration exists
pub fn screen_input(width: u32, height: u32, now_ms: f64) -> egui::RawInput {
    let mut raw_input = egui::RawInput::default();
    raw_input.time = Some(now_ms / 1000.0);
    raw_input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::new(0.0, 0.0),
        egui::vec2(width as f32, height as f32),
    ));
    raw_input
}

/// Build the complete HUD and return egui output
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    frame: Option<&FrameOutput>,
    bindings: &KeyBindings,
    dt: f32,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_telemetry_window(ctx, frame, dt);
        if let Some(frame) = frame {
            draw_mode_badges(ctx, &frame.telemetry);
        }
        draw_controls_window(ctx, bindings);
    })
}

/// Fraction of the current mode's top speed, for the speed bar
pub fn speed_fraction(telemetry: &Telemetry) -> f32 {
    if telemetry.mode.max_speed <= 0.0 {
        return 0.0;
    }
    (telemetry.velocity.abs() / telemetry.mode.max_speed).clamp(0.0, 1.0)
}

fn draw_telemetry_window(ctx: &Context, frame: Option<&FrameOutput>, dt: f32) {
    egui::Window::new("Telemetry")
        .default_pos([8.0, 8.0])
        .default_size([180.0, 120.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("FPS: {:.0}", if dt > 0.0 { 1.0 / dt } else { 0.0 }))
                    .small(),
            );
            let Some(frame) = frame else {
                ui.label(egui::RichText::new("No vehicle attached").small());
                return;
            };
            let t = &frame.telemetry;
            let pos = frame.vehicle.position;
            ui.label(egui::RichText::new(format!("Speed: {:.3} / {:.3}", t.velocity, t.target_speed)).small());
            ui.add(egui::ProgressBar::new(speed_fraction(t)).desired_width(160.0));
            ui.label(egui::RichText::new(format!("Pos: x: {:.1} y: {:.2} z: {:.1}", pos.x, pos.y, pos.z)).small());
            ui.label(egui::RichText::new(format!(
                "Heading: {:.1} Tilt: {:.1}",
                frame.vehicle.heading.to_degrees(),
                frame.vehicle.tilt.to_degrees(),
            )).small());
            let held: Vec<&str> = t.held_controls().map(|c| c.label()).collect();
            ui.label(egui::RichText::new(format!("Held: {}", held.join(" "))).small());
        });
}

fn draw_mode_badges(ctx: &Context, telemetry: &Telemetry) {
    egui::Area::new(egui::Id::new("mode_badges"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -12.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let badges = [
                    ("NITRO", telemetry.mode.boosting, egui::Color32::from_rgb(255, 140, 0)),
                    ("DRIFT", telemetry.mode.drifting, egui::Color32::from_rgb(0, 200, 255)),
                    ("SLIDE", telemetry.sliding, egui::Color32::from_rgb(230, 60, 60)),
                ];
                for (text, active, color) in badges {
                    let fill = if active { color } else { egui::Color32::from_gray(40) };
                    egui::Frame::NONE
                        .fill(fill)
                        .stroke(egui::Stroke::new(1.0, egui::Color32::BLACK))
                        .inner_margin(6.0)
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(text).size(12.0).color(egui::Color32::WHITE));
                        });
                }
            });
        });
}

fn draw_controls_window(ctx: &Context, bindings: &KeyBindings) {
    egui::Window::new("Controls")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .default_size([150.0, 100.0])
        .collapsible(true)
        .show(ctx, |ui| {
            for control in Control::ALL {
                let keys: Vec<String> = bindings
                    .keys_for(control)
                    .iter()
                    .map(|k| if k == " " { "Space".to_string() } else { k.clone() })
                    .collect();
                ui.label(egui::RichText::new(format!("{} - {}", keys.join(" / "), control.label())).small());
            }
        });
}
