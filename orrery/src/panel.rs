//! Control panel: the speed slider plus a live readout of the bodies

use egui::{Color32, Context, RichText};

/// What the panel shows this frame
pub struct PanelStatus<'a> {
    pub speed: f32,
    pub speed_slider_max: f32,
    pub time: f64,
    pub frames: u64,
    pub fps: f32,
    pub bodies: &'a [BodyReadout],
}

pub struct BodyReadout {
    pub name: String,
    pub orbital_distance: Option<f32>,
    pub position: glam::Vec3,
}

/// Draw the panel. Returns the slider value when the user moved it.
pub fn draw_control_panel(ctx: &Context, status: &PanelStatus) -> Option<f32> {
    let mut speed = status.speed;
    let mut changed = false;

    egui::TopBottomPanel::top("controls").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let slider = egui::Slider::new(&mut speed, 0.0..=status.speed_slider_max)
                .text("speed")
                .clamp_to_range(false);
            changed = ui.add(slider).changed();

            ui.separator();
            ui.label(format!("t = {:.1} s", status.time));
            ui.separator();
            ui.label(format!("{:.0} fps", status.fps));
            ui.separator();
            if status.speed == 0.0 {
                ui.label(RichText::new("FROZEN").color(Color32::YELLOW));
            } else {
                ui.label(RichText::new("RUNNING").color(Color32::GREEN));
            }
        });
    });

    egui::SidePanel::right("bodies_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading(RichText::new("Bodies").color(Color32::LIGHT_BLUE));
            ui.separator();
            ui.collapsing(RichText::new("Positions").strong(), |ui| {
                egui::Grid::new("bodies_grid")
                    .num_columns(3)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for body in status.bodies {
                            ui.label(RichText::new(&body.name).color(Color32::LIGHT_GREEN));
                            match body.orbital_distance {
                                Some(distance) => ui.label(format!("d = {distance}")),
                                None => ui.label("center"),
                            };
                            ui.label(
                                RichText::new(format!("({:.1}, {:.1})", body.position.x, body.position.z))
                                    .monospace(),
                            );
                            ui.end_row();
                        }
                    });
            });
            ui.add_space(8.0);
            ui.label(RichText::new(format!("frame {}", status.frames)).small().italics());
        });

    changed.then_some(speed)
}
