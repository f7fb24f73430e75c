use crate::palette::PALETTE_KEYS;

/// Overlay-editable demo state. The app mirrors these into the frame
/// clock and uniforms each frame; the overlay never touches GPU state
/// directly.
pub struct Controls {
    pub visible: bool,
    pub palette_key: String,
    pub speed: f32,
    pub paused: bool,
    pub fps: f32,
    pub instance_count: u32,
}

impl Controls {
    pub fn new(palette_key: String, speed: f32, instance_count: u32) -> Self {
        Self {
            visible: true,
            palette_key,
            speed,
            paused: false,
            fps: 0.0,
            instance_count,
        }
    }
}

pub fn draw(ctx: &egui::Context, controls: &mut Controls) {
    if !controls.visible {
        return;
    }

    egui::Window::new("tubeloop")
        .resizable(false)
        .default_pos([16.0, 16.0])
        .show(ctx, |ui| {
            egui::ComboBox::from_label("palette")
                .selected_text(controls.palette_key.clone())
                .show_ui(ui, |ui| {
                    for key in PALETTE_KEYS {
                        ui.selectable_value(
                            &mut controls.palette_key,
                            (*key).to_string(),
                            *key,
                        );
                    }
                });

            ui.add(
                egui::Slider::new(&mut controls.speed, 0.0..=4.0)
                    .text("speed")
                    .fixed_decimals(2),
            );
            ui.checkbox(&mut controls.paused, "paused");

            ui.separator();
            ui.label(format!("{:.0} fps", controls.fps));
            ui.label(format!("{} tubes", controls.instance_count));
            ui.small("drag to orbit, scroll to zoom, Tab hides this");
        });
}
