//! egui control overlay: context/winit/wgpu glue plus the one panel of
//! demo controls.

mod panel;

pub use panel::Controls;

use std::sync::Arc;
use winit::window::Window;

pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    pub renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: Arc<Window>) -> Self {
        let ctx = egui::Context::default();
        apply_style(&ctx);
        let viewport_id = ctx.viewport_id();
        let state = egui_winit::State::new(ctx.clone(), viewport_id, &window, None, None, None);
        let renderer =
            egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns true when egui consumed the event; camera input only
    /// sees what the overlay passes up.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run one overlay pass: gather input, draw the controls panel,
    /// hand back the platform output for the render step.
    pub fn run(&mut self, window: &Window, controls: &mut Controls) -> egui::FullOutput {
        let raw_input = self.state.take_egui_input(window);
        self.ctx.begin_pass(raw_input);
        panel::draw(&self.ctx, controls);
        let full_output = self.ctx.end_pass();
        self.state
            .handle_platform_output(window, full_output.platform_output.clone());
        full_output
    }

    /// Tessellate and upload; the returned paint jobs feed
    /// `renderer.render` inside the caller's pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        screen: &egui_wgpu::ScreenDescriptor,
        full_output: &egui::FullOutput,
    ) -> Vec<egui::ClippedPrimitive> {
        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes.clone(), full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &paint_jobs, screen);

        paint_jobs
    }

    pub fn cleanup(&mut self, full_output: &egui::FullOutput) {
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

/// Dark translucent panel over the tunnel; square corners, muted text.
fn apply_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let bg = egui::Color32::from_rgba_unmultiplied(10, 12, 20, 215);
    let text = egui::Color32::from_rgb(212, 218, 230);

    style.visuals.window_fill = bg;
    style.visuals.panel_fill = bg;
    style.visuals.window_corner_radius = egui::CornerRadius::ZERO;
    style.visuals.window_shadow = egui::epaint::Shadow::NONE;
    style.visuals.window_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(55, 65, 90));
    style.visuals.override_text_color = Some(text);

    ctx.set_style(style);
}
