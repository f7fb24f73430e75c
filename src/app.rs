use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::config::DemoConfig;
use crate::palette::{Palette, DEFAULT_PALETTE};
use crate::render::camera::OrbitCamera;
use crate::render::engine::RenderEngine;
use crate::render::pipeline::TunnelUniforms;
use crate::ui::Controls;

/// The frame driver. Sole writer of the demo's one piece of mutable
/// shared state: the time value the shader reads each frame. Advances
/// once per display frame from `about_to_wait`; pause freezes it, the
/// speed multiplier scales it, and speed is clamped at zero so the
/// value never decreases.
pub struct FrameClock {
    last: Option<Instant>,
    time: f32,
    pub speed: f32,
    pub paused: bool,
    smoothed_fps: f32,
}

impl FrameClock {
    pub fn new(speed: f32) -> Self {
        Self {
            last: None,
            time: 0.0,
            speed: speed.max(0.0),
            paused: false,
            smoothed_fps: 0.0,
        }
    }

    /// Advance by a frame delta. Split out from [`tick`](Self::tick) so
    /// the accumulation rules are testable without a wall clock.
    fn advance(&mut self, dt: f32) {
        if !self.paused {
            self.time += dt.max(0.0) * self.speed.max(0.0);
        }
        if dt > 0.0 {
            let fps = 1.0 / dt;
            self.smoothed_fps = if self.smoothed_fps == 0.0 {
                fps
            } else {
                self.smoothed_fps * 0.9 + fps * 0.1
            };
        }
    }

    /// One call per display frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        self.advance(dt);
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

struct RunningState {
    engine: RenderEngine,
}

pub struct App {
    config: DemoConfig,
    palette_key: String,
    palette: Palette,
    controls: Controls,
    camera: OrbitCamera,
    clock: FrameClock,
    running: Option<RunningState>,
}

impl App {
    pub fn new(config: DemoConfig) -> Self {
        let palette_key = if Palette::get(&config.palette).is_some() {
            config.palette.clone()
        } else {
            log::warn!(
                "unknown palette {:?} requested, using {DEFAULT_PALETTE:?}",
                config.palette
            );
            DEFAULT_PALETTE.to_string()
        };
        let palette = Palette::resolve(&palette_key);

        let controls = Controls::new(
            palette_key.clone(),
            config.motion.speed,
            config.tunnel.rings * config.tunnel.segments,
        );
        let clock = FrameClock::new(config.motion.speed);

        Self {
            config,
            palette_key,
            palette,
            controls,
            camera: OrbitCamera::new(),
            clock,
            running: None,
        }
    }

    /// Fold overlay edits back into the clock and palette before the
    /// frame's uniforms are built.
    fn sync_controls(&mut self) {
        if self.controls.palette_key != self.palette_key {
            self.palette = Palette::resolve(&self.controls.palette_key);
            self.palette_key = self.controls.palette_key.clone();
            log::info!("palette: {}", self.palette_key);
        }
        self.clock.speed = self.controls.speed.max(0.0);
        self.clock.paused = self.controls.paused;
        self.controls.fps = self.clock.fps();
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.sync_controls();

        let running = self.running.as_mut().unwrap();

        let window = running.engine.gpu.window.clone();
        let egui_output = running.engine.overlay.run(&window, &mut self.controls);

        let view_proj = self.camera.view_proj(running.engine.aspect());
        let uniforms = TunnelUniforms::new(view_proj, &self.palette, self.clock.time());

        let output =
            running
                .engine
                .draw_and_submit(&uniforms, self.palette.background, &egui_output)?;
        output.present();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("tubeloop")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("create window"),
        );

        let engine = RenderEngine::new(window, &self.config.tunnel);
        self.controls.instance_count = engine.tunnel.instance_count;

        self.running = Some(RunningState { engine });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        use winit::keyboard::{KeyCode, PhysicalKey};

        // The overlay gets first refusal; the camera only sees pointer
        // input egui left alone.
        let overlay_consumed = match &mut self.running {
            Some(running) => {
                let window = running.engine.gpu.window.clone();
                running.engine.overlay.handle_event(&window, &event)
            }
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                self.config.palette = self.palette_key.clone();
                self.config.motion.speed = self.controls.speed;
                self.config.save();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(running) = &mut self.running {
                    running.engine.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if overlay_consumed {
                    return;
                }
                if let (PhysicalKey::Code(code), true) =
                    (event.physical_key, event.state.is_pressed())
                {
                    match code {
                        KeyCode::Escape => {
                            self.config.palette = self.palette_key.clone();
                            self.config.motion.speed = self.controls.speed;
                            self.config.save();
                            event_loop.exit();
                        }
                        KeyCode::Space => {
                            self.controls.paused = !self.controls.paused;
                            log::info!(
                                "animation: {}",
                                if self.controls.paused { "paused" } else { "running" }
                            );
                        }
                        KeyCode::Tab => {
                            self.controls.visible = !self.controls.visible;
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if self.running.is_some() {
                    match self.render_frame() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            let gpu = &self.running.as_ref().unwrap().engine.gpu;
                            gpu.surface.configure(&gpu.device, &gpu.config);
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::error!("render error: {e:?}"),
                    }
                }
            }
            other => {
                if !overlay_consumed {
                    self.camera.handle_event(&other);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.clock.tick();
        if let Some(running) = &self.running {
            running.engine.gpu.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accumulates_scaled_time() {
        let mut clock = FrameClock::new(2.0);
        clock.advance(0.5);
        clock.advance(0.25);
        assert!((clock.time() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn pause_freezes_without_losing_progress() {
        let mut clock = FrameClock::new(1.0);
        clock.advance(1.0);
        clock.paused = true;
        clock.advance(10.0);
        assert_eq!(clock.time(), 1.0);
        clock.paused = false;
        clock.advance(0.5);
        assert!((clock.time() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn time_never_decreases() {
        let mut clock = FrameClock::new(1.0);
        clock.speed = -3.0; // hostile speed still may not rewind time
        let before = clock.time();
        clock.advance(1.0);
        assert!(clock.time() >= before);

        clock.speed = 1.0;
        clock.advance(-1.0); // clock skew shows up as a zero-length frame
        assert!(clock.time() >= before);
    }

    #[test]
    fn fps_smooths_toward_the_frame_rate() {
        let mut clock = FrameClock::new(1.0);
        for _ in 0..200 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.fps() - 60.0).abs() < 1.0);
    }
}
