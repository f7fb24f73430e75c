use glam::{Mat4, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = std::f32::consts::PI - 0.05;
const MIN_DISTANCE: f32 = 0.05;
const MAX_DISTANCE: f32 = 60.0;

/// Orbit rig parked at the tunnel mouth: yaw spins around the tunnel
/// axis, pitch tilts off it, distance backs away from the target.
/// Pitch 0 would look straight down the tunnel with a degenerate up
/// vector, so it is clamped just short of the poles.
pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    distance: f32,
    target: Vec3,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
    rotate_speed: f32,
    zoom_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: MIN_PITCH,
            distance: 0.1,
            target: Vec3::ZERO,
            dragging: false,
            last_cursor: None,
            rotate_speed: 0.01,
            zoom_speed: 0.05,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let dir = Vec3::new(
            self.pitch.sin() * self.yaw.sin(),
            self.pitch.cos(),
            self.pitch.sin() * self.yaw.cos(),
        );
        self.target + dir * self.distance
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(60.0_f32.to_radians(), aspect, 0.1, 200.0);
        proj * view
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.rotate_speed;
        self.pitch = (self.pitch + dy * self.rotate_speed).clamp(MIN_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance =
            (self.distance * (1.0 - delta * self.zoom_speed)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Feed a window event to the rig. Returns true if it was consumed
    /// (the overlay gets first refusal before this is called).
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x, position.y);
                if let (true, Some((lx, ly))) = (self.dragging, self.last_cursor) {
                    self.rotate((x - lx) as f32, (y - ly) as f32);
                }
                self.last_cursor = Some((x, y));
                self.dragging
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                self.zoom(scroll);
                true
            }
            _ => false,
        }
    }
}
