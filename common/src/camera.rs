//! Perspective camera and orbit-style controls

use glam::{Mat4, Vec2, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pitch is kept just short of the poles so `look_at` never degenerates.
const MAX_PITCH: f32 = 1.5;

/// 3D perspective camera with orbital parameters
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    // Orbital parameters
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        let distance = 10.0;
        let yaw = 0.0f32;
        let pitch = 0.3f32;

        let position = Vec3::new(
            distance * pitch.cos() * yaw.sin(),
            distance * pitch.sin(),
            distance * pitch.cos() * yaw.cos(),
        );

        Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
            distance,
            yaw,
            pitch,
            min_distance: 1.0,
            max_distance: f32::INFINITY,
        }
    }

    /// Perspective camera placed at `eye`, looking at `target`.
    ///
    /// The orbital parameters are derived from the eye offset so that later
    /// orbit/zoom input continues smoothly from this viewpoint.
    pub fn looking_from(
        eye: Vec3,
        target: Vec3,
        fov_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH);
        let yaw = offset.x.atan2(offset.z);

        let mut camera = Self {
            target,
            fov: fov_degrees.to_radians(),
            near,
            far,
            distance,
            yaw,
            pitch,
            // zooming out must never push the target past the far plane
            max_distance: (far * 0.5).max(distance),
            ..Self::new(aspect_ratio)
        };
        camera.update_orbital();
        camera
    }

    /// Update camera position based on orbital parameters
    pub fn update_orbital(&mut self) {
        self.position = self.target + Vec3::new(
            self.distance * self.pitch.cos() * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.cos(),
        );
    }

    /// Orbit the camera around the target
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_orbital();
    }

    /// Zoom in/out
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(self.min_distance, self.max_distance);
        self.update_orbital();
    }

    /// Slide the target (and the camera with it) across the view plane
    pub fn pan(&mut self, right: f32, up: f32) {
        let forward = (self.target - self.position).normalize_or_zero();
        let side = forward.cross(self.up).normalize_or_zero();
        let lift = side.cross(forward).normalize_or_zero();
        self.target += side * right + lift * up;
        self.update_orbital();
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Get the combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Orbit,
    Pan,
}

/// Orbit-style camera controller.
///
/// Window input is accumulated as it arrives and applied to the camera once per
/// frame in [`OrbitController::update`]. With `damping > 0` the remaining motion
/// decays over the following frames instead of stopping dead.
#[derive(Debug, Clone)]
pub struct OrbitController {
    /// Radians of yaw/pitch per pixel of drag
    pub rotate_speed: f32,
    /// Fraction of the current distance moved per scroll line
    pub zoom_speed: f32,
    /// Fraction of the current distance panned per pixel of drag
    pub pan_speed: f32,
    /// Share of the pending motion kept for the next frame, in `[0, 1)`
    pub damping: f32,

    pending_orbit: Vec2,
    pending_pan: Vec2,
    pending_zoom: f32,
    drag: Option<DragMode>,
    last_cursor: Option<(f64, f64)>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            rotate_speed: 0.01,
            zoom_speed: 0.1,
            pan_speed: 0.002,
            damping: 0.0,
            pending_orbit: Vec2::ZERO,
            pending_pan: Vec2::ZERO,
            pending_zoom: 0.0,
            drag: None,
            last_cursor: None,
        }
    }
}

impl OrbitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 0.99);
        self
    }

    /// Feed a window event. Returns true when the event was camera input.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let mode = match button {
                    MouseButton::Left => DragMode::Orbit,
                    MouseButton::Right | MouseButton::Middle => DragMode::Pan,
                    _ => return false,
                };
                match state {
                    ElementState::Pressed => self.begin_drag(mode),
                    ElementState::Released => self.end_drag(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x, position.y);
                self.drag.is_some()
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.scroll(lines);
                true
            }
            _ => false,
        }
    }

    pub fn begin_drag(&mut self, mode: DragMode) {
        self.drag = Some(mode);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
        self.last_cursor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        let Some(mode) = self.drag else {
            return;
        };
        if let Some((last_x, last_y)) = self.last_cursor {
            let delta = Vec2::new((x - last_x) as f32, (y - last_y) as f32);
            match mode {
                DragMode::Orbit => self.pending_orbit += delta,
                DragMode::Pan => self.pending_pan += delta,
            }
        }
        self.last_cursor = Some((x, y));
    }

    /// Positive lines zoom in
    pub fn scroll(&mut self, lines: f32) {
        self.pending_zoom += lines;
    }

    /// Apply accumulated input to the camera. Call once per frame.
    pub fn update(&mut self, camera: &mut Camera3D) {
        if self.pending_orbit != Vec2::ZERO {
            camera.orbit(
                self.pending_orbit.x * self.rotate_speed,
                self.pending_orbit.y * self.rotate_speed,
            );
        }
        if self.pending_pan != Vec2::ZERO {
            let scale = self.pan_speed * camera.distance;
            camera.pan(-self.pending_pan.x * scale, self.pending_pan.y * scale);
        }
        if self.pending_zoom != 0.0 {
            camera.zoom(self.pending_zoom * camera.distance * self.zoom_speed);
        }

        self.pending_orbit = decay(self.pending_orbit, self.damping);
        self.pending_pan = decay(self.pending_pan, self.damping);
        self.pending_zoom = if self.damping > 0.0 && self.pending_zoom.abs() > 1e-4 {
            self.pending_zoom * self.damping
        } else {
            0.0
        };
    }
}

fn decay(motion: Vec2, damping: f32) -> Vec2 {
    let kept = motion * damping;
    if kept.length_squared() < 1e-8 {
        Vec2::ZERO
    } else {
        kept
    }
}
