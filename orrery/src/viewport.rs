//! Viewport manager: camera projection and camera-control wiring

use common::{Camera3D, OrbitController};
use winit::event::{ElementState, WindowEvent};

use crate::backend::RenderBackend;
use crate::config::CameraConfig;

pub struct Viewport {
    camera: Camera3D,
    controls: OrbitController,
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            camera: configured_camera(config, aspect_ratio(width, height)),
            controls: OrbitController::new().with_damping(config.damping),
            width,
            height,
        }
    }

    /// Keep the projection in step with the output size.
    ///
    /// Returns false when nothing changed: repeated sizes and zero-sized
    /// (minimized) windows leave camera and backend untouched.
    pub fn on_resize<B: RenderBackend + ?Sized>(&mut self, width: u32, height: u32, backend: &mut B) -> bool {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return false;
        }

        self.width = width;
        self.height = height;
        self.camera.update_aspect_ratio(aspect_ratio(width, height));
        backend.set_output_size(width, height);
        log::debug!("Viewport resized to {}x{}", width, height);
        true
    }

    /// Route window input to the orbit controls. Returns true if consumed.
    pub fn handle_input(&mut self, event: &WindowEvent) -> bool {
        self.controls.handle_event(event)
    }

    /// Route input the overlay may already have claimed.
    ///
    /// Claimed events stay away from the camera, except button releases: a
    /// drag that started in the 3D view and ends over a panel must still end.
    pub fn route_input(&mut self, event: &WindowEvent, overlay_consumed: bool) -> bool {
        if !overlay_consumed {
            return self.handle_input(event);
        }
        if let WindowEvent::MouseInput { state: ElementState::Released, .. } = event {
            self.controls.end_drag();
        }
        false
    }

    /// Apply accumulated camera input; once per frame
    pub fn update_controls(&mut self) {
        self.controls.update(&mut self.camera);
    }

    /// Back to the configured viewpoint, keeping the current aspect ratio
    pub fn reset_camera(&mut self, config: &CameraConfig) {
        self.camera = configured_camera(config, aspect_ratio(self.width, self.height));
        self.controls = OrbitController::new().with_damping(config.damping);
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitController {
        &mut self.controls
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn configured_camera(config: &CameraConfig, aspect_ratio: f32) -> Camera3D {
    let mut camera = Camera3D::looking_from(
        config.eye,
        config.target,
        config.fov_degrees,
        aspect_ratio,
        config.near,
        config.far,
    );
    camera.max_distance = config.max_distance.min(camera.max_distance).max(camera.distance);
    camera
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use common::DragMode;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, MouseButton};

    fn left_button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: unsafe { DeviceId::dummy() },
            state,
            button: MouseButton::Left,
        }
    }

    fn cursor(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: unsafe { DeviceId::dummy() },
            position: PhysicalPosition::new(x, y),
        }
    }

    #[test]
    fn resize_updates_aspect_and_backend() {
        let mut viewport = Viewport::new(&CameraConfig::default(), 800, 600);
        let mut backend = HeadlessBackend::default();
        assert_eq!(viewport.camera().aspect_ratio, 800.0 / 600.0);

        assert!(viewport.on_resize(1600, 900, &mut backend));
        assert_eq!(viewport.camera().aspect_ratio, 1600.0 / 900.0);
        assert_eq!(backend.output_size, Some((1600, 900)));
        assert_eq!(viewport.size(), (1600, 900));
    }

    #[test]
    fn resize_to_same_size_is_a_no_op() {
        let mut viewport = Viewport::new(&CameraConfig::default(), 800, 600);
        let mut backend = HeadlessBackend::default();
        assert!(viewport.on_resize(1024, 768, &mut backend));
        assert!(!viewport.on_resize(1024, 768, &mut backend));
        assert_eq!(backend.resizes, 1);
    }

    #[test]
    fn minimized_window_is_ignored() {
        let mut viewport = Viewport::new(&CameraConfig::default(), 800, 600);
        let mut backend = HeadlessBackend::default();
        assert!(!viewport.on_resize(0, 0, &mut backend));
        assert_eq!(viewport.camera().aspect_ratio, 800.0 / 600.0);
        assert!(backend.output_size.is_none());
    }

    #[test]
    fn reset_restores_configured_eye() {
        let config = CameraConfig::default();
        let mut viewport = Viewport::new(&config, 800, 600);

        viewport.controls_mut().begin_drag(DragMode::Orbit);
        viewport.controls_mut().cursor_moved(0.0, 0.0);
        viewport.controls_mut().cursor_moved(120.0, 40.0);
        viewport.update_controls();
        assert!((viewport.camera().position - config.eye).length() > 1.0);

        viewport.reset_camera(&config);
        assert!((viewport.camera().position - config.eye).length() < 1e-3);
        assert_eq!(viewport.camera().aspect_ratio, 800.0 / 600.0);
    }

    #[test]
    fn release_over_panel_still_ends_drag() {
        let mut viewport = Viewport::new(&CameraConfig::default(), 800, 600);

        viewport.route_input(&left_button(ElementState::Pressed), false);
        viewport.route_input(&cursor(100.0, 100.0), false);
        viewport.route_input(&cursor(150.0, 100.0), false);
        viewport.update_controls();
        let after_drag = viewport.camera().position;

        // released over the control panel
        viewport.route_input(&left_button(ElementState::Released), true);
        assert!(!viewport.controls_mut().is_dragging());

        viewport.route_input(&cursor(300.0, 100.0), false);
        viewport.update_controls();
        assert_eq!(viewport.camera().position, after_drag);
    }

    #[test]
    fn claimed_press_does_not_start_drag() {
        let mut viewport = Viewport::new(&CameraConfig::default(), 800, 600);
        let before = viewport.camera().position;

        assert!(!viewport.route_input(&left_button(ElementState::Pressed), true));
        viewport.route_input(&cursor(0.0, 0.0), false);
        viewport.route_input(&cursor(200.0, 50.0), false);
        viewport.update_controls();

        assert!(!viewport.controls_mut().is_dragging());
        assert_eq!(viewport.camera().position, before);
    }

    #[test]
    fn wheel_zoom_is_bounded_by_config() {
        let config = CameraConfig::default();
        let mut viewport = Viewport::new(&config, 800, 600);
        for _ in 0..20 {
            viewport.controls_mut().scroll(-100.0);
            viewport.update_controls();
        }
        assert_eq!(viewport.camera().distance, config.max_distance);

        viewport.reset_camera(&config);
        assert_eq!(viewport.camera().max_distance, config.max_distance);
    }
}
