//! Per-frame orbital animation
//!
//! Planets move on circles in the XZ plane. The phase is `(t / d) * s`, so the
//! angular rate falls off with orbital distance `d`: nearer planets lap the sun
//! faster. Self-rotation advances a fixed amount per frame, scaled by the same
//! speed multiplier `s`.

use glam::Vec3;

use crate::backend::RenderBackend;
use crate::bodies::BodyRegistry;
use crate::config::AnimationConfig;
use crate::scene::SceneRoot;
use crate::simulation::{Clock, SimulationState};
use crate::viewport::Viewport;

/// Orbital phase in radians at time `t` seconds
pub fn orbital_phase(t: f64, distance: f32, speed: f32) -> f64 {
    (t / distance as f64) * speed as f64
}

/// Point on the circle of radius `distance` at `phase`, keeping height `y`
pub fn orbital_position(distance: f32, phase: f64, y: f32) -> Vec3 {
    let distance = distance as f64;
    Vec3::new(
        (distance * phase.cos()) as f32,
        y,
        (distance * phase.sin()) as f32,
    )
}

/// Drives the registry and scene once per display refresh until stopped
#[derive(Debug, Clone)]
pub struct AnimationLoop {
    rotation_rate: f32,
    running: bool,
    frames: u64,
}

impl AnimationLoop {
    pub fn new(rotation_rate: f32) -> Self {
        Self {
            rotation_rate,
            running: true,
            frames: 0,
        }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(config.rotation_rate)
    }

    /// Recompute every orbiting body's transform for the current time and speed.
    pub fn advance<C: Clock>(&mut self, registry: &mut BodyRegistry, scene: &mut SceneRoot, state: &SimulationState<C>) {
        let speed = state.speed_multiplier();
        let t = state.time();
        let spin = self.rotation_rate * speed;

        for body in registry.bodies_mut() {
            let Some(distance) = body.orbital_distance() else {
                continue;
            };

            let rotation_y = body.rotation_y() + spin;
            let phase = orbital_phase(t, distance, speed);
            let position = orbital_position(distance, phase, body.position().y);

            body.set_transform(position, rotation_y);
            if let Some(visual) = body.visual() {
                scene.set_transform(visual, position, rotation_y);
            }
        }
    }

    /// One full frame: animate, draw, let the camera controls catch up.
    ///
    /// Returns whether the host should schedule another frame. A stopped loop
    /// does nothing and returns `Ok(false)`.
    pub fn frame<C, B>(
        &mut self,
        registry: &mut BodyRegistry,
        scene: &mut SceneRoot,
        state: &SimulationState<C>,
        viewport: &mut Viewport,
        backend: &mut B,
    ) -> Result<bool, B::Error>
    where
        C: Clock,
        B: RenderBackend + ?Sized,
    {
        if !self.running {
            return Ok(false);
        }

        self.advance(registry, scene, state);
        backend.render(scene, viewport.camera())?;
        viewport.update_controls();
        self.frames += 1;

        Ok(self.running)
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("Animation stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn rotation_rate(&self) -> f32 {
        self.rotation_rate
    }
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}
