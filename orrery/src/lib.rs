//! Orrery - animated solar system
//!
//! A sun and eight planets on circular orbits, lit by an ambient and a
//! directional light, with orbit-style camera controls and a speed slider.
//!
//! The animation core (registry, scene arena, animation loop, speed control,
//! viewport) is independent of the GPU: anything implementing
//! [`backend::RenderBackend`] can draw it. [`renderer::WgpuBackend`] is the
//! windowed implementation; [`backend::HeadlessBackend`] drives tests.

pub mod animation;
pub mod backend;
pub mod bodies;
pub mod config;
pub mod overlay;
pub mod panel;
pub mod renderer;
pub mod scene;
pub mod simulation;
pub mod speed;
pub mod viewport;

pub use animation::{orbital_phase, orbital_position, AnimationLoop};
pub use backend::{HeadlessBackend, RenderBackend};
pub use bodies::{register_solar_system, BodyId, BodyRegistry, CelestialBody, RegistryError};
pub use config::ViewerConfig;
pub use scene::{compose_scene, SceneError, SceneRoot, VisualHandle};
pub use simulation::{Clock, ManualClock, MonotonicClock, SimulationState};
pub use speed::SpeedControl;
pub use viewport::Viewport;
