//! Common utilities for the orrery
//!
//! This crate provides the collaborators the animation core leans on: window and
//! GPU setup, a perspective camera with orbit-style controls, sphere meshes and
//! texture loading.

pub mod graphics;
pub mod camera;
pub mod mesh;
pub mod texture;

pub use graphics::*;
pub use camera::*;
pub use mesh::*;
pub use texture::*;

/// Default log filter; GPU backends are chatty at `info`.
pub const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Install the global logger. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    // A second call (e.g. from tests) keeps the first logger.
    let _ = env_logger::Builder::from_env(env).try_init();
}
