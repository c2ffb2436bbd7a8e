//! Seam between the animation core and whatever draws the scene

use std::convert::Infallible;

use common::Camera3D;

use crate::scene::SceneRoot;

pub trait RenderBackend {
    type Error: std::error::Error;

    /// Resize the output surface, in physical pixels
    fn set_output_size(&mut self, width: u32, height: u32);

    /// Draw one frame synchronously
    fn render(&mut self, scene: &SceneRoot, camera: &Camera3D) -> Result<(), Self::Error>;
}

/// Backend that draws nothing and remembers what it was asked to do.
///
/// Used for headless stepping and in tests.
#[derive(Debug, Default, Clone)]
pub struct HeadlessBackend {
    pub draws: u64,
    pub output_size: Option<(u32, u32)>,
    pub resizes: u32,
    pub last_aspect_ratio: Option<f32>,
}

impl RenderBackend for HeadlessBackend {
    type Error = Infallible;

    fn set_output_size(&mut self, width: u32, height: u32) {
        self.output_size = Some((width, height));
        self.resizes += 1;
    }

    fn render(&mut self, _scene: &SceneRoot, camera: &Camera3D) -> Result<(), Self::Error> {
        self.draws += 1;
        self.last_aspect_ratio = Some(camera.aspect_ratio);
        Ok(())
    }
}
