//! Viewer configuration
//!
//! Every tunable lives here with the defaults the orrery ships with. Nothing is
//! read from disk or the environment.

use std::path::PathBuf;

use glam::Vec3;

#[derive(Debug, Clone, Default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub animation: AnimationConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Orrery - Solar System".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    /// Farthest the wheel can pull the eye from the target; keep below `far`
    pub max_distance: f32,
    /// Inertia for the orbit controls; 0 stops as soon as input stops
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            eye: Vec3::new(0.0, 20.0, 50.0),
            target: Vec3::ZERO,
            max_distance: 400.0,
            damping: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LightingConfig {
    /// Uniform fill, linear RGB
    pub ambient_color: Vec3,
    pub directional_color: Vec3,
    pub directional_intensity: f32,
    /// The directional light shines from here toward the origin
    pub directional_position: Vec3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: rgb_hex(0x333333),
            directional_color: Vec3::ONE,
            directional_intensity: 1.0,
            directional_position: Vec3::new(5.0, 3.0, 5.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationConfig {
    /// Self-rotation per frame at speed 1, radians
    pub rotation_rate: f32,
    pub initial_speed: f32,
    /// Upper end of the slider; larger values can still be typed in
    pub speed_slider_max: f32,
    /// Keyboard `+`/`-` increment
    pub speed_step: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rotation_rate: 0.01,
            initial_speed: 1.0,
            speed_slider_max: 10.0,
            speed_step: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub texture_dir: PathBuf,
    /// Slices and stacks of the shared sphere mesh
    pub sphere_segments: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("textures"),
            sphere_segments: 32,
        }
    }
}

/// `0xRRGGBB` to linear-ish RGB in `[0, 1]`
pub fn rgb_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}
