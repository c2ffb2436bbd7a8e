//! Scene composition
//!
//! [`SceneRoot`] is an arena that owns every renderable node and light. Bodies
//! keep only the [`VisualHandle`] index of their node; the animation loop moves
//! nodes through [`SceneRoot::set_transform`] and the render backend reads them.

use common::TextureRef;
use glam::{Mat4, Quat, Vec3};

use crate::bodies::BodyRegistry;
use crate::config::LightingConfig;

/// Index of a node in a [`SceneRoot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(usize);

impl VisualHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("body `{0}` already has a visual; the scene can only be composed once")]
    AlreadyComposed(String),
}

/// Textured sphere; unlit spheres glow at full texture brightness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f32,
    pub texture: TextureRef,
    pub lit: bool,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub sphere: Sphere,
    position: Vec3,
    rotation_y: f32,
}

impl SceneNode {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Object-to-world transform, unit sphere scaled by `radius`
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.sphere.radius),
            Quat::from_rotation_y(self.rotation_y),
            self.position,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Uniform fill from every direction
    Ambient { color: Vec3 },
    /// Parallel rays travelling from `position` toward the origin
    Directional { position: Vec3, color: Vec3, intensity: f32 },
}

impl Light {
    /// Direction the light travels in, for directional lights
    pub fn direction(&self) -> Option<Vec3> {
        match self {
            Light::Directional { position, .. } => Some(-position.normalize_or_zero()),
            Light::Ambient { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SceneRoot {
    nodes: Vec<SceneNode>,
    lights: Vec<Light>,
}

impl SceneRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sphere(&mut self, name: &str, sphere: Sphere, position: Vec3) -> VisualHandle {
        let handle = VisualHandle(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.to_string(),
            sphere,
            position,
            rotation_y: 0.0,
        });
        handle
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn node(&self, handle: VisualHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.0)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn set_transform(&mut self, handle: VisualHandle, position: Vec3, rotation_y: f32) {
        match self.nodes.get_mut(handle.0) {
            Some(node) => {
                node.position = position;
                node.rotation_y = rotation_y;
            }
            None => log::warn!("Transform for unknown visual {:?} dropped", handle),
        }
    }

    /// Sum of all ambient light colors
    pub fn ambient(&self) -> Vec3 {
        self.lights
            .iter()
            .filter_map(|light| match light {
                Light::Ambient { color } => Some(*color),
                _ => None,
            })
            .sum()
    }

    /// First directional light, if any
    pub fn directional(&self) -> Option<&Light> {
        self.lights
            .iter()
            .find(|light| matches!(light, Light::Directional { .. }))
    }
}

/// Build the scene for every registered body and record each node's handle
/// back into the registry. Must be called once, before the first frame.
pub fn compose_scene(registry: &mut BodyRegistry, lighting: &LightingConfig) -> Result<SceneRoot, SceneError> {
    if let Some((_, body)) = registry.iter().find(|(_, body)| body.visual().is_some()) {
        return Err(SceneError::AlreadyComposed(body.name().to_string()));
    }

    let mut scene = SceneRoot::new();
    let ids: Vec<_> = registry.iter().map(|(id, _)| id).collect();
    for id in ids {
        let Ok(body) = registry.get_body_mut(id) else {
            continue;
        };

        let (sphere, position) = match body.orbital_distance() {
            None => (
                Sphere { radius: body.radius(), texture: body.texture(), lit: false },
                Vec3::ZERO,
            ),
            Some(distance) => (
                Sphere { radius: body.radius(), texture: body.texture(), lit: true },
                Vec3::new(distance, 0.0, 0.0),
            ),
        };

        let handle = scene.add_sphere(body.name(), sphere, position);
        body.set_visual(handle);
        body.set_transform(position, 0.0);
    }

    scene.add_light(Light::Ambient { color: lighting.ambient_color });
    scene.add_light(Light::Directional {
        position: lighting.directional_position,
        color: lighting.directional_color,
        intensity: lighting.directional_intensity,
    });

    log::info!(
        "Composed scene: {} nodes, {} lights",
        scene.nodes.len(),
        scene.lights.len()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::TextureLoader;

    fn registry(loader: &mut TextureLoader) -> BodyRegistry {
        let mut registry = BodyRegistry::new();
        registry.add_sun("sun", 5.0, loader.request("sun.jpg")).unwrap();
        registry.add_body("mercury", 0.5, 10.0, loader.request("mercury.jpg")).unwrap();
        registry.add_body("earth", 1.0, 20.0, loader.request("earth.jpg")).unwrap();
        registry
    }

    #[test]
    fn every_body_gets_its_own_node() {
        let mut loader = TextureLoader::new();
        let mut registry = registry(&mut loader);
        let scene = compose_scene(&mut registry, &LightingConfig::default()).unwrap();

        assert_eq!(scene.nodes().len(), 3);
        let mut handles: Vec<_> = registry.iter().map(|(_, b)| b.visual().unwrap()).collect();
        handles.dedup();
        assert_eq!(handles.len(), 3);

        for (_, body) in registry.iter() {
            let node = scene.node(body.visual().unwrap()).unwrap();
            assert_eq!(node.name, body.name());
            assert_eq!(node.sphere.radius, body.radius());
            assert_eq!(node.sphere.texture, body.texture());
        }
    }

    #[test]
    fn sun_is_unlit_at_origin_and_planets_lit_on_x_axis() {
        let mut loader = TextureLoader::new();
        let mut registry = registry(&mut loader);
        let scene = compose_scene(&mut registry, &LightingConfig::default()).unwrap();

        let sun = registry.get_body(registry.sun().unwrap()).unwrap();
        let sun_node = scene.node(sun.visual().unwrap()).unwrap();
        assert!(!sun_node.sphere.lit);
        assert_eq!(sun_node.position(), Vec3::ZERO);

        let earth = registry.get_body(registry.find("earth").unwrap()).unwrap();
        let earth_node = scene.node(earth.visual().unwrap()).unwrap();
        assert!(earth_node.sphere.lit);
        assert_eq!(earth_node.position(), Vec3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn one_ambient_and_one_directional_light() {
        let mut loader = TextureLoader::new();
        let mut registry = registry(&mut loader);
        let lighting = LightingConfig::default();
        let scene = compose_scene(&mut registry, &lighting).unwrap();

        let ambient = scene.lights().iter().filter(|l| matches!(l, Light::Ambient { .. })).count();
        let directional = scene.lights().iter().filter(|l| matches!(l, Light::Directional { .. })).count();
        assert_eq!((ambient, directional), (1, 1));
        assert_eq!(scene.ambient(), lighting.ambient_color);

        let direction = scene.directional().and_then(Light::direction).unwrap();
        assert!((direction - (-Vec3::new(5.0, 3.0, 5.0).normalize())).length() < 1e-6);
    }

    #[test]
    fn composing_twice_is_rejected() {
        let mut loader = TextureLoader::new();
        let mut registry = registry(&mut loader);
        compose_scene(&mut registry, &LightingConfig::default()).unwrap();

        let err = compose_scene(&mut registry, &LightingConfig::default()).unwrap_err();
        assert_eq!(err, SceneError::AlreadyComposed("sun".to_string()));
    }

    #[test]
    fn model_matrix_scales_rotates_and_translates() {
        let mut loader = TextureLoader::new();
        let mut scene = SceneRoot::new();
        let sphere = Sphere { radius: 2.0, texture: loader.request("x.jpg"), lit: true };
        let handle = scene.add_sphere("x", sphere, Vec3::ZERO);
        scene.set_transform(handle, Vec3::new(1.0, 2.0, 3.0), std::f32::consts::FRAC_PI_2);

        let node = scene.node(handle).unwrap();
        let moved = node.model_matrix().transform_point3(Vec3::X);
        // +X rotated a quarter turn about Y lands on -Z, then scaled and offset
        assert!((moved - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5, "{moved:?}");
    }
}
