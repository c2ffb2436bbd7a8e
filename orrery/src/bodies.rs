//! Celestial body registry
//!
//! Static description (name, radius, orbital distance, texture) plus the live
//! transform of the sun and every planet. Sizes and distances are visual units,
//! not astronomical ones.

use std::collections::HashMap;
use std::path::Path;

use common::{TextureLoader, TextureRef};
use glam::Vec3;

use crate::scene::VisualHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("a body named `{0}` is already registered")]
    DuplicateName(String),

    #[error("no body with id {0:?}")]
    NotFound(BodyId),

    #[error("body `{name}` needs a positive, finite orbital distance, got {distance}")]
    InvalidOrbit { name: String, distance: f32 },

    #[error("body `{name}` needs a positive, finite radius, got {radius}")]
    InvalidRadius { name: String, radius: f32 },

    #[error("`{0}` is already registered as the sun")]
    SunAlreadyRegistered(String),
}

/// A sun or planet
#[derive(Debug, Clone)]
pub struct CelestialBody {
    name: String,
    radius: f32,
    orbital_distance: Option<f32>,
    texture: TextureRef,
    visual: Option<VisualHandle>,
    position: Vec3,
    rotation_y: f32,
}

impl CelestialBody {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// `None` for the sun, which sits at the origin
    pub fn orbital_distance(&self) -> Option<f32> {
        self.orbital_distance
    }

    pub fn is_sun(&self) -> bool {
        self.orbital_distance.is_none()
    }

    pub fn texture(&self) -> TextureRef {
        self.texture
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Accumulated self-rotation in radians; grows without wrapping
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub(crate) fn set_visual(&mut self, visual: VisualHandle) {
        self.visual = Some(visual);
    }

    pub(crate) fn set_transform(&mut self, position: Vec3, rotation_y: f32) {
        self.position = position;
        self.rotation_y = rotation_y;
    }
}

#[derive(Debug, Default)]
pub struct BodyRegistry {
    bodies: Vec<CelestialBody>,
    by_name: HashMap<String, BodyId>,
    sun: Option<BodyId>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an orbiting body, placed at `(orbital_distance, 0, 0)`.
    pub fn add_body(
        &mut self,
        name: &str,
        radius: f32,
        orbital_distance: f32,
        texture: TextureRef,
    ) -> Result<BodyId, RegistryError> {
        self.check_name(name)?;
        check_radius(name, radius)?;
        if !orbital_distance.is_finite() || orbital_distance <= 0.0 {
            return Err(RegistryError::InvalidOrbit {
                name: name.to_string(),
                distance: orbital_distance,
            });
        }

        Ok(self.insert(CelestialBody {
            name: name.to_string(),
            radius,
            orbital_distance: Some(orbital_distance),
            texture,
            visual: None,
            position: Vec3::new(orbital_distance, 0.0, 0.0),
            rotation_y: 0.0,
        }))
    }

    /// Register the single, stationary sun at the origin.
    pub fn add_sun(&mut self, name: &str, radius: f32, texture: TextureRef) -> Result<BodyId, RegistryError> {
        self.check_name(name)?;
        check_radius(name, radius)?;
        if let Some(sun) = self.sun {
            return Err(RegistryError::SunAlreadyRegistered(self.bodies[sun.0].name.clone()));
        }

        let id = self.insert(CelestialBody {
            name: name.to_string(),
            radius,
            orbital_distance: None,
            texture,
            visual: None,
            position: Vec3::ZERO,
            rotation_y: 0.0,
        });
        self.sun = Some(id);
        Ok(id)
    }

    pub fn get_body(&self, id: BodyId) -> Result<&CelestialBody, RegistryError> {
        self.bodies.get(id.0).ok_or(RegistryError::NotFound(id))
    }

    pub(crate) fn get_body_mut(&mut self, id: BodyId) -> Result<&mut CelestialBody, RegistryError> {
        self.bodies.get_mut(id.0).ok_or(RegistryError::NotFound(id))
    }

    /// Find body by name
    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.by_name.get(name).copied()
    }

    pub fn sun(&self) -> Option<BodyId> {
        self.sun
    }

    /// Bodies in registration order
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &CelestialBody)> {
        self.bodies.iter().enumerate().map(|(i, body)| (BodyId(i), body))
    }

    pub(crate) fn bodies_mut(&mut self) -> impl Iterator<Item = &mut CelestialBody> {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn check_name(&self, name: &str) -> Result<(), RegistryError> {
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, body: CelestialBody) -> BodyId {
        let id = BodyId(self.bodies.len());
        self.by_name.insert(body.name.clone(), id);
        self.bodies.push(body);
        id
    }
}

fn check_radius(name: &str, radius: f32) -> Result<(), RegistryError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(RegistryError::InvalidRadius {
            name: name.to_string(),
            radius,
        });
    }
    Ok(())
}

/// Catalogue entry: `orbital_distance` is `None` for the sun
#[derive(Debug, Clone, Copy)]
pub struct CatalogueEntry {
    pub name: &'static str,
    pub radius: f32,
    pub orbital_distance: Option<f32>,
}

/// The sun and the eight planets, in visual units
pub const SOLAR_SYSTEM: &[CatalogueEntry] = &[
    CatalogueEntry { name: "sun", radius: 5.0, orbital_distance: None },
    CatalogueEntry { name: "mercury", radius: 0.5, orbital_distance: Some(10.0) },
    CatalogueEntry { name: "venus", radius: 0.9, orbital_distance: Some(15.0) },
    CatalogueEntry { name: "earth", radius: 1.0, orbital_distance: Some(20.0) },
    CatalogueEntry { name: "mars", radius: 0.7, orbital_distance: Some(25.0) },
    CatalogueEntry { name: "jupiter", radius: 4.0, orbital_distance: Some(30.0) },
    CatalogueEntry { name: "saturn", radius: 2.0, orbital_distance: Some(31.0) },
    CatalogueEntry { name: "uranus", radius: 1.7, orbital_distance: Some(31.0) },
    CatalogueEntry { name: "neptune", radius: 1.7, orbital_distance: Some(32.0) },
];

/// Register [`SOLAR_SYSTEM`], requesting `<texture_dir>/<name>.jpg` for each body.
pub fn register_solar_system(
    registry: &mut BodyRegistry,
    loader: &mut TextureLoader,
    texture_dir: &Path,
) -> Result<(), RegistryError> {
    for entry in SOLAR_SYSTEM {
        let texture = loader.request(texture_dir.join(format!("{}.jpg", entry.name)));
        match entry.orbital_distance {
            Some(distance) => registry.add_body(entry.name, entry.radius, distance, texture)?,
            None => registry.add_sun(entry.name, entry.radius, texture)?,
        };
    }
    log::info!("Registered {} bodies", registry.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(loader: &mut TextureLoader, name: &str) -> TextureRef {
        loader.request(format!("textures/{name}.jpg"))
    }

    #[test]
    fn planets_start_on_the_x_axis() {
        let mut loader = TextureLoader::new();
        let mut registry = BodyRegistry::new();
        let earth = registry.add_body("earth", 1.0, 20.0, texture(&mut loader, "earth")).unwrap();

        let body = registry.get_body(earth).unwrap();
        assert_eq!(body.name(), "earth");
        assert_eq!(body.orbital_distance(), Some(20.0));
        assert_eq!(body.position(), Vec3::new(20.0, 0.0, 0.0));
        assert_eq!(body.rotation_y(), 0.0);
        assert!(body.visual().is_none());
        assert!(!body.is_sun());
    }

    #[test]
    fn duplicate_name_is_rejected_and_registry_unchanged() {
        let mut loader = TextureLoader::new();
        let mut registry = BodyRegistry::new();
        let tex = texture(&mut loader, "earth");
        let earth = registry.add_body("earth", 1.0, 20.0, tex).unwrap();

        let err = registry.add_body("earth", 3.0, 40.0, tex).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("earth".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("earth"), Some(earth));
        assert_eq!(registry.get_body(earth).unwrap().orbital_distance(), Some(20.0));

        // A sun cannot take a planet's name either
        assert!(matches!(registry.add_sun("earth", 5.0, tex), Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut loader = TextureLoader::new();
        let mut registry = BodyRegistry::new();
        let id = registry.add_body("mars", 0.7, 25.0, texture(&mut loader, "mars")).unwrap();
        let empty = BodyRegistry::new();
        assert_eq!(empty.get_body(id).unwrap_err(), RegistryError::NotFound(id));
    }

    #[test]
    fn degenerate_orbits_and_radii_are_rejected() {
        let mut loader = TextureLoader::new();
        let mut registry = BodyRegistry::new();
        let tex = texture(&mut loader, "x");

        for distance in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let err = registry.add_body("x", 1.0, distance, tex).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidOrbit { .. }), "{distance}: {err}");
        }
        for radius in [0.0, -1.0, f32::NAN] {
            let err = registry.add_body("x", radius, 10.0, tex).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidRadius { .. }), "{radius}: {err}");
        }
        assert!(registry.is_empty());
        assert!(registry.find("x").is_none());
    }

    #[test]
    fn only_one_sun() {
        let mut loader = TextureLoader::new();
        let mut registry = BodyRegistry::new();
        let sun = registry.add_sun("sun", 5.0, texture(&mut loader, "sun")).unwrap();
        assert_eq!(registry.sun(), Some(sun));
        assert!(registry.get_body(sun).unwrap().is_sun());

        let err = registry.add_sun("sol", 5.0, texture(&mut loader, "sol")).unwrap_err();
        assert_eq!(err, RegistryError::SunAlreadyRegistered("sun".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn solar_system_catalogue_registers_sun_and_eight_planets() {
        let mut loader = TextureLoader::new();
        let mut registry = BodyRegistry::new();
        register_solar_system(&mut registry, &mut loader, Path::new("textures")).unwrap();

        assert_eq!(registry.len(), 9);
        assert_eq!(registry.iter().filter(|(_, b)| b.is_sun()).count(), 1);
        assert_eq!(loader.len(), 9);

        let jupiter = registry.get_body(registry.find("jupiter").unwrap()).unwrap();
        assert_eq!(jupiter.radius(), 4.0);
        assert_eq!(loader.path(jupiter.texture()), Some(Path::new("textures/jupiter.jpg")));

        // Registering twice trips the uniqueness check
        assert!(matches!(
            register_solar_system(&mut registry, &mut loader, Path::new("textures")),
            Err(RegistryError::DuplicateName(_))
        ));
    }
}
