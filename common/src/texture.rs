//! Deferred texture loading
//!
//! [`TextureLoader::request`] hands out a [`TextureRef`] immediately; the image is
//! decoded later, one per [`TextureLoader::poll`], so callers can build a scene
//! before any asset is on the GPU.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Opaque handle to a requested texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureRef(u32);

impl TextureRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load texture {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result of one decode step
#[derive(Debug)]
pub struct LoadedTexture {
    pub texture: TextureRef,
    pub result: Result<image::RgbaImage, TextureError>,
}

#[derive(Debug, Default)]
pub struct TextureLoader {
    by_path: HashMap<PathBuf, TextureRef>,
    paths: Vec<PathBuf>,
    pending: VecDeque<TextureRef>,
}

impl TextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `path` for loading. Requesting the same path twice returns the same handle.
    pub fn request(&mut self, path: impl AsRef<Path>) -> TextureRef {
        let path = path.as_ref();
        if let Some(&texture) = self.by_path.get(path) {
            return texture;
        }

        let texture = TextureRef(self.paths.len() as u32);
        self.paths.push(path.to_path_buf());
        self.by_path.insert(path.to_path_buf(), texture);
        self.pending.push_back(texture);
        log::debug!("Queued texture {:?} from {}", texture, path.display());
        texture
    }

    /// Decode the next queued texture, if any.
    pub fn poll(&mut self) -> Option<LoadedTexture> {
        let texture = self.pending.pop_front()?;
        let path = &self.paths[texture.index()];
        let result = image::open(path)
            .map(|image| image.to_rgba8())
            .map_err(|source| TextureError::Load {
                path: path.clone(),
                source,
            });
        Some(LoadedTexture { texture, result })
    }

    pub fn path(&self, texture: TextureRef) -> Option<&Path> {
        self.paths.get(texture.index()).map(PathBuf::as_path)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_immediate_and_deduplicated() {
        let mut loader = TextureLoader::new();
        let earth = loader.request("textures/earth.jpg");
        let mars = loader.request("textures/mars.jpg");
        let earth_again = loader.request("textures/earth.jpg");

        assert_ne!(earth, mars);
        assert_eq!(earth, earth_again);
        assert_eq!(loader.len(), 2);
        assert_eq!(loader.pending(), 2);
        assert_eq!(loader.path(mars), Some(Path::new("textures/mars.jpg")));
    }

    #[test]
    fn missing_file_reports_error_without_panicking() {
        let mut loader = TextureLoader::new();
        let texture = loader.request("definitely/not/here.jpg");

        let loaded = loader.poll().expect("one pending texture");
        assert_eq!(loaded.texture, texture);
        assert!(matches!(loaded.result, Err(TextureError::Load { .. })));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn decodes_png_from_disk() {
        let path = std::env::temp_dir().join(format!("common-texture-{}.png", std::process::id()));
        let mut image = image::RgbaImage::new(2, 1);
        image.put_pixel(1, 0, image::Rgba([255, 0, 0, 255]));
        image.save(&path).expect("write test png");

        let mut loader = TextureLoader::new();
        loader.request(&path);
        let decoded = loader.poll().expect("pending").result.expect("decodes");
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn poll_drains_in_request_order() {
        let mut loader = TextureLoader::new();
        let first = loader.request("a.png");
        let second = loader.request("b.png");
        assert_eq!(loader.poll().map(|l| l.texture), Some(first));
        assert_eq!(loader.poll().map(|l| l.texture), Some(second));
        assert_eq!(loader.pending(), 0);
    }
}
