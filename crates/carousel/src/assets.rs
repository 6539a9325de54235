//! Texture assets and the loader that produces them.
//!
//! Loading is a barrier: every requested image is decoded before anything
//! downstream is built, and a single failure rejects the whole batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use image::RgbaImage;

/// Index of an asset in the session asset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureId(pub usize);

impl TextureId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TextureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image '{name}' has zero width or height")]
    Empty { name: String },
    #[error("decoder thread for {} panicked", path.display())]
    WorkerPanicked { path: PathBuf },
}

/// Decoded RGBA8 image plus the metadata the carousel needs.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    name: String,
    image: Arc<RgbaImage>,
    aspect_ratio: f32,
}

impl TextureAsset {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Result<Self, AssetError> {
        let name = name.into();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::Empty { name });
        }
        Ok(Self {
            name,
            aspect_ratio: width as f32 / height as f32,
            image: Arc::new(image),
        })
    }

    /// Single-colour asset, handy for previews and tests.
    pub fn solid(
        name: impl Into<String>,
        width: u32,
        height: u32,
        rgba: [u8; 4],
    ) -> Result<Self, AssetError> {
        Self::new(
            name,
            RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}

/// Resolves ordered image sources into same-order decoded assets.
pub trait AssetLoader {
    fn load(&self, sources: &[PathBuf]) -> Result<Vec<TextureAsset>, AssetError>;
}

/// Decodes images from disk, one scoped worker per file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAssetLoader;

impl FileAssetLoader {
    pub fn new() -> Self {
        Self
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, sources: &[PathBuf]) -> Result<Vec<TextureAsset>, AssetError> {
        let results: Vec<Result<TextureAsset, AssetError>> = thread::scope(|scope| {
            let workers: Vec<_> = sources
                .iter()
                .map(|path| scope.spawn(move || decode_texture(path)))
                .collect();
            workers
                .into_iter()
                .zip(sources)
                .map(|(worker, path)| {
                    worker.join().unwrap_or_else(|_| {
                        Err(AssetError::WorkerPanicked { path: path.clone() })
                    })
                })
                .collect()
        });

        let assets = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = assets.len(), "decoded texture assets");
        Ok(assets)
    }
}

fn decode_texture(path: &Path) -> Result<TextureAsset, AssetError> {
    let decoded = image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracing::trace!(path = %path.display(), width = decoded.width(), height = decoded.height(), "decoded image");
    TextureAsset::new(name, decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let asset = TextureAsset::solid("wide", 300, 200, [0, 0, 0, 255]).unwrap();
        assert!((asset.aspect_ratio() - 1.5).abs() < 1e-6);
        assert_eq!(asset.name(), "wide");
    }

    #[test]
    fn zero_sized_images_are_rejected() {
        let err = TextureAsset::new("empty", RgbaImage::new(0, 4)).unwrap_err();
        assert!(matches!(err, AssetError::Empty { .. }));
    }

    #[test]
    fn loader_preserves_request_order() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            write_png(&dir, "a.png", 4, 2),
            write_png(&dir, "b.png", 2, 2),
            write_png(&dir, "c.png", 2, 4),
        ];
        let assets = FileAssetLoader::new().load(&sources).unwrap();
        let names: Vec<_> = assets.iter().map(TextureAsset::name).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
        assert!((assets[0].aspect_ratio() - 2.0).abs() < 1e-6);
        assert!((assets[2].aspect_ratio() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn one_failure_rejects_the_batch() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("broken.png");
        std::fs::write(&bogus, b"not an image").unwrap();
        let sources = vec![write_png(&dir, "ok.png", 2, 2), bogus.clone()];
        let err = FileAssetLoader::new().load(&sources).unwrap_err();
        match err {
            AssetError::Decode { path, .. } => assert_eq!(path, bogus),
            other => panic!("unexpected error: {other}"),
        }
    }
}
