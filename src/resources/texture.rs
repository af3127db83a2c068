use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use image::{ImageFormat, RgbaImage, imageops::FilterType};

use crate::{
    gpu::{RenderBackend, TextureId},
    resources::load_binary,
};

/// What the material parser needs to turn a `map_Kd` path into a texture.
///
/// `None` means the image could not be read or decoded; the caller decides
/// whether that is fatal.
pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> Option<TextureId>;
}

impl<B: RenderBackend + ?Sized> TextureLoader for B {
    fn load_texture(&mut self, path: &Path) -> Option<TextureId> {
        load_texture(self, path)
    }
}

/// Decodes `path` and uploads it as a mipmapped 2-D texture.
///
/// Failures are logged and reported as `None`. The image is decoded fully
/// before the backend is touched, so a failure never leaves a half-created
/// texture behind.
pub fn load_texture<B: RenderBackend + ?Sized>(gpu: &mut B, path: &Path) -> Option<TextureId> {
    let label = path.to_string_lossy();
    let result = decode_image(path).and_then(|image| gpu.create_texture(&label, &image));
    match result {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Failed to load texture {}: {e:#}", path.display());
            None
        }
    }
}

/// Reads and decodes an image into RGBA8. Rows stay in file order.
pub fn decode_image(path: &Path) -> anyhow::Result<RgbaImage> {
    let bytes = load_binary(path).with_context(|| format!("reading {}", path.display()))?;
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        // Formats without a magic number (tga) can only be told apart by extension.
        Err(guess_err) => match ImageFormat::from_path(path) {
            Ok(format) => image::load_from_memory_with_format(&bytes, format)
                .with_context(|| format!("decoding {}", path.display()))?,
            Err(_) => {
                return Err(guess_err).with_context(|| format!("decoding {}", path.display()));
            }
        },
    };
    Ok(image.to_rgba8())
}

/// Full mip chain down to 1x1, level 0 first.
pub fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base.clone()];
    let (mut width, mut height) = base.dimensions();
    while width > 1 || height > 1 {
        width = (width / 2).max(1);
        height = (height / 2).max(1);
        let previous = levels.last().unwrap_or(base);
        let next = image::imageops::resize(previous, width, height, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Loads six face images (+X, -X, +Y, -Y, +Z, -Z) into one cube texture.
pub fn load_cubemap<B: RenderBackend + ?Sized>(
    gpu: &mut B,
    faces: &[PathBuf; 6],
) -> anyhow::Result<TextureId> {
    let mut images = Vec::with_capacity(6);
    for path in faces {
        let image = decode_image(path).context("loading skybox face")?;
        log::info!(
            "Loaded skybox face {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        images.push(image);
    }

    let expected = images[0].dimensions();
    if expected.0 != expected.1 {
        bail!(
            "skybox face {} is {}x{}, cube faces must be square",
            faces[0].display(),
            expected.0,
            expected.1
        );
    }
    for (image, path) in images.iter().zip(faces) {
        if image.dimensions() != expected {
            bail!(
                "skybox face {} is {}x{}, expected {}x{}",
                path.display(),
                image.width(),
                image.height(),
                expected.0,
                expected.1
            );
        }
    }

    let images: [RgbaImage; 6] = images
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected exactly six skybox faces"))?;
    gpu.create_cubemap("skybox", &images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_halves_to_one_pixel() {
        let base = RgbaImage::new(8, 2);
        let sizes: Vec<_> = mip_chain(&base).iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert_eq!(mip_level_count(8, 2), 4);
    }

    #[test]
    fn single_pixel_has_one_level() {
        assert_eq!(mip_chain(&RgbaImage::new(1, 1)).len(), 1);
        assert_eq!(mip_level_count(1, 1), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_image(Path::new("does/not/exist.png")).is_err());
    }
}
