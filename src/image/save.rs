//! Image saving utilities.

use std::path::Path;

use crate::error::{Error, Result};
use crate::ops::Convert;

use super::{ColorMode, Image};

/// Save an image file, inferring the format from the extension.
///
/// BGR images are converted to RGB before encoding, since image formats store
/// red first.
///
/// # Arguments
///
/// * `image` - Image to save
/// * `path` - Output file path
/// * `quality` - JPEG quality (1-100), ignored for other formats
///
/// # Errors
///
/// Returns an error if the image cannot be encoded or written.
pub fn save_image<P: AsRef<Path>>(image: &Image, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();

    let converted;
    let image = if image.semantic_mode() == ColorMode::Bgr {
        converted = Convert::new(ColorMode::Rgb).apply(image)?;
        &converted
    } else {
        image
    };
    let raster = image.raster();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let mut output = std::fs::File::create(path)?;
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
            raster
                .write_with_encoder(encoder)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        _ => {
            raster.save(path).map_err(|source| Error::ImageSave {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    tracing::debug!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::image::load_image;

    #[test]
    fn test_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let original = Image::from_rgb8(RgbImage::from_pixel(4, 3, Rgb([1, 2, 3])));
        save_image(&original, &path, 95).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_bgr_is_written_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgr.png");

        // blue, stored blue-first
        let bgr = Image::from_bgr8(RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])));
        save_image(&bgr, &path, 95).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(
            loaded.raster().as_rgb8().unwrap().get_pixel(0, 0),
            &Rgb([0, 0, 255])
        );
    }

    #[test]
    fn test_jpeg_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");

        let image = Image::from_rgb8(RgbImage::from_pixel(8, 8, Rgb([200, 100, 50])));
        save_image(&image, &path, 90).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (8, 8));
    }
}
