//! Image loading utilities.

use std::io::{BufRead, Seek};
use std::path::Path;

use image::ImageReader;

use crate::error::{Error, Result};

use super::Image;

/// Load an image from disk.
///
/// The decoded raster keeps its native pixel encoding; color rasters are
/// interpreted as RGB.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();

    let raster = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        raster.width(),
        raster.height(),
        raster.color()
    );

    Ok(Image::new(raster))
}

/// Decode an image held in memory, guessing the format from its contents.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image.
pub fn decode_image(bytes: &[u8]) -> Result<Image> {
    let raster = image::load_from_memory(bytes).map_err(|source| Error::ImageDecode { source })?;
    Ok(Image::new(raster))
}

/// Decode an image from a stream, guessing the format from its contents.
///
/// # Errors
///
/// Returns an error if the stream cannot be read or decoded.
pub fn read_image<R: BufRead + Seek>(reader: R) -> Result<Image> {
    let raster = ImageReader::new(reader)
        .with_guessed_format()?
        .decode()
        .map_err(|source| Error::ImageDecode { source })?;
    Ok(Image::new(raster))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::image::ColorMode;

    fn png_bytes() -> Vec<u8> {
        let buffer = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_image() {
        let image = decode_image(&png_bytes()).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.color_mode().unwrap(), ColorMode::Rgb);
    }

    #[test]
    fn test_read_image_from_stream() {
        let image = read_image(Cursor::new(png_bytes())).unwrap();
        assert_eq!(image.channels(), 3);
    }

    #[test]
    fn test_load_image_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.raster().as_rgb8().unwrap().get_pixel(2, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_image("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(Error::ImageDecode { .. })
        ));
    }
}
