//! Rotation operator.

use image::{DynamicImage, Luma, LumaA, Rgb, Rgba};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::shape::TensorShape;

use super::InterpolationType;

/// Rotates an image clockwise about its center.
///
/// The canvas keeps its size: content rotated past the edges is clipped and
/// the exposed corners are black (transparent for images with alpha).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotate {
    pub degrees: f32,
    pub interpolation: InterpolationType,
}

impl Default for Rotate {
    fn default() -> Self {
        Self {
            degrees: 90.0,
            interpolation: InterpolationType::Bicubic,
        }
    }
}

impl Rotate {
    pub const NAME: &'static str = "rotate";

    #[must_use]
    pub fn new(degrees: f32) -> Self {
        Self {
            degrees,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationType) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the angle is not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.degrees.is_finite() {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!("angle {} must be finite", self.degrees),
            ));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the angle is not finite.
    pub fn apply(&self, image: &Image) -> Result<Image> {
        self.validate()?;
        if self.degrees % 360.0 == 0.0 {
            return Ok(image.clone());
        }

        let theta = self.degrees.to_radians();
        let interpolation = match self.interpolation {
            InterpolationType::Nearest => Interpolation::Nearest,
            InterpolationType::Bilinear => Interpolation::Bilinear,
            InterpolationType::Bicubic => Interpolation::Bicubic,
        };

        let rotated = match image.eight_bit_raster() {
            DynamicImage::ImageLuma8(buffer) => DynamicImage::ImageLuma8(rotate_about_center(
                &buffer,
                theta,
                interpolation,
                Luma([0]),
            )),
            DynamicImage::ImageLumaA8(buffer) => DynamicImage::ImageLumaA8(rotate_about_center(
                &buffer,
                theta,
                interpolation,
                LumaA([0, 0]),
            )),
            DynamicImage::ImageRgba8(buffer) => DynamicImage::ImageRgba8(rotate_about_center(
                &buffer,
                theta,
                interpolation,
                Rgba([0, 0, 0, 0]),
            )),
            other => DynamicImage::ImageRgb8(rotate_about_center(
                &other.to_rgb8(),
                theta,
                interpolation,
                Rgb([0, 0, 0]),
            )),
        };

        Ok(image.with_raster(rotated))
    }

    /// Rotation never changes the shape.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a rank 3 image shape.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        input.image_dims(Self::NAME)?;
        Ok(input.clone())
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, RgbImage};

    use super::*;

    #[test]
    fn test_shape_is_preserved() {
        let rotate = Rotate::new(30.0);
        let shape = TensorShape::new(&[200, 120, 3]);
        assert_eq!(rotate.output_shape(&shape).unwrap(), shape);

        let image = Image::from_rgb8(RgbImage::new(20, 12));
        assert_eq!(rotate.apply(&image).unwrap().shape(), shape_of(20, 12, 3));
    }

    fn shape_of(w: usize, h: usize, c: usize) -> TensorShape {
        TensorShape::new(&[w, h, c])
    }

    #[test]
    fn test_full_turn_is_identity() {
        let image = Image::from_rgb8(RgbImage::from_fn(3, 2, |x, y| {
            Rgb([x as u8, y as u8, 1])
        }));
        assert_eq!(Rotate::new(0.0).apply(&image).unwrap(), image);
        assert_eq!(Rotate::new(360.0).apply(&image).unwrap(), image);
    }

    #[test]
    fn test_center_survives_and_corner_is_filled() {
        let image = Image::from_gray8(GrayImage::from_pixel(9, 9, Luma([255])));
        let out = Rotate::new(45.0)
            .with_interpolation(InterpolationType::Nearest)
            .apply(&image)
            .unwrap();
        let luma = out.raster().as_luma8().unwrap();
        assert_eq!(luma.get_pixel(4, 4), &Luma([255]));
        assert_eq!(luma.get_pixel(0, 0), &Luma([0]));
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let image = Image::from_rgb8(RgbImage::new(2, 2));
        assert!(matches!(
            Rotate::new(f32::NAN).apply(&image),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
