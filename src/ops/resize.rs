//! Resize operator.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::shape::TensorShape;

use super::InterpolationType;

/// Speed/quality trade-off for resampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderingSpeed {
    /// Downscaling skips the interpolation kernel in favour of cheap sampling.
    Fast,
    #[default]
    Medium,
    /// Bicubic resampling is upgraded to Lanczos3.
    Slow,
}

/// Scales an image to exactly `output_width` x `output_height`.
///
/// This is the one operator that turns unknown width and height into known
/// values, so pipelines meant for arbitrary input usually contain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resize {
    pub output_width: u32,
    pub output_height: u32,
    pub interpolation: InterpolationType,
    pub rendering_speed: RenderingSpeed,
    /// With [`RenderingSpeed::Fast`], average source pixels when downscaling
    /// instead of point-sampling them.
    pub antialiasing: bool,
}

impl Default for Resize {
    fn default() -> Self {
        Self {
            output_width: 100,
            output_height: 100,
            interpolation: InterpolationType::Bilinear,
            rendering_speed: RenderingSpeed::Medium,
            antialiasing: true,
        }
    }
}

impl Resize {
    pub const NAME: &'static str = "resize";

    #[must_use]
    pub fn new(output_width: u32, output_height: u32) -> Self {
        Self {
            output_width,
            output_height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationType) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn with_rendering_speed(mut self, rendering_speed: RenderingSpeed) -> Self {
        self.rendering_speed = rendering_speed;
        self
    }

    #[must_use]
    pub fn with_antialiasing(mut self, antialiasing: bool) -> Self {
        self.antialiasing = antialiasing;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either target dimension is zero.
    pub fn validate(&self) -> Result<()> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!(
                    "output size {}x{} must be positive",
                    self.output_width, self.output_height
                ),
            ));
        }
        Ok(())
    }

    fn filter(&self) -> FilterType {
        match (self.interpolation, self.rendering_speed) {
            (InterpolationType::Nearest, _) => FilterType::Nearest,
            (InterpolationType::Bilinear, _) => FilterType::Triangle,
            (InterpolationType::Bicubic, RenderingSpeed::Slow) => FilterType::Lanczos3,
            (InterpolationType::Bicubic, _) => FilterType::CatmullRom,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the configuration is invalid.
    pub fn apply(&self, image: &Image) -> Result<Image> {
        self.validate()?;

        let (width, height) = (self.output_width, self.output_height);
        let raster = image.raster();

        let downscaling = width <= image.width() && height <= image.height();
        let resized = if self.rendering_speed == RenderingSpeed::Fast
            && self.interpolation != InterpolationType::Nearest
            && downscaling
        {
            if self.antialiasing {
                raster.thumbnail_exact(width, height)
            } else {
                raster.resize_exact(width, height, FilterType::Nearest)
            }
        } else {
            raster.resize_exact(width, height, self.filter())
        };

        Ok(image.with_raster(resized))
    }

    /// Always `(output_width, output_height, input channels)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a rank 3 image shape.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        let (_, _, channels) = input.image_dims(Self::NAME)?;
        Ok(TensorShape::image(
            Some(self.output_width as usize),
            Some(self.output_height as usize),
            channels,
        ))
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn checker(width: u32, height: u32) -> Image {
        Image::from_rgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_output_shape_fixes_size() {
        let resize = Resize::new(100, 50);
        assert_eq!(
            resize.output_shape(&TensorShape::unknown(3)).unwrap(),
            TensorShape::image(Some(100), Some(50), None)
        );
        assert_eq!(
            resize.output_shape(&TensorShape::new(&[20, 20, 3])).unwrap(),
            TensorShape::new(&[100, 50, 3])
        );
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = Resize::new(0, 10).apply(&checker(4, 4)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_apply_matches_output_shape_for_every_mode() {
        let image = checker(9, 7);
        for interpolation in [
            InterpolationType::Nearest,
            InterpolationType::Bilinear,
            InterpolationType::Bicubic,
        ] {
            for speed in [RenderingSpeed::Fast, RenderingSpeed::Medium, RenderingSpeed::Slow] {
                for antialiasing in [true, false] {
                    for (w, h) in [(3, 2), (20, 11)] {
                        let resize = Resize::new(w, h)
                            .with_interpolation(interpolation)
                            .with_rendering_speed(speed)
                            .with_antialiasing(antialiasing);
                        let out = resize.apply(&image).unwrap();
                        assert_eq!(out.shape(), resize.output_shape(&image.shape()).unwrap());
                    }
                }
            }
        }
    }

    #[test]
    fn test_nearest_upscale_replicates_blocks() {
        let mut buffer = RgbImage::new(2, 2);
        buffer.put_pixel(0, 0, Rgb([255, 0, 0]));
        buffer.put_pixel(1, 1, Rgb([0, 0, 255]));
        let image = Image::from_bgr8(buffer);

        let out = Resize::new(4, 4)
            .with_interpolation(InterpolationType::Nearest)
            .apply(&image)
            .unwrap();
        let rgb = out.raster().as_rgb8().unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let expected = match (x < 2, y < 2) {
                    (true, true) => Rgb([255, 0, 0]),
                    (false, false) => Rgb([0, 0, 255]),
                    _ => Rgb([0, 0, 0]),
                };
                assert_eq!(rgb.get_pixel(x, y), &expected, "pixel ({x}, {y})");
            }
        }
        assert_eq!(out.color_mode().unwrap(), image.color_mode().unwrap());
    }
}
