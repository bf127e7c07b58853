//! Color mode conversion.
//!
//! All conversions go through a single table keyed by (source, target) mode.

use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::{swap_red_blue, ChannelOrder, ColorMode, Image};
use crate::shape::TensorShape;

/// Luminance weights for red, green and blue.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Weighted luminance of an RGB triple, rounded to the nearest integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let luma = LUMA_WEIGHTS[0].mul_add(
        f32::from(r),
        LUMA_WEIGHTS[1].mul_add(f32::from(g), LUMA_WEIGHTS[2] * f32::from(b)),
    );
    // Safe: clamped to [0, 255] before casting
    luma.round().clamp(0.0, 255.0) as u8
}

/// What has to happen to the pixels to go from one mode to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Identity,
    SwapRedBlue,
    /// Weighted sum, with the index of the red channel in the source pixel.
    Luminance { red: usize },
    /// Copy the single luminance channel into all three.
    Replicate,
}

fn conversion(source: ColorMode, target: ColorMode) -> Conversion {
    match (source, target) {
        (ColorMode::Rgb, ColorMode::Rgb)
        | (ColorMode::Bgr, ColorMode::Bgr)
        | (ColorMode::Grayscale, ColorMode::Grayscale) => Conversion::Identity,
        (ColorMode::Rgb, ColorMode::Bgr) | (ColorMode::Bgr, ColorMode::Rgb) => {
            Conversion::SwapRedBlue
        }
        (ColorMode::Rgb, ColorMode::Grayscale) => Conversion::Luminance { red: 0 },
        (ColorMode::Bgr, ColorMode::Grayscale) => Conversion::Luminance { red: 2 },
        (ColorMode::Grayscale, ColorMode::Rgb | ColorMode::Bgr) => Conversion::Replicate,
    }
}

/// Converts an image to the given color mode.
///
/// A no-op when the image is already in that mode. Any alpha channel is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Convert {
    pub color_mode: ColorMode,
}

impl Default for Convert {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Rgb,
        }
    }
}

impl Convert {
    pub const NAME: &'static str = "convert";

    #[must_use]
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    /// # Errors
    ///
    /// Infallible; returns `Result` like every other operator.
    pub fn apply(&self, image: &Image) -> Result<Image> {
        let source = image.semantic_mode();
        let target = self.color_mode;
        let step = conversion(source, target);

        if step == Conversion::Identity && !image.has_alpha() {
            return Ok(image.clone());
        }

        let order = match target {
            ColorMode::Bgr => ChannelOrder::Bgr,
            ColorMode::Rgb | ColorMode::Grayscale => ChannelOrder::Rgb,
        };

        let raster = match step {
            Conversion::Identity if target == ColorMode::Grayscale => {
                DynamicImage::ImageLuma8(image.raster().to_luma8())
            }
            Conversion::Identity | Conversion::Replicate => {
                DynamicImage::ImageRgb8(image.raster().to_rgb8())
            }
            Conversion::SwapRedBlue => {
                let mut rgb = image.raster().to_rgb8();
                swap_red_blue::<u8>(&mut rgb);
                DynamicImage::ImageRgb8(rgb)
            }
            Conversion::Luminance { red } => {
                let rgb = image.raster().to_rgb8();
                let blue = 2 - red;
                let gray = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                    let p = rgb.get_pixel(x, y).0;
                    Luma([luminance(p[red], p[1], p[blue])])
                });
                DynamicImage::ImageLuma8(gray)
            }
        };

        tracing::trace!("Converted {source:?} -> {target:?} via {step:?}");
        Ok(Image::from_parts(raster, order))
    }

    /// Only the channel count changes.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a rank 3 image shape.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        input.image_dims(Self::NAME)?;
        Ok(input.with_channels(Some(self.color_mode.channels())))
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, LumaA, Rgb, RgbImage};

    use super::*;

    fn sample_bgr() -> Image {
        let mut buffer = RgbImage::new(2, 2);
        // stored blue-first
        buffer.put_pixel(0, 0, Rgb([200, 150, 50]));
        buffer.put_pixel(0, 1, Rgb([70, 190, 10]));
        buffer.put_pixel(1, 0, Rgb([40, 40, 210]));
        buffer.put_pixel(1, 1, Rgb([60, 160, 210]));
        Image::from_bgr8(buffer)
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance(50, 150, 200), 126);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);
    }

    #[test]
    fn test_same_mode_is_noop() {
        let image = sample_bgr();
        assert_eq!(Convert::new(ColorMode::Bgr).apply(&image).unwrap(), image);
    }

    #[test]
    fn test_swap_is_self_inverse() {
        let image = sample_bgr();
        let rgb = Convert::new(ColorMode::Rgb).apply(&image).unwrap();
        assert_eq!(rgb.color_mode().unwrap(), ColorMode::Rgb);
        assert_eq!(
            rgb.raster().as_rgb8().unwrap().get_pixel(0, 0),
            &Rgb([50, 150, 200])
        );

        let back = Convert::new(ColorMode::Bgr).apply(&rgb).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_grayscale_from_bgr() {
        let gray = Convert::new(ColorMode::Grayscale)
            .apply(&sample_bgr())
            .unwrap();
        assert_eq!(gray.color_mode().unwrap(), ColorMode::Grayscale);
        let luma = gray.raster().as_luma8().unwrap();
        assert_eq!(luma.get_pixel(0, 0), &Luma([luminance(50, 150, 200)]));
        assert_eq!(luma.get_pixel(0, 1), &Luma([luminance(10, 190, 70)]));
        assert_eq!(luma.get_pixel(1, 0), &Luma([luminance(210, 40, 40)]));
        assert_eq!(luma.get_pixel(1, 1), &Luma([luminance(210, 160, 60)]));
    }

    #[test]
    fn test_gray_to_color_replicates() {
        let gray = Image::from_gray8(GrayImage::from_pixel(1, 1, Luma([77])));
        let bgr = Convert::new(ColorMode::Bgr).apply(&gray).unwrap();
        assert_eq!(bgr.color_mode().unwrap(), ColorMode::Bgr);
        assert_eq!(bgr.raster().as_rgb8().unwrap().get_pixel(0, 0), &Rgb([77, 77, 77]));
    }

    #[test]
    fn test_alpha_is_dropped() {
        let gray_alpha: ImageBuffer<LumaA<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(1, 1, LumaA([9, 100]));
        let image = Image::new(DynamicImage::ImageLumaA8(gray_alpha));
        let out = Convert::new(ColorMode::Grayscale).apply(&image).unwrap();
        assert!(!out.has_alpha());
        assert_eq!(out.raster().as_luma8().unwrap().get_pixel(0, 0), &Luma([9]));
    }

    #[test]
    fn test_output_shape_changes_channels_only() {
        let shape = TensorShape::image(None, Some(20), Some(3));
        assert_eq!(
            Convert::new(ColorMode::Grayscale).output_shape(&shape).unwrap(),
            TensorShape::image(None, Some(20), Some(1))
        );
    }
}
