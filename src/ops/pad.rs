//! Padding operator.

use image::{
    imageops, DynamicImage, GrayAlphaImage, GrayImage, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::{ColorMode, Image};
use crate::shape::TensorShape;

use super::color::luminance;

/// How the new border area is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingMode {
    /// Solid fill with an `[r, g, b]` color.
    Fill([u8; 3]),
}

impl Default for PaddingMode {
    fn default() -> Self {
        Self::Fill([0, 0, 0])
    }
}

/// Grows the canvas by fixed margins and fills the border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
    pub mode: PaddingMode,
}

impl Padding {
    pub const NAME: &'static str = "pad";

    #[must_use]
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            mode: PaddingMode::default(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PaddingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Fill color in the image's own channel layout.
    fn fill_for(&self, image: &Image) -> [u8; 3] {
        let PaddingMode::Fill([r, g, b]) = self.mode;
        match image.semantic_mode() {
            ColorMode::Rgb => [r, g, b],
            ColorMode::Bgr => [b, g, r],
            ColorMode::Grayscale => {
                let v = luminance(r, g, b);
                [v, v, v]
            }
        }
    }

    /// `size` grown by both margins, limited to what a raster can hold.
    fn grown(size: usize, first: u32, second: u32, axis: &str) -> Result<u32> {
        u32::try_from(size)
            .ok()
            .and_then(|size| size.checked_add(first))
            .and_then(|size| size.checked_add(second))
            .ok_or_else(|| {
                Error::invalid_argument(
                    Self::NAME,
                    format!("padding {axis} {size} by {first} + {second} pixels overflows"),
                )
            })
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the padded size does not fit in `u32`.
    pub fn apply(&self, image: &Image) -> Result<Image> {
        let width = Self::grown(image.width() as usize, self.left, self.right, "width")?;
        let height = Self::grown(image.height() as usize, self.top, self.bottom, "height")?;
        let [a, b, c] = self.fill_for(image);
        let (x, y) = (i64::from(self.left), i64::from(self.top));

        let padded = match image.eight_bit_raster() {
            DynamicImage::ImageLuma8(source) => {
                let mut canvas = GrayImage::from_pixel(width, height, Luma([a]));
                imageops::replace(&mut canvas, &source, x, y);
                DynamicImage::ImageLuma8(canvas)
            }
            DynamicImage::ImageLumaA8(source) => {
                let mut canvas = GrayAlphaImage::from_pixel(width, height, LumaA([a, u8::MAX]));
                imageops::replace(&mut canvas, &source, x, y);
                DynamicImage::ImageLumaA8(canvas)
            }
            DynamicImage::ImageRgba8(source) => {
                let mut canvas = RgbaImage::from_pixel(width, height, Rgba([a, b, c, u8::MAX]));
                imageops::replace(&mut canvas, &source, x, y);
                DynamicImage::ImageRgba8(canvas)
            }
            other => {
                let source = other.to_rgb8();
                let mut canvas = RgbImage::from_pixel(width, height, Rgb([a, b, c]));
                imageops::replace(&mut canvas, &source, x, y);
                DynamicImage::ImageRgb8(canvas)
            }
        };

        Ok(image.with_raster(padded))
    }

    /// Known dimensions grow by the margins; unknown ones stay unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a rank 3 image shape or a padded
    /// dimension does not fit in `u32`.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        let (width, height, channels) = input.image_dims(Self::NAME)?;
        let width = width
            .map(|w| Self::grown(w, self.left, self.right, "width"))
            .transpose()?;
        let height = height
            .map(|h| Self::grown(h, self.top, self.bottom, "height"))
            .transpose()?;
        Ok(TensorShape::image(
            width.map(|w| w as usize),
            height.map(|h| h as usize),
            channels,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_shape() {
        let padding = Padding::new(5, 7, 11, 13);
        assert_eq!(
            padding.output_shape(&TensorShape::new(&[300, 200, 1])).unwrap(),
            TensorShape::new(&[324, 212, 1])
        );
        assert_eq!(
            padding
                .output_shape(&TensorShape::image(None, Some(200), None))
                .unwrap(),
            TensorShape::image(None, Some(212), None)
        );
    }

    #[test]
    fn test_overflowing_margins_rejected() {
        let image = Image::from_gray8(GrayImage::new(1, 1));
        let padding = Padding::new(0, 0, u32::MAX, 1);

        assert!(matches!(
            padding.apply(&image),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            padding.output_shape(&image.shape()),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(Padding::new(u32::MAX, 0, 0, 0)
            .output_shape(&TensorShape::image(None, Some(1), Some(1)))
            .is_err());
        // the unknown axis has nothing to overflow
        assert!(Padding::new(0, 0, u32::MAX, 0)
            .output_shape(&TensorShape::image(None, Some(1), Some(1)))
            .is_ok());
    }

    #[test]
    fn test_fill_and_offset() {
        let mut buffer = RgbImage::new(2, 2);
        buffer.put_pixel(0, 0, Rgb([255, 0, 0]));
        buffer.put_pixel(1, 1, Rgb([0, 0, 255]));
        let image = Image::from_bgr8(buffer);

        let gray = [128, 128, 128];
        let out = Padding::new(1, 2, 3, 4)
            .with_mode(PaddingMode::Fill(gray))
            .apply(&image)
            .unwrap();
        assert_eq!(out.shape(), TensorShape::new(&[9, 5, 3]));

        let rgb = out.raster().as_rgb8().unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb(gray));
        assert_eq!(rgb.get_pixel(8, 4), &Rgb(gray));
        assert_eq!(rgb.get_pixel(3, 1), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(4, 1), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(4, 2), &Rgb([0, 0, 255]));
        assert_eq!(rgb.get_pixel(3, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_fill_follows_channel_order() {
        let fill = PaddingMode::Fill([10, 20, 30]);
        let bgr = Image::from_bgr8(RgbImage::new(1, 1));
        let out = Padding::new(0, 0, 0, 1).with_mode(fill).apply(&bgr).unwrap();
        assert_eq!(out.raster().as_rgb8().unwrap().get_pixel(1, 0), &Rgb([30, 20, 10]));

        let gray = Image::from_gray8(GrayImage::new(1, 1));
        let out = Padding::new(0, 0, 0, 1).with_mode(fill).apply(&gray).unwrap();
        assert_eq!(out.channels(), 1);
        assert_eq!(out.raster().as_luma8().unwrap().get_pixel(1, 0), &Luma([18]));
    }
}
