//! Conversion between decoded images and flat float arrays.

use image::{DynamicImage, GenericImageView, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::Convert;
use crate::shape::TensorShape;

use super::{ChannelOrder, ColorMode, Image};

/// Largest raw pixel intensity.
const RAW_SCALE: f32 = 255.0;

/// Bridge between the image-domain and tensor-domain stages of a pipeline.
///
/// Flattens an image into a row-major `(height, width, channels)` float array
/// with values in the raw `[0, 255]` range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToFloatArray {
    /// Color mode to convert the image to first. `None` keeps the image's own mode.
    pub color_mode: Option<ColorMode>,
}

impl ToFloatArray {
    pub const NAME: &'static str = "to_float_array";

    #[must_use]
    pub fn new(color_mode: Option<ColorMode>) -> Self {
        Self { color_mode }
    }

    /// Flatten `image`, converting its color mode first if requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] if the image has an alpha channel
    /// (and no color mode was requested) or an encoding without float support.
    pub fn apply(&self, image: &Image) -> Result<(Vec<f32>, TensorShape)> {
        let converted;
        let image = match self.color_mode {
            Some(mode) if image.has_alpha() || image.semantic_mode() != mode => {
                converted = Convert::new(mode).apply(image)?;
                &converted
            }
            _ => image,
        };
        let data = to_raw_float_array(image)?;
        Ok((data, image.shape()))
    }

    /// # Errors
    ///
    /// Returns an error if `input` is not a rank 3 image shape.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        input.image_dims(Self::NAME)?;
        Ok(match self.color_mode {
            Some(mode) => input.with_channels(Some(mode.channels())),
            None => input.clone(),
        })
    }
}

/// Flatten an image into a row-major `(height, width, channels)` array of raw
/// `[0, 255]` values, keeping the image's channel order.
///
/// # Errors
///
/// Returns [`Error::UnsupportedOperation`] for images with an alpha channel or
/// an unsupported pixel encoding.
pub fn to_raw_float_array(image: &Image) -> Result<Vec<f32>> {
    if image.has_alpha() {
        return Err(Error::unsupported(
            ToFloatArray::NAME,
            "images with alpha channels are not supported",
        ));
    }

    match image.raster() {
        DynamicImage::ImageLuma8(buffer) => Ok(bytes_to_floats(buffer.as_raw(), image)),
        DynamicImage::ImageRgb8(buffer) => Ok(bytes_to_floats(buffer.as_raw(), image)),
        raster @ (DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgb32F(_)) => Ok(per_pixel_floats(raster)),
        other => Err(Error::unsupported(
            ToFloatArray::NAME,
            format!("pixel encoding {:?} is not supported", other.color()),
        )),
    }
}

/// Same as [`to_raw_float_array`], scaled into the `[0, 1]` range.
///
/// # Errors
///
/// See [`to_raw_float_array`].
pub fn to_normalized_float_array(image: &Image) -> Result<Vec<f32>> {
    let mut data = to_raw_float_array(image)?;
    for value in &mut data {
        *value /= RAW_SCALE;
    }
    Ok(data)
}

/// The backing buffer may be longer than the pixels it holds; only the
/// `width * height * channels` prefix is image data.
fn bytes_to_floats(bytes: &[u8], image: &Image) -> Vec<f32> {
    let len = image.width() as usize * image.height() as usize * image.channels();
    bytes[..len.min(bytes.len())]
        .iter()
        .map(|&b| f32::from(b))
        .collect()
}

/// Slow path for wide encodings: the raster is sampled pixel by pixel at 8-bit
/// precision, keeping the stored channel order.
fn per_pixel_floats(raster: &DynamicImage) -> Vec<f32> {
    let channels = if raster.color().has_color() { 3 } else { 1 };
    let (width, height) = raster.dimensions();
    let mut data = Vec::with_capacity(width as usize * height as usize * channels);

    for y in 0..height {
        for x in 0..width {
            let pixel = raster.get_pixel(x, y);
            data.extend(pixel.0[..channels].iter().map(|&v| f32::from(v)));
        }
    }

    data
}

/// Swap the first and third channel of every three-channel pixel in place.
pub fn swap_red_blue<T>(data: &mut [T]) {
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}

/// Rebuild an image from a flat row-major `(height, width, channels)` array.
///
/// If `normalized` is set the values are taken to be in `[0, 1]` and scaled
/// back to `[0, 255]`. Values are clamped to the valid pixel range.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the array length does not match
/// `width * height * color_mode.channels()`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn float_array_to_image(
    data: &[f32],
    width: u32,
    height: u32,
    color_mode: ColorMode,
    normalized: bool,
) -> Result<Image> {
    let expected = width as usize * height as usize * color_mode.channels();
    if data.len() != expected {
        return Err(Error::invalid_argument(
            "float_array_to_image",
            format!(
                "requested image shape {width}x{height}x{} does not match array size {}",
                color_mode.channels(),
                data.len()
            ),
        ));
    }

    let scale = if normalized { RAW_SCALE } else { 1.0 };
    // Safe: clamped to [0, 255] before casting
    let bytes: Vec<u8> = data
        .iter()
        .map(|&v| (v * scale).round().clamp(0.0, RAW_SCALE) as u8)
        .collect();

    let too_small = || Error::invalid_argument("float_array_to_image", "buffer too small");
    let image = match color_mode {
        ColorMode::Grayscale => {
            let buffer = GrayImage::from_raw(width, height, bytes).ok_or_else(too_small)?;
            Image::from_gray8(buffer)
        }
        ColorMode::Rgb | ColorMode::Bgr => {
            let buffer = RgbImage::from_raw(width, height, bytes).ok_or_else(too_small)?;
            let order = if color_mode == ColorMode::Bgr {
                ChannelOrder::Bgr
            } else {
                ChannelOrder::Rgb
            };
            Image::from_parts(DynamicImage::ImageRgb8(buffer), order)
        }
    };

    Ok(image)
}
