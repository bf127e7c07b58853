//! Image loading, conversion, and saving utilities.

mod convert;
mod load;
mod save;

pub use convert::{
    float_array_to_image, swap_red_blue, to_normalized_float_array, to_raw_float_array,
    ToFloatArray,
};
pub use load::{decode_image, load_image, read_image};
pub use save::save_image;

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shape::TensorShape;

/// Number of channels in RGB/BGR images.
pub const RGB_CHANNELS: usize = 3;

/// Semantic channel layout of an image or float array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Three interleaved channels, red first.
    Rgb,
    /// Three interleaved channels, blue first.
    Bgr,
    /// A single luminance channel.
    Grayscale,
}

impl ColorMode {
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => RGB_CHANNELS,
            Self::Grayscale => 1,
        }
    }
}

/// How the three color channels of a raster are ordered in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChannelOrder {
    Rgb,
    Bgr,
}

/// A decoded image together with the semantic order of its color channels.
///
/// The raster bytes are stored in semantic order: a BGR image keeps blue in
/// the first channel of the underlying buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    raster: DynamicImage,
    order: ChannelOrder,
}

impl Image {
    /// Wrap a decoded raster whose color channels are in RGB order.
    #[must_use]
    pub fn new(raster: DynamicImage) -> Self {
        Self {
            raster,
            order: ChannelOrder::Rgb,
        }
    }

    /// Wrap a raster whose color channels are stored in BGR order.
    #[must_use]
    pub fn from_bgr(raster: DynamicImage) -> Self {
        Self {
            raster,
            order: ChannelOrder::Bgr,
        }
    }

    #[must_use]
    pub fn from_rgb8(buffer: RgbImage) -> Self {
        Self::new(DynamicImage::ImageRgb8(buffer))
    }

    #[must_use]
    pub fn from_bgr8(buffer: RgbImage) -> Self {
        Self::from_bgr(DynamicImage::ImageRgb8(buffer))
    }

    #[must_use]
    pub fn from_gray8(buffer: GrayImage) -> Self {
        Self::new(DynamicImage::ImageLuma8(buffer))
    }

    /// A new raster carrying over this image's channel order.
    pub(crate) fn with_raster(&self, raster: DynamicImage) -> Self {
        Self {
            raster,
            order: self.order,
        }
    }

    pub(crate) fn from_parts(raster: DynamicImage, order: ChannelOrder) -> Self {
        Self { raster, order }
    }

    #[must_use]
    pub fn raster(&self) -> &DynamicImage {
        &self.raster
    }

    #[must_use]
    pub fn into_raster(self) -> DynamicImage {
        self.raster
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Number of channels in the raster, alpha included.
    #[must_use]
    pub fn channels(&self) -> usize {
        usize::from(self.raster.color().channel_count())
    }

    #[must_use]
    pub fn has_alpha(&self) -> bool {
        self.raster.color().has_alpha()
    }

    /// Whether the raster stores a single luminance channel (with or without alpha).
    #[must_use]
    pub fn is_grayscale(&self) -> bool {
        !self.raster.color().has_color()
    }

    /// The color mode of this image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for images with an alpha channel.
    pub fn color_mode(&self) -> Result<ColorMode> {
        if self.has_alpha() {
            return Err(Error::unsupported(
                "color_mode",
                "images with alpha channels have no color mode",
            ));
        }
        Ok(self.semantic_mode())
    }

    /// Color mode ignoring a possible alpha channel.
    pub(crate) fn semantic_mode(&self) -> ColorMode {
        if self.is_grayscale() {
            ColorMode::Grayscale
        } else {
            match self.order {
                ChannelOrder::Rgb => ColorMode::Rgb,
                ChannelOrder::Bgr => ColorMode::Bgr,
            }
        }
    }

    /// Shape in `(width, height, channels)` order.
    #[must_use]
    pub fn shape(&self) -> TensorShape {
        TensorShape::new(&[
            self.width() as usize,
            self.height() as usize,
            self.channels(),
        ])
    }

    /// The raster reduced to one of the 8-bit layouts the geometric operators work on.
    pub(crate) fn eight_bit_raster(&self) -> DynamicImage {
        match &self.raster {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => self.raster.clone(),
            other => {
                let color = other.color();
                match (color.has_color(), color.has_alpha()) {
                    (false, false) => DynamicImage::ImageLuma8(other.to_luma8()),
                    (false, true) => DynamicImage::ImageLumaA8(other.to_luma_alpha8()),
                    (true, false) => DynamicImage::ImageRgb8(other.to_rgb8()),
                    (true, true) => DynamicImage::ImageRgba8(other.to_rgba8()),
                }
            }
        }
    }
}

impl From<DynamicImage> for Image {
    fn from(raster: DynamicImage) -> Self {
        Self::new(raster)
    }
}
