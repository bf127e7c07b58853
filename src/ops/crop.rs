//! Crop and center-crop operators.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::shape::TensorShape;

use super::pad::{Padding, PaddingMode};

/// Removes a fixed number of pixels from each edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crop {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Crop {
    pub const NAME: &'static str = "crop";

    #[must_use]
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    fn remaining(&self, size: usize, first: u32, second: u32, axis: &str) -> Result<usize> {
        let removed = first as usize + second as usize;
        if removed >= size {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!("cropping {removed} pixels from {axis} {size} leaves nothing"),
            ));
        }
        Ok(size - removed)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the margins consume the whole image.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&self, image: &Image) -> Result<Image> {
        let width = self.remaining(image.width() as usize, self.left, self.right, "width")?;
        let height = self.remaining(image.height() as usize, self.top, self.bottom, "height")?;

        // Safe: both are smaller than the source dimensions
        let cropped = image
            .raster()
            .crop_imm(self.left, self.top, width as u32, height as u32);
        Ok(image.with_raster(cropped))
    }

    /// Known dimensions shrink by the margins; unknown ones stay unknown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a known dimension would drop to zero.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        let (width, height, channels) = input.image_dims(Self::NAME)?;
        let width = width
            .map(|w| self.remaining(w, self.left, self.right, "width"))
            .transpose()?;
        let height = height
            .map(|h| self.remaining(h, self.top, self.bottom, "height"))
            .transpose()?;
        Ok(TensorShape::image(width, height, channels))
    }
}

/// Takes the centred `size` x `size` square of an image, padding short sides
/// with black first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterCrop {
    /// Side of the square; `0` disables the operator.
    pub size: u32,
}

impl CenterCrop {
    pub const NAME: &'static str = "center_crop";

    #[must_use]
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// # Errors
    ///
    /// Infallible; returns `Result` like every other operator.
    pub fn apply(&self, image: &Image) -> Result<Image> {
        let size = self.size;
        if size == 0 || (image.width() == size && image.height() == size) {
            return Ok(image.clone());
        }

        let pad_width = size.saturating_sub(image.width());
        let pad_height = size.saturating_sub(image.height());
        let padded;
        let image = if pad_width > 0 || pad_height > 0 {
            let padding = Padding {
                top: pad_height / 2,
                bottom: pad_height - pad_height / 2,
                left: pad_width / 2,
                right: pad_width - pad_width / 2,
                mode: PaddingMode::default(),
            };
            padded = padding.apply(image)?;
            &padded
        } else {
            image
        };

        let x = (image.width() - size) / 2;
        let y = (image.height() - size) / 2;
        Ok(image.with_raster(image.raster().crop_imm(x, y, size, size)))
    }

    /// `(size, size, channels)`, or the input unchanged when `size` is 0.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a rank 3 image shape.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        let (_, _, channels) = input.image_dims(Self::NAME)?;
        if self.size == 0 {
            return Ok(input.clone());
        }
        let size = Some(self.size as usize);
        Ok(TensorShape::image(size, size, channels))
    }
}
