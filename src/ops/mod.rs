//! Image-domain operators.
//!
//! Every operator is a plain configuration value with two pure functions:
//! `apply`, which produces a new [`Image`], and `output_shape`, which predicts
//! the `(width, height, channels)` shape of that image. For any input of shape
//! `S`, `apply` yields an image whose shape equals `output_shape(S)`.

mod color;
mod crop;
mod pad;
mod resize;
mod rotate;

pub use color::Convert;
pub use crop::{CenterCrop, Crop};
pub use pad::{Padding, PaddingMode};
pub use resize::{RenderingSpeed, Resize};
pub use rotate::Rotate;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::Image;
use crate::shape::TensorShape;

/// Resampling kernel used by [`Resize`] and [`Rotate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationType {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
}

/// One stage of the image-domain part of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageOperation {
    Resize(Resize),
    Crop(Crop),
    CenterCrop(CenterCrop),
    Pad(Padding),
    Rotate(Rotate),
    Convert(Convert),
}

impl ImageOperation {
    /// Name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Resize(_) => Resize::NAME,
            Self::Crop(_) => Crop::NAME,
            Self::CenterCrop(_) => CenterCrop::NAME,
            Self::Pad(_) => Padding::NAME,
            Self::Rotate(_) => Rotate::NAME,
            Self::Convert(_) => Convert::NAME,
        }
    }

    /// Check the configuration without any input.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] for unusable configurations.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Resize(op) => op.validate(),
            Self::Rotate(op) => op.validate(),
            Self::Crop(_) | Self::CenterCrop(_) | Self::Pad(_) | Self::Convert(_) => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Propagates the wrapped operator's error.
    pub fn apply(&self, image: &Image) -> Result<Image> {
        match self {
            Self::Resize(op) => op.apply(image),
            Self::Crop(op) => op.apply(image),
            Self::CenterCrop(op) => op.apply(image),
            Self::Pad(op) => op.apply(image),
            Self::Rotate(op) => op.apply(image),
            Self::Convert(op) => op.apply(image),
        }
    }

    /// # Errors
    ///
    /// Propagates the wrapped operator's error.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        match self {
            Self::Resize(op) => op.output_shape(input),
            Self::Crop(op) => op.output_shape(input),
            Self::CenterCrop(op) => op.output_shape(input),
            Self::Pad(op) => op.output_shape(input),
            Self::Rotate(op) => op.output_shape(input),
            Self::Convert(op) => op.output_shape(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_json() {
        let op: ImageOperation =
            serde_json::from_str(r#"{"op": "center_crop", "size": 224}"#).unwrap();
        assert_eq!(op, ImageOperation::CenterCrop(CenterCrop::new(224)));
        assert_eq!(op.name(), "center_crop");
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let op: ImageOperation =
            serde_json::from_str(r#"{"op": "resize", "output_width": 32, "output_height": 16}"#)
                .unwrap();
        let ImageOperation::Resize(resize) = op else {
            panic!("expected resize");
        };
        assert_eq!(resize.interpolation, InterpolationType::Bilinear);
        assert!(resize.antialiasing);
    }

    #[test]
    fn test_dispatch_validates() {
        let op = ImageOperation::Resize(Resize::new(0, 10));
        assert!(op.validate().is_err());
        assert!(ImageOperation::Crop(Crop::default()).validate().is_ok());
    }
}
