//! Two-phase pipeline builder.
//!
//! [`PipelineBuilder`] only accepts image-domain stages. Calling
//! [`PipelineBuilder::to_float_array`] moves to [`TensorPipelineBuilder`],
//! which only accepts tensor-domain stages, so the ordering cannot be broken.

use crate::error::Result;
use crate::image::{ColorMode, ToFloatArray};
use crate::ops::{CenterCrop, Convert, Crop, ImageOperation, Padding, Resize, Rotate};
use crate::tensor::{InputType, Normalizing, Rescale, TensorOperation};

use super::Pipeline;

/// Collects image-domain stages.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct PipelineBuilder {
    image_stages: Vec<ImageOperation>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append any image-domain stage.
    pub fn image_op(mut self, op: ImageOperation) -> Self {
        self.image_stages.push(op);
        self
    }

    pub fn resize(self, resize: Resize) -> Self {
        self.image_op(ImageOperation::Resize(resize))
    }

    pub fn crop(self, crop: Crop) -> Self {
        self.image_op(ImageOperation::Crop(crop))
    }

    pub fn center_crop(self, size: u32) -> Self {
        self.image_op(ImageOperation::CenterCrop(CenterCrop::new(size)))
    }

    pub fn pad(self, padding: Padding) -> Self {
        self.image_op(ImageOperation::Pad(padding))
    }

    pub fn rotate(self, rotate: Rotate) -> Self {
        self.image_op(ImageOperation::Rotate(rotate))
    }

    pub fn convert(self, color_mode: ColorMode) -> Self {
        self.image_op(ImageOperation::Convert(Convert::new(color_mode)))
    }

    /// Shorthand for `convert(ColorMode::Grayscale)`.
    pub fn grayscale(self) -> Self {
        self.convert(ColorMode::Grayscale)
    }

    /// Close the image phase. `color_mode` is applied just before flattening;
    /// `None` keeps whatever mode the image has by then.
    pub fn to_float_array(self, color_mode: Option<ColorMode>) -> TensorPipelineBuilder {
        TensorPipelineBuilder {
            image_stages: self.image_stages,
            conversion: ToFloatArray::new(color_mode),
            tensor_stages: Vec::new(),
        }
    }

    /// Build a pipeline that ends with a plain [`ToFloatArray`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if any stage is misconfigured.
    pub fn build(self) -> Result<Pipeline> {
        self.to_float_array(None).build()
    }
}

/// Collects tensor-domain stages after the image has been flattened.
#[derive(Debug, Clone)]
#[must_use]
pub struct TensorPipelineBuilder {
    image_stages: Vec<ImageOperation>,
    conversion: ToFloatArray,
    tensor_stages: Vec<TensorOperation>,
}

impl TensorPipelineBuilder {
    /// Append any tensor-domain stage.
    pub fn tensor_op(mut self, op: TensorOperation) -> Self {
        self.tensor_stages.push(op);
        self
    }

    pub fn rescale(self, scaling_coefficient: f32) -> Self {
        self.tensor_op(TensorOperation::Rescale(Rescale::new(scaling_coefficient)))
    }

    pub fn normalize(self, normalizing: Normalizing) -> Self {
        self.tensor_op(TensorOperation::Normalize(normalizing))
    }

    pub fn channels_first(self) -> Self {
        self.tensor_op(TensorOperation::ChannelsFirst)
    }

    /// Append the stages of a framework preset, laid out for the data as it
    /// is at this point of the pipeline.
    pub fn preset(self, input_type: InputType) -> Self {
        let channels_last = !self
            .tensor_stages
            .iter()
            .any(|stage| matches!(stage, TensorOperation::ChannelsFirst));
        input_type
            .operations(channels_last)
            .into_iter()
            .fold(self, Self::tensor_op)
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if any stage is misconfigured.
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::new(self.image_stages, self.conversion, self.tensor_stages)
    }
}
