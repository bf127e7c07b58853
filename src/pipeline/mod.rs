//! Ordered preprocessing pipelines.
//!
//! A [`Pipeline`] runs every image-domain stage in order, flattens the result
//! with [`ToFloatArray`], then runs every tensor-domain stage in order. The
//! stage list is fixed at construction, so one pipeline can serve any number
//! of calls, including concurrent ones.

mod builder;
mod config;

pub use builder::{PipelineBuilder, TensorPipelineBuilder};
pub use config::PipelineConfig;

use std::borrow::Cow;
use std::path::Path;

use crate::error::{Error, Result};
use crate::image::{load_image, Image, ToFloatArray};
use crate::ops::ImageOperation;
use crate::shape::TensorShape;
use crate::tensor::{check_layouts, FloatData, Layout, TensorOperation};

/// An immutable chain of image-domain stages followed by tensor-domain stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    image_stages: Vec<ImageOperation>,
    conversion: ToFloatArray,
    tensor_stages: Vec<TensorOperation>,
}

impl Pipeline {
    /// Start building a pipeline with its image-domain stages.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Create a pipeline from its stages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any stage is misconfigured or a
    /// tensor stage would read the data in the wrong layout.
    pub fn new(
        image_stages: Vec<ImageOperation>,
        conversion: ToFloatArray,
        tensor_stages: Vec<TensorOperation>,
    ) -> Result<Self> {
        for stage in &image_stages {
            stage.validate()?;
        }
        for stage in &tensor_stages {
            stage.validate()?;
        }
        check_layouts(&tensor_stages)?;

        let pipeline = Self {
            image_stages,
            conversion,
            tensor_stages,
        };
        tracing::info!("Built pipeline: {}", pipeline.describe());
        Ok(pipeline)
    }

    #[must_use]
    pub fn image_stages(&self) -> &[ImageOperation] {
        &self.image_stages
    }

    #[must_use]
    pub fn conversion(&self) -> ToFloatArray {
        self.conversion
    }

    #[must_use]
    pub fn tensor_stages(&self) -> &[TensorOperation] {
        &self.tensor_stages
    }

    /// Stage names joined with arrows, for logs.
    fn describe(&self) -> String {
        self.image_stages
            .iter()
            .map(ImageOperation::name)
            .chain(std::iter::once(ToFloatArray::NAME))
            .chain(self.tensor_stages.iter().map(TensorOperation::name))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn run_image_stages<'a>(&self, image: &'a Image) -> Result<Cow<'a, Image>> {
        let mut current = Cow::Borrowed(image);
        for stage in &self.image_stages {
            tracing::debug!("Applying {} to {}", stage.name(), current.shape());
            current = Cow::Owned(stage.apply(&current)?);
        }
        Ok(current)
    }

    /// Run only the image-domain stages.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn apply_image_stages(&self, image: &Image) -> Result<Image> {
        Ok(self.run_image_stages(image)?.into_owned())
    }

    /// Run the whole pipeline on `image`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails. Images with an alpha
    /// channel fail with [`Error::UnsupportedOperation`] unless a stage
    /// converts them first.
    pub fn apply(&self, image: &Image) -> Result<FloatData> {
        let image = self.run_image_stages(image)?;
        self.flatten(&image)
    }

    /// Run the conversion and tensor stages on an image that has already been
    /// through [`Pipeline::apply_image_stages`].
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn flatten(&self, image: &Image) -> Result<FloatData> {
        tracing::debug!("Applying {} to {}", ToFloatArray::NAME, image.shape());
        let (data, shape) = self.conversion.apply(image)?;

        let mut output = FloatData {
            data,
            shape,
            layout: Layout::ChannelsLast,
        };
        for stage in &self.tensor_stages {
            tracing::debug!("Applying {} to {}", stage.name(), output.shape);
            output = stage.apply(output)?;
        }
        Ok(output)
    }

    /// Load the image at `path` and run the whole pipeline on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be loaded or a stage fails.
    pub fn apply_file<P: AsRef<Path>>(&self, path: P) -> Result<FloatData> {
        let path = path.as_ref();
        tracing::info!("Processing image: {}", path.display());
        let image = load_image(path)?;
        self.apply(&image)
    }

    /// Fold every stage's output shape over `input`.
    ///
    /// Unknown input dimensions are allowed as long as some stage fixes them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the result still has unknown
    /// dimensions, or a stage's error if `input` is unusable.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        let mut shape = input.clone();
        for stage in &self.image_stages {
            shape = stage.output_shape(&shape)?;
        }
        shape = self.conversion.output_shape(&shape)?;
        for stage in &self.tensor_stages {
            shape = stage.output_shape(&shape)?;
        }

        if !shape.is_known() {
            return Err(Error::InvalidState {
                reason: format!(
                    "output shape {shape} for input {input} is not fully determined; \
                     add a size-fixing stage such as resize or center_crop"
                ),
            });
        }
        Ok(shape)
    }

    /// The configuration that rebuilds this pipeline.
    #[must_use]
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            image: self.image_stages.clone(),
            to_float_array: self.conversion,
            preset: None,
            tensor: self.tensor_stages.clone(),
        }
    }
}
