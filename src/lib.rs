//! # pixelprep
//!
//! Image preprocessing pipelines that turn decoded images into model-ready
//! float tensors.
//!
//! A pipeline is a fixed chain of image-domain operators (resize, crop,
//! center-crop, pad, rotate, color conversion), a flattening step, and
//! tensor-domain operators (rescale, per-channel normalization, layout
//! changes). Every stage can also report the shape it produces, so a
//! pipeline's output shape is known before any image is processed.
//!
//! Shapes are written `(width, height, channels)`; the flattened data itself
//! is row-major `(height, width, channels)`.
//!
//! ## Example
//!
//! ```no_run
//! use pixelprep::ops::{InterpolationType, Resize};
//! use pixelprep::tensor::InputType;
//! use pixelprep::{ColorMode, Pipeline, TensorShape};
//!
//! # fn main() -> pixelprep::Result<()> {
//! let pipeline = Pipeline::builder()
//!     .resize(Resize::new(256, 256).with_interpolation(InterpolationType::Bilinear))
//!     .center_crop(224)
//!     .to_float_array(Some(ColorMode::Rgb))
//!     .preset(InputType::Torch)
//!     .channels_first()
//!     .build()?;
//!
//! assert_eq!(
//!     pipeline.output_shape(&TensorShape::unknown(3))?,
//!     TensorShape::new(&[3, 224, 224])
//! );
//!
//! let tensor = pipeline.apply_file("cat.jpg")?;
//! println!("{} values", tensor.data.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod ops;
pub mod pipeline;
pub mod shape;
pub mod tensor;

pub use crate::error::{Error, Result};
pub use crate::image::{ColorMode, Image, ToFloatArray};
pub use crate::ops::ImageOperation;
pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineConfig, TensorPipelineBuilder};
pub use crate::shape::TensorShape;
pub use crate::tensor::{FloatData, Layout, TensorOperation};
