//! Tensor-domain operators working on flattened float arrays.

mod layout;
mod normalize;
mod preset;
mod rescale;

pub use layout::ChannelsFirst;
pub use normalize::{mean, std, Normalizing};
pub use preset::InputType;
pub use rescale::Rescale;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shape::TensorShape;

/// Where the channel axis of a float array sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `(h, w, c)` memory, `(w, h, c)` shape. What [`crate::ToFloatArray`] produces.
    #[default]
    ChannelsLast,
    /// `(c, h, w)` memory, `(c, w, h)` shape.
    ChannelsFirst,
}

/// A flattened float array together with its shape and layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatData {
    pub data: Vec<f32>,
    pub shape: TensorShape,
    #[serde(default)]
    pub layout: Layout,
}

impl FloatData {
    /// Channels-last data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the shape is not fully known or
    /// does not describe exactly `data.len()` elements.
    pub fn new(data: Vec<f32>, shape: TensorShape) -> Result<Self> {
        Self::with_layout(data, shape, Layout::ChannelsLast)
    }

    /// # Errors
    ///
    /// Same as [`FloatData::new`].
    pub fn with_layout(data: Vec<f32>, shape: TensorShape, layout: Layout) -> Result<Self> {
        let value = Self {
            data,
            shape,
            layout,
        };
        value.check("float_data")?;
        Ok(value)
    }

    pub(crate) fn check(&self, stage: &str) -> Result<()> {
        match self.shape.num_elements() {
            Some(n) if n == self.data.len() => Ok(()),
            Some(n) => Err(Error::invalid_argument(
                stage,
                format!(
                    "shape {} describes {n} elements but the array holds {}",
                    self.shape,
                    self.data.len()
                ),
            )),
            None => Err(Error::invalid_argument(
                stage,
                format!("shape {} is not fully known", self.shape),
            )),
        }
    }
}

/// One stage of the tensor-domain part of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TensorOperation {
    Rescale(Rescale),
    Normalize(Normalizing),
    ChannelsFirst,
}

impl TensorOperation {
    /// Name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rescale(_) => Rescale::NAME,
            Self::Normalize(_) => Normalizing::NAME,
            Self::ChannelsFirst => ChannelsFirst::NAME,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for unusable configurations.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Rescale(op) => op.validate(),
            Self::Normalize(op) => op.validate(),
            Self::ChannelsFirst => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Propagates the wrapped operator's error.
    pub fn apply(&self, input: FloatData) -> Result<FloatData> {
        match self {
            Self::Rescale(op) => op.apply(input),
            Self::Normalize(op) => op.apply(input),
            Self::ChannelsFirst => ChannelsFirst.apply(input),
        }
    }

    /// Layout of the data after this stage, given the layout before it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the stage cannot work on `input`.
    pub fn output_layout(&self, input: Layout) -> Result<Layout> {
        match self {
            Self::Rescale(_) => Ok(input),
            Self::Normalize(op) => op.check_layout(input).map(|()| input),
            Self::ChannelsFirst => ChannelsFirst.check_layout(input),
        }
    }

    /// # Errors
    ///
    /// Propagates the wrapped operator's error.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        match self {
            Self::Rescale(_) | Self::Normalize(_) => Ok(input.clone()),
            Self::ChannelsFirst => ChannelsFirst.output_shape(input),
        }
    }
}

/// Walk the layouts a chain of stages produces from channels-last input.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] from the first stage that would read the
/// data in the wrong layout.
pub fn check_layouts(stages: &[TensorOperation]) -> Result<Layout> {
    stages
        .iter()
        .try_fold(Layout::ChannelsLast, |layout, stage| stage.output_layout(layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_data_checks_length() {
        assert!(FloatData::new(vec![0.0; 6], TensorShape::new(&[1, 2, 3])).is_ok());
        assert!(FloatData::new(vec![0.0; 5], TensorShape::new(&[1, 2, 3])).is_err());
        assert!(FloatData::new(vec![0.0; 6], TensorShape::image(None, Some(2), Some(3))).is_err());
    }

    #[test]
    fn test_tagged_json() {
        let ops: Vec<TensorOperation> = serde_json::from_str(
            r#"[
                {"op": "rescale"},
                {"op": "normalize", "mean": [0.5], "std": [0.25]},
                {"op": "channels_first"}
            ]"#,
        )
        .unwrap();
        assert_eq!(ops[0], TensorOperation::Rescale(Rescale::default()));
        assert_eq!(
            ops[1],
            TensorOperation::Normalize(Normalizing::new(vec![0.5], vec![0.25]))
        );
        assert_eq!(ops[2], TensorOperation::ChannelsFirst);
    }

    #[test]
    fn test_layout_defaults_when_missing() {
        let data: FloatData =
            serde_json::from_str(r#"{"data": [1.0], "shape": [1, 1, 1]}"#).unwrap();
        assert_eq!(data.layout, Layout::ChannelsLast);
    }

    #[test]
    fn test_check_layouts() {
        let normalize = Normalizing::new(vec![0.0; 3], vec![1.0; 3]);

        assert_eq!(
            check_layouts(&[
                TensorOperation::Normalize(normalize.clone()),
                TensorOperation::ChannelsFirst,
                TensorOperation::Normalize(normalize.clone().channels_first()),
            ])
            .unwrap(),
            Layout::ChannelsFirst
        );

        // channels-last statistics after the transpose
        assert!(check_layouts(&[
            TensorOperation::ChannelsFirst,
            TensorOperation::Normalize(normalize.clone()),
        ])
        .is_err());
        assert!(check_layouts(&[
            TensorOperation::ChannelsFirst,
            TensorOperation::Rescale(Rescale::default()),
            TensorOperation::ChannelsFirst,
        ])
        .is_err());
        assert!(check_layouts(&[TensorOperation::Normalize(normalize.channels_first())]).is_err());
    }
}
