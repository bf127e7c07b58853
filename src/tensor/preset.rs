//! Framework-specific normalization presets for 3-channel input.

use serde::{Deserialize, Serialize};

use crate::image::RGB_CHANNELS;

use super::{Normalizing, Rescale, TensorOperation};

/// ImageNet channel means on the `[0, 1]` scale, RGB order.
const TORCH_MEAN: [f32; RGB_CHANNELS] = [0.485, 0.456, 0.406];
const TORCH_STD: [f32; RGB_CHANNELS] = [0.229, 0.224, 0.225];

/// ImageNet channel means on the `[0, 255]` scale, BGR order.
const CAFFE_MEAN: [f32; RGB_CHANNELS] = [103.939, 116.779, 123.68];

/// How a model family expects its input to be scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Scale to `[-1, 1]`.
    Tf,
    /// Subtract the ImageNet means from BGR input, no scaling.
    Caffe,
    /// Scale to `[0, 1]`, then standardize with ImageNet mean and std.
    Torch,
}

impl InputType {
    /// The tensor stages this preset expands to.
    ///
    /// `channels_last` must describe the data the stages will see, i.e. pass
    /// `false` when the preset runs after [`super::ChannelsFirst`].
    #[must_use]
    pub fn operations(self, channels_last: bool) -> Vec<TensorOperation> {
        let normalize = |mean: [f32; RGB_CHANNELS], std: [f32; RGB_CHANNELS]| {
            TensorOperation::Normalize(Normalizing {
                mean: mean.to_vec(),
                std: std.to_vec(),
                channels_last,
            })
        };

        match self {
            Self::Tf => vec![normalize([127.5; RGB_CHANNELS], [127.5; RGB_CHANNELS])],
            Self::Caffe => vec![normalize(CAFFE_MEAN, [1.0; RGB_CHANNELS])],
            Self::Torch => vec![
                TensorOperation::Rescale(Rescale::default()),
                normalize(TORCH_MEAN, TORCH_STD),
            ],
        }
    }
}
