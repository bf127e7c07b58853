//! Per-channel standardization and the statistics it needs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{FloatData, Layout};

/// Subtracts a per-channel mean and divides by a per-channel standard deviation:
///
/// ```text
/// output[c] = (input[c] - mean[c]) / std[c]
/// ```
///
/// With `channels_last` the channel count comes from the last axis and the
/// channel of element `i` is `i % channels`; otherwise it comes from the first
/// axis and the channel is `i / (len / channels)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizing {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
    #[serde(default = "channels_last_default")]
    pub channels_last: bool,
}

fn channels_last_default() -> bool {
    true
}

impl Normalizing {
    pub const NAME: &'static str = "normalize";

    /// Channels-last normalization.
    #[must_use]
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Self {
        Self {
            mean,
            std,
            channels_last: true,
        }
    }

    #[must_use]
    pub fn channels_first(mut self) -> Self {
        self.channels_last = false;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the statistics are empty, differ in
    /// length, or any standard deviation is zero or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.mean.is_empty() || self.mean.len() != self.std.len() {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!(
                    "expected one mean and one std per channel, got {} means and {} stds",
                    self.mean.len(),
                    self.std.len()
                ),
            ));
        }
        if let Some((channel, std)) = self
            .std
            .iter()
            .enumerate()
            .find(|(_, s)| **s == 0.0 || !s.is_finite())
        {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!("std {std} for channel {channel} must be finite and non-zero"),
            ));
        }
        Ok(())
    }

    /// The layout this normalization reads its channels from.
    #[must_use]
    pub fn layout(&self) -> Layout {
        if self.channels_last {
            Layout::ChannelsLast
        } else {
            Layout::ChannelsFirst
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `input` is not the layout the
    /// statistics are indexed for.
    pub fn check_layout(&self, input: Layout) -> Result<()> {
        if input != self.layout() {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!(
                    "statistics are indexed for {:?} data but the data is {input:?}",
                    self.layout()
                ),
            ));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the configuration is invalid, the
    /// data has the wrong layout, or the statistics do not match the channel
    /// count of `input`.
    pub fn apply(&self, mut input: FloatData) -> Result<FloatData> {
        self.validate()?;
        input.check(Self::NAME)?;
        self.check_layout(input.layout)?;

        let axis = if self.channels_last {
            input.shape.rank().saturating_sub(1)
        } else {
            0
        };
        let channels = input.shape.dim(axis).unwrap_or(0);
        if self.mean.len() != channels {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!(
                    "expected one mean/std value per channel, got {} for {channels} channels",
                    self.mean.len()
                ),
            ));
        }

        let plane = input.data.len() / channels;
        let channels_last = self.channels_last;
        for (i, value) in input.data.iter_mut().enumerate() {
            let c = if channels_last { i % channels } else { i / plane };
            *value = (*value - self.mean[c]) / self.std[c];
        }

        Ok(input)
    }
}

fn check_arrays(arrays: &[&[f32]], channels: usize, stage: &str) -> Result<usize> {
    if channels == 0 {
        return Err(Error::invalid_argument(stage, "channel count must be positive"));
    }
    if let Some(bad) = arrays.iter().find(|a| a.len() % channels != 0) {
        return Err(Error::invalid_argument(
            stage,
            format!(
                "array of size {} is not divisible by {channels} channels",
                bad.len()
            ),
        ));
    }
    let per_channel: usize = arrays.iter().map(|a| a.len() / channels).sum();
    if per_channel == 0 {
        return Err(Error::invalid_argument(stage, "no values to compute statistics over"));
    }
    Ok(per_channel)
}

/// Accumulate per-channel sums of `f(x)` over channels-last arrays.
fn channel_sums(arrays: &[&[f32]], channels: usize, f: impl Fn(f64) -> f64) -> Vec<f64> {
    let mut sums = vec![0.0f64; channels];
    for array in arrays {
        for (i, &value) in array.iter().enumerate() {
            sums[i % channels] += f(f64::from(value));
        }
    }
    sums
}

/// Per-channel mean over one or more channels-last arrays.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `channels` is zero, an array length is
/// not divisible by it, or there are no values.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn mean(arrays: &[&[f32]], channels: usize) -> Result<Vec<f32>> {
    let n = check_arrays(arrays, channels, "mean")? as f64;
    Ok(channel_sums(arrays, channels, |x| x)
        .into_iter()
        .map(|sum| (sum / n) as f32)
        .collect())
}

/// Per-channel population standard deviation over one or more channels-last arrays.
///
/// # Errors
///
/// Same conditions as [`mean`].
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn std(arrays: &[&[f32]], channels: usize) -> Result<Vec<f32>> {
    let n = check_arrays(arrays, channels, "std")? as f64;
    let sums = channel_sums(arrays, channels, |x| x);
    let squares = channel_sums(arrays, channels, |x| x * x);
    Ok(sums
        .into_iter()
        .zip(squares)
        .map(|(sum, square)| {
            let mean = sum / n;
            // rounding can push the variance slightly below zero
            (square / n - mean * mean).max(0.0).sqrt() as f32
        })
        .collect())
}
