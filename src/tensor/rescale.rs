//! Rescaling operator.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::FloatData;

/// Divides every element by a constant, mapping raw pixels into `[0, 1]` by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rescale {
    pub scaling_coefficient: f32,
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            scaling_coefficient: 255.0,
        }
    }
}

impl Rescale {
    pub const NAME: &'static str = "rescale";

    #[must_use]
    pub fn new(scaling_coefficient: f32) -> Self {
        Self {
            scaling_coefficient,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a zero or non-finite coefficient.
    pub fn validate(&self) -> Result<()> {
        if self.scaling_coefficient == 0.0 || !self.scaling_coefficient.is_finite() {
            return Err(Error::invalid_argument(
                Self::NAME,
                format!(
                    "scaling coefficient {} must be finite and non-zero",
                    self.scaling_coefficient
                ),
            ));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a zero or non-finite coefficient.
    pub fn apply(&self, mut input: FloatData) -> Result<FloatData> {
        self.validate()?;
        for value in &mut input.data {
            *value /= self.scaling_coefficient;
        }
        Ok(input)
    }
}
