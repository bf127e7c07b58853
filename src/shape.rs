//! Tensor shapes with possibly unknown dimensions.
//!
//! Image shapes are rank 3 and always listed as `(width, height, channels)`.
//! The flattened pixel data itself is row-major `(height, width, channels)`,
//! so the descriptor order and the memory order differ in the first two axes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An ordered list of dimension sizes, any of which may be unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TensorShape {
    dims: Vec<Option<usize>>,
}

impl TensorShape {
    /// Create a fully known shape.
    #[must_use]
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().copied().map(Some).collect(),
        }
    }

    #[must_use]
    pub fn from_dims(dims: Vec<Option<usize>>) -> Self {
        Self { dims }
    }

    /// Create a shape of the given rank where every dimension is unknown.
    #[must_use]
    pub fn unknown(rank: usize) -> Self {
        Self {
            dims: vec![None; rank],
        }
    }

    /// Create an image shape in `(width, height, channels)` order.
    #[must_use]
    pub fn image(width: Option<usize>, height: Option<usize>, channels: Option<usize>) -> Self {
        Self {
            dims: vec![width, height, channels],
        }
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[must_use]
    pub fn dims(&self) -> &[Option<usize>] {
        &self.dims
    }

    /// Size of dimension `index`, `None` if unknown or out of range.
    #[must_use]
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied().flatten()
    }

    #[must_use]
    pub fn width(&self) -> Option<usize> {
        self.dim(0)
    }

    #[must_use]
    pub fn height(&self) -> Option<usize> {
        self.dim(1)
    }

    /// Size of the last dimension.
    #[must_use]
    pub fn channels(&self) -> Option<usize> {
        self.dims.last().copied().flatten()
    }

    #[must_use]
    pub fn with_width(&self, width: Option<usize>) -> Self {
        self.with_dim(0, width)
    }

    #[must_use]
    pub fn with_height(&self, height: Option<usize>) -> Self {
        self.with_dim(1, height)
    }

    #[must_use]
    pub fn with_channels(&self, channels: Option<usize>) -> Self {
        let last = self.rank().saturating_sub(1);
        self.with_dim(last, channels)
    }

    fn with_dim(&self, index: usize, value: Option<usize>) -> Self {
        let mut dims = self.dims.clone();
        if let Some(dim) = dims.get_mut(index) {
            *dim = value;
        }
        Self { dims }
    }

    /// Whether every dimension is known.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.dims.iter().all(Option::is_some)
    }

    /// Product of all dimensions, `None` while any of them is unknown.
    #[must_use]
    pub fn num_elements(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, dim| dim.map(|d| acc * d))
    }

    /// Check that this is a rank 3 image shape and split it into its parts.
    pub(crate) fn image_dims(
        &self,
        stage: &str,
    ) -> Result<(Option<usize>, Option<usize>, Option<usize>)> {
        if self.rank() != 3 {
            return Err(Error::invalid_argument(
                stage,
                format!("expected a (width, height, channels) shape, got {self}"),
            ));
        }
        Ok((self.dims[0], self.dims[1], self.dims[2]))
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match dim {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "?")?,
            }
        }
        write!(f, ")")
    }
}
