//! Memory layout changes.

use ndarray::Array3;

use crate::error::{Error, Result};
use crate::shape::TensorShape;

use super::{FloatData, Layout};

/// Moves the channel axis to the front: `(h, w, c)` data becomes `(c, h, w)`.
///
/// The shape descriptor `(w, h, c)` becomes `(c, w, h)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelsFirst;

impl ChannelsFirst {
    pub const NAME: &'static str = "channels_first";

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the data is already channels-first.
    pub fn check_layout(&self, input: Layout) -> Result<Layout> {
        match input {
            Layout::ChannelsLast => Ok(Layout::ChannelsFirst),
            Layout::ChannelsFirst => Err(Error::invalid_argument(
                Self::NAME,
                "data is already channels-first",
            )),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `input` is not a consistent rank 3
    /// channels-last image array.
    pub fn apply(&self, input: FloatData) -> Result<FloatData> {
        input.check(Self::NAME)?;
        let layout = self.check_layout(input.layout)?;
        let shape = self.output_shape(&input.shape)?;
        let (width, height, channels) = match input.shape.dims() {
            [Some(w), Some(h), Some(c)] => (*w, *h, *c),
            _ => {
                return Err(Error::invalid_argument(
                    Self::NAME,
                    format!("shape {} is not fully known", input.shape),
                ))
            }
        };

        let hwc = Array3::from_shape_vec((height, width, channels), input.data).map_err(|err| {
            Error::invalid_argument(Self::NAME, format!("cannot view data as HWC: {err}"))
        })?;
        let data = hwc.permuted_axes([2, 0, 1]).iter().copied().collect();

        Ok(FloatData {
            data,
            shape,
            layout,
        })
    }

    /// # Errors
    ///
    /// Returns an error if `input` is not a rank 3 image shape.
    pub fn output_shape(&self, input: &TensorShape) -> Result<TensorShape> {
        let (width, height, channels) = input.image_dims(Self::NAME)?;
        Ok(TensorShape::from_dims(vec![channels, width, height]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hwc_to_chw() {
        // 2 wide, 1 high, 3 channels: pixels (1,2,3) and (4,5,6)
        let input = FloatData::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            TensorShape::new(&[2, 1, 3]),
        )
        .unwrap();
        let out = ChannelsFirst.apply(input).unwrap();
        assert_eq!(out.data, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(out.shape, TensorShape::new(&[3, 2, 1]));
        assert_eq!(out.layout, Layout::ChannelsFirst);
    }

    #[test]
    fn test_second_transpose_rejected() {
        let input = FloatData::new(vec![0.0; 12], TensorShape::new(&[2, 2, 3])).unwrap();
        let once = ChannelsFirst.apply(input).unwrap();
        assert!(matches!(
            ChannelsFirst.apply(once),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_rows_stay_contiguous_per_plane() {
        // 2x2 single channel is already planar
        let input =
            FloatData::new(vec![1.0, 2.0, 3.0, 4.0], TensorShape::new(&[2, 2, 1])).unwrap();
        let out = ChannelsFirst.apply(input).unwrap();
        assert_eq!(out.data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_output_shape_keeps_unknowns() {
        let shape = TensorShape::image(None, Some(4), Some(3));
        assert_eq!(
            ChannelsFirst.output_shape(&shape).unwrap(),
            TensorShape::from_dims(vec![Some(3), None, Some(4)])
        );
        assert!(ChannelsFirst
            .output_shape(&TensorShape::new(&[4, 3]))
            .is_err());
    }
}
