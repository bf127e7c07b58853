//! JSON pipeline configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::ToFloatArray;
use crate::ops::ImageOperation;
use crate::tensor::{InputType, TensorOperation};

use super::Pipeline;

/// Serializable description of a [`Pipeline`].
///
/// ```json
/// {
///   "image": [
///     {"op": "resize", "output_width": 224, "output_height": 224},
///     {"op": "convert", "color_mode": "bgr"}
///   ],
///   "to_float_array": {},
///   "preset": "caffe",
///   "tensor": [{"op": "channels_first"}]
/// }
/// ```
///
/// The preset's stages run before the `tensor` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub image: Vec<ImageOperation>,
    pub to_float_array: ToFloatArray,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<InputType>,
    pub tensor: Vec<TensorOperation>,
}

impl PipelineConfig {
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if `json` is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading pipeline configuration from {}", path.display());
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if any stage is misconfigured.
    pub fn build(&self) -> Result<Pipeline> {
        let mut tensor = self
            .preset
            .map(|preset| preset.operations(true))
            .unwrap_or_default();
        tensor.extend(self.tensor.iter().cloned());
        Pipeline::new(self.image.clone(), self.to_float_array, tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::image::ColorMode;
    use crate::ops::{InterpolationType, Resize};
    use crate::shape::TensorShape;

    const CAFFE: &str = r#"{
        "image": [
            {"op": "resize", "output_width": 224, "output_height": 224, "interpolation": "bicubic"},
            {"op": "convert", "color_mode": "bgr"}
        ],
        "preset": "caffe",
        "tensor": [{"op": "channels_first"}]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let config = PipelineConfig::from_json(CAFFE).unwrap();
        assert_eq!(
            config.image[0],
            ImageOperation::Resize(
                Resize::new(224, 224).with_interpolation(InterpolationType::Bicubic)
            )
        );
        assert_eq!(config.to_float_array, ToFloatArray::default());

        let pipeline = config.build().unwrap();
        assert_eq!(pipeline.tensor_stages().len(), 2);
        assert_eq!(
            pipeline.output_shape(&TensorShape::unknown(3)).unwrap(),
            TensorShape::new(&[3, 224, 224])
        );
    }

    #[test]
    fn test_pipeline_config_rebuilds_same_pipeline() {
        let pipeline = Pipeline::builder()
            .center_crop(16)
            .to_float_array(Some(ColorMode::Grayscale))
            .rescale(255.0)
            .build()
            .unwrap();

        let json = pipeline.config().to_json().unwrap();
        let rebuilt = PipelineConfig::from_json(&json).unwrap().build().unwrap();
        assert_eq!(rebuilt, pipeline);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(matches!(
            PipelineConfig::from_json(r#"{"images": []}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{"image": [{"op": "sharpen"}]}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_stage_rejected_at_build() {
        let config = PipelineConfig::from_json(
            r#"{"tensor": [{"op": "normalize", "mean": [0.5], "std": [0.0]}]}"#,
        )
        .unwrap();
        assert!(matches!(config.build(), Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, CAFFE).unwrap();
        assert_eq!(
            PipelineConfig::from_file(&path).unwrap(),
            PipelineConfig::from_json(CAFFE).unwrap()
        );
        assert!(matches!(
            PipelineConfig::from_file(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
