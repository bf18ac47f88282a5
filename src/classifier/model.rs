// model.rs - Inference backends
//
// `ScoreModel` is the seam between the classifier and whatever produces raw
// class scores. `OnnxModel` is the production backend: a Keras image model
// exported to ONNX and executed with ONNX Runtime.

use std::collections::HashMap;
use std::path::Path;

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, ValueType};

use super::error::ClassifierError;

/// Something that maps a `(1, height, width, 3)` image tensor to one raw score per class.
pub trait ScoreModel: Send + Sync {
    /// Expected input size as `(width, height)`.
    fn input_size(&self) -> (u32, u32);

    /// Number of scores produced per image, when the model declares it.
    fn output_width(&self) -> Option<usize>;

    /// Runs a single forward pass and returns the raw score vector.
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

/// ONNX Runtime session with the input geometry read once at load time.
#[derive(Debug)]
pub struct OnnxModel {
    session: Session,
    input_name: String,
    width: u32,
    height: u32,
    outputs: Option<usize>,
}

impl OnnxModel {
    /// Loads the model and reads its NHWC input dimensions.
    pub fn load(path: &Path, intra_threads: usize) -> Result<Self, ClassifierError> {
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?;
        if intra_threads > 0 {
            builder = builder.with_intra_threads(intra_threads)?;
        }
        let session = builder.commit_from_file(path)?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| ClassifierError::Model("Model has no inputs".into()))?;
        let dims = match &input.input_type {
            ValueType::Tensor { dimensions, .. } => dimensions.clone(),
            other => {
                return Err(ClassifierError::Model(format!(
                    "Model input must be a tensor, found {:?}",
                    other
                )))
            }
        };
        let (height, width) = nhwc_spatial_dims(&dims)?;
        let input_name = input.name.clone();

        let outputs = session.outputs.first().and_then(|output| match &output.output_type {
            ValueType::Tensor { dimensions, .. } => {
                dimensions.last().copied().filter(|d| *d > 0).map(|d| d as usize)
            }
            _ => None,
        });

        log::info!(
            "[MODEL] Loaded {} (input '{}' {}x{}, {} outputs)",
            path.display(),
            input_name,
            width,
            height,
            outputs.map(|n| n.to_string()).unwrap_or_else(|| "dynamic".into())
        );

        Ok(Self {
            session,
            input_name,
            width,
            height,
            outputs,
        })
    }
}

/// Extracts `(height, width)` from an NHWC shape such as `[-1, 224, 224, 3]`.
fn nhwc_spatial_dims(dims: &[i64]) -> Result<(u32, u32), ClassifierError> {
    if dims.len() != 4 {
        return Err(ClassifierError::Shape(format!(
            "expected a 4-D NHWC input, found {:?}",
            dims
        )));
    }
    if dims[3] != 3 && dims[3] != -1 {
        return Err(ClassifierError::Shape(format!(
            "expected 3 colour channels, found {}",
            dims[3]
        )));
    }
    match (dims[1], dims[2]) {
        (h, w) if h > 0 && w > 0 => Ok((h as u32, w as u32)),
        _ => Err(ClassifierError::Shape(format!(
            "model input resolution must be fixed, found {:?}",
            dims
        ))),
    }
}

impl ScoreModel for OnnxModel {
    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn output_width(&self) -> Option<usize> {
        self.outputs
    }

    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let tensor = Tensor::from_array(input)
            .map_err(|e| ClassifierError::Model(format!("Failed to create input tensor: {}", e)))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), tensor);

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| ClassifierError::Model(format!("Failed to run model: {}", e)))?;
        let scores = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Model(format!("Failed to extract output tensor: {}", e)))?;

        Ok(scores.iter().copied().collect())
    }
}
