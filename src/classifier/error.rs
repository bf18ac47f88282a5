use thiserror::Error;

/// Everything that can go wrong between receiving image bytes and picking a label.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The bytes were not an image format we can decode
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),
    /// Loading or running the ONNX model failed
    #[error("Model error: {0}")]
    Model(String),
    /// The model produced or expects a tensor we cannot work with
    #[error("Shape error: {0}")]
    Shape(String),
    /// The label file and the model disagree on the number of classes
    #[error("Label mismatch: {labels} labels loaded but the model has {outputs} outputs")]
    LabelMismatch { labels: usize, outputs: usize },
    /// The blocking inference worker did not return a result
    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<ort::Error> for ClassifierError {
    fn from(err: ort::Error) -> Self {
        ClassifierError::Model(err.to_string())
    }
}
