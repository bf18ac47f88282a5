// classifier/mod.rs - PC part image classification
// This module turns raw image bytes into a (label, confidence) prediction.
//
// Key Features:
// - Label file loading with a built-in fallback list
// - Stretch-resize + [0, 1] normalization matching the training pipeline
// - Softmax + argmax over the model's score vector
// - Inference offloaded to Tokio's blocking pool so the gateway stays responsive
//
// Used by: commands/predict.rs, main.rs (startup)

pub mod error;
pub mod labels;
pub mod model;
pub mod preprocess;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use error::ClassifierError;
pub use labels::load_labels;
pub use model::{OnnxModel, ScoreModel};
pub use preprocess::preprocess;

/// Result of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Probability of `label`, a fraction in `[0, 1]`.
    pub confidence: f32,
}

/// Label set plus the model that scores images against it.
pub struct Classifier {
    labels: Vec<String>,
    model: Box<dyn ScoreModel>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("labels", &self.labels)
            .field("input_size", &self.model.input_size())
            .finish()
    }
}

impl Classifier {
    /// Pairs a model with its labels, refusing a label count the model cannot produce.
    pub fn new(model: Box<dyn ScoreModel>, labels: Vec<String>) -> Result<Self, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::LabelMismatch {
                labels: 0,
                outputs: model.output_width().unwrap_or(0),
            });
        }
        if let Some(outputs) = model.output_width() {
            if outputs != labels.len() {
                return Err(ClassifierError::LabelMismatch {
                    labels: labels.len(),
                    outputs,
                });
            }
        }
        Ok(Self { labels, model })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn input_size(&self) -> (u32, u32) {
        self.model.input_size()
    }

    /// Full class distribution for an image, in label order.
    pub fn probabilities(&self, bytes: &[u8]) -> Result<Vec<f32>, ClassifierError> {
        let (width, height) = self.model.input_size();
        let input = preprocess(bytes, width, height)?;
        let scores = self.model.forward(input)?;

        if scores.len() != self.labels.len() {
            return Err(ClassifierError::LabelMismatch {
                labels: self.labels.len(),
                outputs: scores.len(),
            });
        }
        Ok(softmax(&scores))
    }

    /// Classifies an image and returns the most probable label.
    pub fn classify(&self, bytes: &[u8]) -> Result<Prediction, ClassifierError> {
        let probabilities = self.probabilities(bytes)?;
        let (index, confidence) = argmax(&probabilities)
            .ok_or_else(|| ClassifierError::Shape("model returned no scores".into()))?;

        Ok(Prediction {
            label: self.labels[index].clone(),
            confidence,
        })
    }

    /// Like [`Classifier::classify`], but any failure is logged and reported as `None`.
    pub fn predict_or_none(&self, bytes: &[u8]) -> Option<Prediction> {
        match self.classify(bytes) {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                log::warn!("[CLASSIFIER] Couldn't process the photo: {}", e);
                None
            }
        }
    }
}

/// Runs classification on the blocking pool and awaits the result.
pub async fn classify_in_background(classifier: Arc<Classifier>, bytes: Vec<u8>) -> Option<Prediction> {
    match tokio::task::spawn_blocking(move || classifier.predict_or_none(&bytes)).await {
        Ok(prediction) => prediction,
        Err(e) => {
            log::error!("[CLASSIFIER] {}", ClassifierError::Worker(e.to_string()));
            None
        }
    }
}

/// Numerically stable softmax.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index and value of the largest element; the first one wins on ties.
fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, best_v)) if best_v >= v => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::labels::default_labels;
    use crate::classifier::testing::{sample_png, stub_classifier, StubModel};

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, -4.0]);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_handles_large_scores() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some((1, 0.4)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_classify_returns_known_label_and_fraction() {
        let classifier = stub_classifier(9);
        let bytes = sample_png(12, 9);

        let prediction = classifier.classify(&bytes).unwrap();
        assert!(classifier.labels().contains(&prediction.label));
        assert!((0.0..=1.0).contains(&prediction.confidence));

        let probs = classifier.probabilities(&bytes).unwrap();
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        // Highest score goes to the last class in the stub.
        assert_eq!(prediction.label, "Air Cooling");
    }

    #[test]
    fn test_bad_bytes_become_none() {
        let classifier = stub_classifier(9);
        assert!(classifier.predict_or_none(b"not an image").is_none());
    }

    #[test]
    fn test_rejects_label_count_mismatch() {
        let model = StubModel { classes: 3, declared: Some(3) };
        let result = Classifier::new(Box::new(model), default_labels());
        assert!(matches!(
            result,
            Err(ClassifierError::LabelMismatch { labels: 9, outputs: 3 })
        ));
    }

    #[test]
    fn test_undeclared_width_is_checked_per_request() {
        let model = StubModel { classes: 4, declared: None };
        let classifier = Classifier::new(Box::new(model), default_labels()).unwrap();
        assert!(matches!(
            classifier.classify(&sample_png(3, 3)),
            Err(ClassifierError::LabelMismatch { labels: 9, outputs: 4 })
        ));
    }

    #[tokio::test]
    async fn test_background_classification() {
        let classifier = Arc::new(stub_classifier(9));
        let prediction = classify_in_background(classifier, sample_png(8, 8)).await;
        assert!(prediction.is_some());

        let failed = classify_in_background(Arc::new(stub_classifier(9)), vec![1, 2, 3]).await;
        assert!(failed.is_none());
    }
}
