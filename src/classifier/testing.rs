// Test doubles shared by the classifier and command tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;

use super::labels::default_labels;
use super::{Classifier, ClassifierError, ScoreModel};

/// Scores class `i` as `mean_intensity * i`, so the last class always wins on a non-black image.
pub struct StubModel {
    pub classes: usize,
    pub declared: Option<usize>,
}

impl ScoreModel for StubModel {
    fn input_size(&self) -> (u32, u32) {
        (6, 4)
    }

    fn output_width(&self) -> Option<usize> {
        self.declared
    }

    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        if input.shape() != [1, 4, 6, 3] {
            return Err(ClassifierError::Shape(format!("unexpected input {:?}", input.shape())));
        }
        let mean = input.mean().unwrap_or(0.0);
        Ok((0..self.classes).map(|i| mean * i as f32).collect())
    }
}

pub fn stub_classifier(classes: usize) -> Classifier {
    let model = StubModel {
        classes,
        declared: Some(classes),
    };
    let labels = default_labels().into_iter().take(classes).collect();
    Classifier::new(Box::new(model), labels).unwrap()
}

/// Encodes a small gradient image as PNG.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 40 % 256) as u8, (y * 60 % 256) as u8, 200])
    });
    encode_png(img)
}

pub fn encode_png(img: RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}
