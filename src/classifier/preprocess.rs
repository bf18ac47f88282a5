// preprocess.rs - Image bytes to model input tensor
//
// decode -> stretch to the model resolution -> RGB f32 -> batch axis -> scale to [0, 1]

use image::imageops::FilterType;
use ndarray::Array4;

use super::error::ClassifierError;

/// Decodes `bytes` and produces a `(1, height, width, 3)` tensor with values in `[0.0, 1.0]`.
///
/// The image is stretched to exactly `width x height`; aspect ratio is not preserved.
pub fn preprocess(bytes: &[u8], width: u32, height: u32) -> Result<Array4<f32>, ClassifierError> {
    if width == 0 || height == 0 {
        return Err(ClassifierError::Shape(format!(
            "target size must be non-zero, got {}x{}",
            width, height
        )));
    }

    let img = image::load_from_memory(bytes)?;
    let rgb = img.resize_exact(width, height, FilterType::CatmullRom).to_rgb8();

    let tensor = Array4::from_shape_fn(
        (1, height as usize, width as usize, 3),
        |(_, y, x, c)| rgb.get_pixel(x as u32, y as u32)[c] as f32,
    );
    Ok(tensor / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::testing::{encode_png, sample_png};
    use image::{Rgb, RgbImage};

    #[test]
    fn test_output_shape_and_range() {
        let tensor = preprocess(&sample_png(5, 3), 8, 4).unwrap();
        assert_eq!(tensor.shape(), &[1, 4, 8, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_is_deterministic() {
        let bytes = sample_png(7, 7);
        let first = preprocess(&bytes, 4, 4).unwrap();
        let second = preprocess(&bytes, 4, 4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_solid_colour_scales_exactly() {
        let bytes = encode_png(RgbImage::from_pixel(2, 2, Rgb([255, 0, 51])));

        let tensor = preprocess(&bytes, 2, 2).unwrap();
        assert_eq!(tensor[[0, 1, 1, 0]], 1.0);
        assert_eq!(tensor[[0, 1, 1, 1]], 0.0);
        assert!((tensor[[0, 0, 0, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let result = preprocess(b"definitely not a png", 4, 4);
        assert!(matches!(result, Err(ClassifierError::Decode(_))));
    }

    #[test]
    fn test_rejects_zero_target() {
        assert!(matches!(preprocess(&sample_png(2, 2), 0, 4), Err(ClassifierError::Shape(_))));
    }
}
