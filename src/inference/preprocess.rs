//! Image preprocessing
//!
//! bytes → RGB8 → 224×224 (bilinear) → [0,1] → per-channel normalize → (1,3,224,224)

use crate::errors::{NeuroError, Result};
use candle_core::{Device, Tensor};
use image::imageops::FilterType;
use image::RgbImage;

/// Side length of the square network input
pub const INPUT_SIZE: u32 = 224;

/// ImageNet channel means (R, G, B)
pub const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations (R, G, B)
pub const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode any supported format into a resized RGB image
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| NeuroError::ImageDecode(e.to_string()))?;
    let rgb = decoded.to_rgb8();
    Ok(image::imageops::resize(
        &rgb,
        INPUT_SIZE,
        INPUT_SIZE,
        FilterType::Triangle,
    ))
}

/// Planar (CHW) normalized values
pub fn normalize_chw(img: &RgbImage) -> Vec<f32> {
    let (w, h) = img.dimensions();
    let plane = (w * h) as usize;
    let mut data = vec![0f32; plane * 3];

    for (i, pixel) in img.pixels().enumerate() {
        for c in 0..3 {
            let scaled = pixel[c] as f32 / 255.0;
            data[c * plane + i] = (scaled - CHANNEL_MEAN[c]) / CHANNEL_STD[c];
        }
    }

    data
}

/// Full transform from encoded bytes to a batch of one
pub fn preprocess(bytes: &[u8], device: &Device) -> Result<Tensor> {
    let img = decode_rgb(bytes)?;
    let data = normalize_chw(&img);
    let side = INPUT_SIZE as usize;
    Ok(Tensor::from_vec(data, (1, 3, side, side), device)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_output_shape() {
        let tensor = preprocess(&png_bytes(64, 48, [10, 20, 30]), &Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_channel_normalization() {
        let img = decode_rgb(&png_bytes(8, 8, [255, 0, 128])).unwrap();
        let data = normalize_chw(&img);
        let plane = 224 * 224;

        assert!((data[0] - (1.0 - 0.485) / 0.229).abs() < 1e-5);
        assert!((data[plane] - (0.0 - 0.456) / 0.224).abs() < 1e-5);
        let blue = (128.0 / 255.0 - 0.406) / 0.225;
        assert!((data[2 * plane + 17] - blue).abs() < 1e-5);
    }

    #[test]
    fn test_deterministic() {
        let bytes = png_bytes(300, 200, [90, 120, 30]);
        let a = normalize_chw(&decode_rgb(&bytes).unwrap());
        let b = normalize_chw(&decode_rgb(&bytes).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_grayscale_is_expanded() {
        let gray = image::GrayImage::from_pixel(16, 16, image::Luma([200]));
        let mut out = Cursor::new(Vec::new());
        gray.write_to(&mut out, ImageFormat::Png).unwrap();

        let tensor = preprocess(&out.into_inner(), &Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_rejects_non_image() {
        let err = preprocess(b"\x00\x01not an image at all", &Device::Cpu).unwrap_err();
        assert!(matches!(err, NeuroError::ImageDecode(_)));
        assert!(matches!(
            preprocess(&[], &Device::Cpu),
            Err(NeuroError::ImageDecode(_))
        ));
    }
}
