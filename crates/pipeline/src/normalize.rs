//! Normalization of raw generated images before persistence.
//!
//! Bounds the longer edge to a configured maximum while preserving
//! aspect ratio, and re-encodes to JPEG at a configured quality to
//! control storage size. Deterministic for a fixed input and
//! configuration. This stage only runs on already-successful
//! generation output, so a decode failure is a hard error, never
//! retried.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::error::PipelineError;

/// Default bound on the longer image edge, in pixels.
pub const DEFAULT_MAX_EDGE: u32 = 1024;

/// Default JPEG quality (0-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Tunable parameters for the normalization stage.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Upper bound on the longer edge; larger images are scaled down
    /// proportionally.
    pub max_edge: u32,
    /// JPEG re-encode quality.
    pub jpeg_quality: u8,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// A normalized image ready for persistence.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode, bound, and re-encode one generated image.
pub fn normalize(bytes: &[u8], config: &NormalizeConfig) -> Result<NormalizedImage, PipelineError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| PipelineError::Decode(e.to_string()))?;

    let longer = decoded.width().max(decoded.height());
    let bounded = if longer > config.max_edge {
        // resize() fits within the box while preserving aspect ratio.
        decoded.resize(config.max_edge, config.max_edge, FilterType::Lanczos3)
    } else {
        decoded
    };

    let (width, height) = (bounded.width(), bounded.height());
    // JPEG carries no alpha channel.
    let rgb = bounded.to_rgb8();

    let mut data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut data, config.jpeg_quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| PipelineError::Internal(format!("JPEG encode failed: {e}")))?;

    Ok(NormalizedImage {
        mime_type: "image/jpeg".to_string(),
        data,
        width,
        height,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 30, 200])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn wide_image_scales_width_to_bound() {
        let result = normalize(&png_bytes(2048, 1024), &NormalizeConfig::default()).unwrap();
        assert_eq!(result.width, 1024);
        assert_eq!(result.height, 512);
        assert_eq!(result.mime_type, "image/jpeg");
    }

    #[test]
    fn tall_image_scales_height_to_bound() {
        let result = normalize(&png_bytes(500, 2000), &NormalizeConfig::default()).unwrap();
        assert_eq!(result.height, 1024);
        assert_eq!(result.width, 250);
    }

    #[test]
    fn aspect_ratio_preserved_within_rounding() {
        let result = normalize(&png_bytes(1920, 1080), &NormalizeConfig::default()).unwrap();
        let input_ratio = 1920.0 / 1080.0;
        let output_ratio = result.width as f64 / result.height as f64;
        assert!((input_ratio - output_ratio).abs() < 0.01);
        assert_eq!(result.width, 1024);
    }

    #[test]
    fn small_image_keeps_dimensions() {
        let result = normalize(&png_bytes(800, 600), &NormalizeConfig::default()).unwrap();
        assert_eq!((result.width, result.height), (800, 600));
        // Still re-encoded for storage.
        assert_eq!(result.mime_type, "image/jpeg");
    }

    #[test]
    fn custom_bound_applies() {
        let config = NormalizeConfig {
            max_edge: 100,
            ..Default::default()
        };
        let result = normalize(&png_bytes(400, 200), &config).unwrap();
        assert_eq!((result.width, result.height), (100, 50));
    }

    #[test]
    fn deterministic_for_fixed_input() {
        let bytes = png_bytes(1500, 900);
        let config = NormalizeConfig::default();
        let first = normalize(&bytes, &config).unwrap();
        let second = normalize(&bytes, &config).unwrap();
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn undecodable_bytes_are_a_hard_error() {
        let result = normalize(b"not an image", &NormalizeConfig::default());
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }
}
