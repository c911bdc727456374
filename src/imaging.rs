//! WebP transcoding: decode and resize via the image crate, encode via libwebp.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP) | `image` crate, in-memory via `load_from_memory` |
//! | Resize | `DynamicImage::resize_to_fill` with `Lanczos3` (cover fit) |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy) |
//!
//! The `image` crate's own WebP encoder is lossless-only, so encoding goes
//! through the `webp` crate, which honors the quality setting.
//!
//! Decoding and rendering are split so the worker can decode an asset's
//! source bytes once and render every configured variant from the same
//! decoded image.

use image::DynamicImage;
use image::imageops::FilterType;
use thiserror::Error;

/// File extension of every generated variant.
pub const OUTPUT_EXT: &str = "webp";

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("WebP encode failed: {0}")]
    Encode(String),
}

/// Quality setting for lossy WebP encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(60)
    }
}

/// Decode raw source bytes into pixels.
///
/// The format is sniffed from the bytes themselves, not from the remote
/// path's extension.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, TranscodeError> {
    image::load_from_memory(bytes).map_err(|e| TranscodeError::Decode(e.to_string()))
}

/// Render one square variant: cover-fit resize to `edge`×`edge`, then lossy
/// WebP encode at `quality`. Returns the encoded bytes.
pub fn render_variant(
    img: &DynamicImage,
    edge: u32,
    quality: Quality,
) -> Result<Vec<u8>, TranscodeError> {
    let resized = img.resize_to_fill(edge, edge, FilterType::Lanczos3);

    // libwebp only accepts RGB8/RGBA8 layouts; grayscale and 16-bit sources
    // must be converted first
    let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
    let encoder =
        webp::Encoder::from_image(&rgba).map_err(|reason| TranscodeError::Encode(reason.into()))?;

    // WebPMemory is !Send — copy out to a plain Vec before it crosses threads
    Ok(encoder.encode(quality.value() as f32).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::png_bytes;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(60).value(), 60);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_60() {
        assert_eq!(Quality::default().value(), 60);
    }

    #[test]
    fn decode_valid_png() {
        let img = decode(&png_bytes(20, 30)).unwrap();
        assert_eq!(img.width(), 20);
        assert_eq!(img.height(), 30);
    }

    #[test]
    fn decode_garbage_errors() {
        let result = decode(b"definitely not an image");
        assert!(matches!(result, Err(TranscodeError::Decode(_))));
    }

    #[test]
    fn decode_empty_errors() {
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn rendered_variant_is_square_webp() {
        let img = decode(&png_bytes(64, 64)).unwrap();
        let encoded = render_variant(&img, 32, Quality::new(60)).unwrap();

        let out = image::load_from_memory(&encoded).unwrap();
        assert_eq!(out.width(), 32);
        assert_eq!(out.height(), 32);
    }

    #[test]
    fn non_square_source_still_renders_square() {
        // Cover fit: the short edge fills the frame, the long edge is cropped
        let img = decode(&png_bytes(120, 48)).unwrap();
        let encoded = render_variant(&img, 24, Quality::new(60)).unwrap();

        let out = image::load_from_memory(&encoded).unwrap();
        assert_eq!(out.width(), 24);
        assert_eq!(out.height(), 24);
    }

    #[test]
    fn upscales_smaller_sources() {
        let img = decode(&png_bytes(16, 16)).unwrap();
        let encoded = render_variant(&img, 128, Quality::new(60)).unwrap();

        let out = image::load_from_memory(&encoded).unwrap();
        assert_eq!(out.width(), 128);
        assert_eq!(out.height(), 128);
    }
}
