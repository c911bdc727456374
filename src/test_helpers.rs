//! Shared fixtures for the artsync test suite.
//!
//! Real bytes over stand-ins: tests exercise the actual decode and encode
//! paths, so fixtures are genuine in-memory PNGs rather than magic strings.

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Encode a small RGBA gradient as PNG bytes.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Build a tree-listing JSON payload from raw paths.
pub fn tree_json(paths: &[&str]) -> String {
    let entries: Vec<serde_json::Value> = paths
        .iter()
        .map(|p| serde_json::json!({ "path": p }))
        .collect();
    serde_json::json!({ "tree": entries }).to_string()
}
