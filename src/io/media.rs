// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading and saving.
//!
//! Files are read into memory first and decoded from the bytes, so paths
//! with non-ASCII characters behave like any other path. Every failure is
//! reported as an error value rather than a panic.

use crate::util::geometry::Rect;
use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, ImageFormat};
use std::path::Path;

/// Decoded RGBA pixels ready to be uploaded as a texture.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode any supported image file.
pub fn decode(path: &Path) -> Result<DynamicImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    image::load_from_memory(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

/// Load a mask as single-channel grayscale.
pub fn load_gray(path: &Path) -> Result<GrayImage> {
    Ok(decode(path)?.into_luma8())
}

/// Load an image for display.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let rgba = decode(path)?.into_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Cut `rect` out of `img`, clamped to the image bounds.
///
/// Returns `None` when the rectangle does not overlap the image.
pub fn crop(img: &DynamicImage, rect: &Rect) -> Option<DynamicImage> {
    let bounds = Rect::from_size(f64::from(img.width()), f64::from(img.height()));
    let clipped = rect.normalized().intersect(&bounds)?;
    let x = clipped.min.x.round() as u32;
    let y = clipped.min.y.round() as u32;
    let width = (clipped.width().round() as u32).min(img.width() - x);
    let height = (clipped.height().round() as u32).min(img.height() - y);
    if width == 0 || height == 0 {
        return None;
    }
    Some(img.crop_imm(x, y, width, height))
}

/// Encode an image, choosing the format from the file extension.
pub fn save_image(img: &DynamicImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("Unsupported image extension: {}", path.display()))?;
    // JPEG has no alpha channel.
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img.clone(),
    };
    img.save_with_format(path, format)
        .with_context(|| format!("Failed to write {}", path.display()))
}
