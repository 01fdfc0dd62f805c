//! CPU-side PNG rendering of a [`NoiseField`] with an optional path overlay.
//!
//! This module is feature-gated behind `png` (default on) so that consumers
//! that only need pixel buffers or pointer replay do not pull in `image`.
//! The buffer conversion and rasterizer live in [`crate::pixel`].

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use noise_walk_core::{NoiseField, WalkError};
use tracing::info;

use crate::pixel::{field_to_gray, Overlay};

/// Renders a field as a grayscale image of `display_width` x
/// `display_height`, resampled with Lanczos3 when the grid is a different
/// size, then draws `overlay` (in display coordinates) on top.
pub fn render(
    field: &NoiseField,
    display_width: usize,
    display_height: usize,
    overlay: Option<&Overlay>,
) -> Result<image::RgbaImage, WalkError> {
    let gw = u32::try_from(field.width()).map_err(|_| WalkError::InvalidDimensions)?;
    let gh = u32::try_from(field.height()).map_err(|_| WalkError::InvalidDimensions)?;
    let dw = u32::try_from(display_width).map_err(|_| WalkError::InvalidDimensions)?;
    let dh = u32::try_from(display_height).map_err(|_| WalkError::InvalidDimensions)?;
    if dw == 0 || dh == 0 {
        return Err(WalkError::InvalidDimensions);
    }

    let gray = GrayImage::from_raw(gw, gh, field_to_gray(field))
        .ok_or_else(|| WalkError::Io("gray buffer size mismatch".into()))?;
    let gray = if (gw, gh) == (dw, dh) {
        gray
    } else {
        imageops::resize(&gray, dw, dh, FilterType::Lanczos3)
    };

    let mut rgba = DynamicImage::ImageLuma8(gray).to_rgba8();
    if let Some(overlay) = overlay {
        overlay.draw(&mut rgba, display_width, display_height)?;
    }
    Ok(rgba)
}

/// Writes [`render`]'s output as a PNG.
///
/// Returns `WalkError::InvalidDimensions` if a size overflows `u32` or is
/// zero, or `WalkError::Io` on write failure.
pub fn write_png(
    field: &NoiseField,
    display_width: usize,
    display_height: usize,
    overlay: Option<&Overlay>,
    path: &Path,
) -> Result<(), WalkError> {
    let img = render(field, display_width, display_height, overlay)?;
    img.save(path).map_err(|e| WalkError::Io(e.to_string()))?;
    info!(path = %path.display(), display_width, display_height, "wrote png");
    Ok(())
}
