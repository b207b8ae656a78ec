#![warn(missing_docs)]
//! # fourcut-compose
//!
//! ## Purpose
//! Composes the vertical four-cut photo strip from a sealed capture set.
//!
//! ## Responsibilities
//! - Map shot-ordered frames onto top-to-bottom photo slots.
//! - Paint the frame style (background and footer ink).
//! - Encode the resulting bitmap as PNG for export.
//!
//! ## Data flow
//! [`fourcut_core::CaptureSet`] + [`FrameStyle`] -> [`compose`] -> [`Bitmap`]
//! -> [`encode_png`] -> download artifact and gallery entry.
//!
//! ## Ownership and lifetimes
//! Composition borrows the set and never mutates it; the output bitmap owns
//! its buffer so it can be re-encoded after the set is cleared.
//!
//! ## Error model
//! Empty sets, malformed frames and encoder failures return [`ComposeError`].
//! Unknown style names are not errors: they fall back to [`FrameStyle::White`].

use std::fmt;
use std::io::Cursor;

use fourcut_core::{CaptureSet, Frame};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

/// Strip width in pixels.
pub const CANVAS_WIDTH: u32 = 500;
/// Outer margin around the photo column.
pub const PADDING: u32 = 20;
/// Vertical gap between two photo slots.
pub const GAP: u32 = 15;
/// Height of the footer band carrying the logo mark.
pub const LOGO_HEIGHT: u32 = 50;
/// Photo slot width.
pub const PHOTO_WIDTH: u32 = CANVAS_WIDTH - PADDING * 2;
/// Photo slot height (4:3).
pub const PHOTO_HEIGHT: u32 = PHOTO_WIDTH / 4 * 3;

const LOGO_MARK_WIDTH: u32 = 180;
const LOGO_MARK_HEIGHT: u32 = 6;

/// Background/ink scheme of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStyle {
    /// White background, near-black ink.
    #[default]
    White,
    /// Near-black background, white ink.
    Black,
}

impl FrameStyle {
    /// Resolves a style name; unknown names fall back to the default style.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "white" => Self::White,
            "black" => Self::Black,
            other => {
                tracing::debug!(stage = "compose", action = "style_fallback", requested = other);
                Self::default()
            }
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Strip background colour.
    pub fn background(self) -> [u8; 4] {
        match self {
            Self::White => [0xff, 0xff, 0xff, 0xff],
            Self::Black => [0x1a, 0x1a, 0x1a, 0xff],
        }
    }

    /// Footer ink colour, contrasting with the background.
    pub fn ink(self) -> [u8; 4] {
        match self {
            Self::White => [0x1a, 0x1a, 0x1a, 0xff],
            Self::Black => [0xff, 0xff, 0xff, 0xff],
        }
    }
}

impl fmt::Display for FrameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composited strip ready for display or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels (always [`CANVAS_WIDTH`]).
    pub width: u32,
    /// Height in pixels, see [`strip_height`].
    pub height: u32,
    /// RGBA bytes in row-major order.
    pub rgba: Vec<u8>,
}

/// Height of a strip holding `frame_count` photos.
pub fn strip_height(frame_count: usize) -> u32 {
    let count = frame_count as u32;
    PADDING * 2 + PHOTO_HEIGHT * count + GAP * count.saturating_sub(1) + LOGO_HEIGHT
}

/// Top edge of photo slot `slot`.
pub fn slot_top(slot: usize) -> u32 {
    PADDING + slot as u32 * (PHOTO_HEIGHT + GAP)
}

/// Composes the photo strip.
///
/// Slot `i` shows frame `i`, scaled to [`PHOTO_WIDTH`] x [`PHOTO_HEIGHT`].
/// Identical inputs always produce identical bitmaps.
///
/// # Errors
/// Returns [`ComposeError::EmptyCaptureSet`] for an empty set and
/// [`ComposeError::InvalidFrame`] when a frame buffer does not match its
/// geometry.
pub fn compose(set: &CaptureSet, style: FrameStyle) -> Result<Bitmap, ComposeError> {
    if set.is_empty() {
        return Err(ComposeError::EmptyCaptureSet);
    }

    let height = strip_height(set.len());
    let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, height, Rgba(style.background()));

    for (slot, frame) in set.frames().iter().enumerate() {
        let tile = scale_to_slot(slot, frame)?;
        imageops::replace(&mut canvas, &tile, i64::from(PADDING), i64::from(slot_top(slot)));
    }

    paint_logo_mark(&mut canvas, style);

    tracing::debug!(
        stage = "compose",
        action = "strip_ready",
        style = style.name(),
        width = CANVAS_WIDTH,
        height
    );
    Ok(Bitmap {
        width: CANVAS_WIDTH,
        height,
        rgba: canvas.into_raw(),
    })
}

/// Encodes a bitmap as PNG bytes.
///
/// # Errors
/// Returns [`ComposeError::Encode`] when the encoder rejects the bitmap.
pub fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>, ComposeError> {
    let buffer = RgbaImage::from_raw(bitmap.width, bitmap.height, bitmap.rgba.clone())
        .ok_or_else(|| ComposeError::Encode("bitmap buffer does not match geometry".to_string()))?;

    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(buffer)
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|error| ComposeError::Encode(error.to_string()))?;
    Ok(encoded.into_inner())
}

fn scale_to_slot(slot: usize, frame: &Frame) -> Result<RgbaImage, ComposeError> {
    let source = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or(ComposeError::InvalidFrame(slot))?;
    if frame.width == 0 || frame.height == 0 {
        return Err(ComposeError::InvalidFrame(slot));
    }

    Ok(imageops::resize(
        &source,
        PHOTO_WIDTH,
        PHOTO_HEIGHT,
        FilterType::Triangle,
    ))
}

fn paint_logo_mark(canvas: &mut RgbaImage, style: FrameStyle) {
    let ink = Rgba(style.ink());
    let left = (CANVAS_WIDTH - LOGO_MARK_WIDTH) / 2;
    let top = canvas.height() - LOGO_HEIGHT / 2 - LOGO_MARK_HEIGHT / 2;

    for y in top..top + LOGO_MARK_HEIGHT {
        for x in left..left + LOGO_MARK_WIDTH {
            canvas.put_pixel(x, y, ink);
        }
    }
}

/// Error type for strip composition and encoding.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Nothing to compose.
    #[error("capture set is empty")]
    EmptyCaptureSet,
    /// Frame at the given slot is malformed.
    #[error("frame {0} cannot be composed")]
    InvalidFrame(usize),
    /// PNG encoding failed.
    #[error("png encoding failed: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for strip composition.

    use fourcut_core::{CAPTURE_COUNT, CaptureSet, Frame};

    use super::*;

    fn solid_set() -> CaptureSet {
        let frames = (0..CAPTURE_COUNT)
            .map(|shot| {
                Frame::new(1, 1, vec![shot as u8 * 40, 0, 0, 255]).expect("frame should be valid")
            })
            .collect();
        CaptureSet::seal(frames, CAPTURE_COUNT).expect("set should seal")
    }

    fn pixel(bitmap: &Bitmap, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * bitmap.width + x) * 4) as usize;
        [
            bitmap.rgba[offset],
            bitmap.rgba[offset + 1],
            bitmap.rgba[offset + 2],
            bitmap.rgba[offset + 3],
        ]
    }

    #[test]
    fn compose_places_shots_top_to_bottom() {
        let bitmap = compose(&solid_set(), FrameStyle::White).expect("strip should compose");
        assert_eq!(bitmap.width, CANVAS_WIDTH);
        assert_eq!(bitmap.height, 1515);

        for slot in 0..CAPTURE_COUNT {
            let inside = pixel(&bitmap, PADDING + 10, slot_top(slot) + 10);
            assert_eq!(inside, [slot as u8 * 40, 0, 0, 255]);
        }
        assert_eq!(pixel(&bitmap, 0, 0), FrameStyle::White.background());
    }

    #[test]
    fn black_style_swaps_background_and_ink() {
        let bitmap = compose(&solid_set(), FrameStyle::Black).expect("strip should compose");
        assert_eq!(pixel(&bitmap, 0, 0), [0x1a, 0x1a, 0x1a, 0xff]);

        let mark_y = bitmap.height - LOGO_HEIGHT / 2;
        assert_eq!(pixel(&bitmap, CANVAS_WIDTH / 2, mark_y), [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn unknown_style_falls_back_to_white() {
        assert_eq!(FrameStyle::from_name("sepia"), FrameStyle::White);
        assert_eq!(FrameStyle::from_name(" Black "), FrameStyle::Black);
    }

    #[test]
    fn compose_rejects_empty_set() {
        assert!(matches!(
            compose(&CaptureSet::empty(), FrameStyle::White),
            Err(ComposeError::EmptyCaptureSet)
        ));
    }
}
