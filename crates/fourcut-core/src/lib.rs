#![warn(missing_docs)]
//! # fourcut-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `fourcut` workspace.
//!
//! ## Responsibilities
//! - Represent captured or uploaded still frames.
//! - Hold the fixed-size ordered [`CaptureSet`] handed to the compositor.
//! - Mirror camera frames so stored shots match the mirrored live preview.
//! - Decode user-selected image files into frames.
//!
//! ## Data flow
//! The capture sequencer (or the file-upload path) produces [`Frame`] values in
//! shot order. Once exactly [`CAPTURE_COUNT`] frames exist they are sealed into
//! a [`CaptureSet`], which is the only shape the compositor accepts.
//!
//! ## Ownership and lifetimes
//! Frames own their pixel buffers (`Vec<u8>`) so a set can outlive the camera
//! stream or file buffers it came from.
//!
//! ## Error model
//! Shape mismatches, incomplete sets and undecodable files return
//! [`CoreError`] variants.
//!
//! ## Example
//! ```rust
//! use fourcut_core::{CaptureSet, Frame};
//!
//! let frames = (0..4)
//!     .map(|shot| Frame::new(1, 1, vec![shot as u8, 0, 0, 255]).unwrap())
//!     .collect::<Vec<_>>();
//! let set = CaptureSet::seal(frames, 4).expect("four frames seal a set");
//! assert_eq!(set.len(), 4);
//! assert_eq!(set.frames()[3].rgba[0], 3);
//! ```

use thiserror::Error;

/// Number of shots in one photo-booth session.
pub const CAPTURE_COUNT: usize = 4;

/// One still image in RGBA row-major layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFrameShape`] when the pixel buffer length is
    /// not exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CoreError> {
        let expected_len = required_rgba_len(width, height)?;
        if rgba.len() != expected_len {
            return Err(CoreError::InvalidFrameShape {
                expected: expected_len,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Returns a horizontally mirrored copy of this frame.
    ///
    /// Camera previews are shown mirrored to the subject, so captured shots are
    /// flipped the same way before they are stored.
    pub fn mirrored(&self) -> Frame {
        let row_len = self.width as usize * 4;
        let mut rgba = Vec::with_capacity(self.rgba.len());

        if row_len > 0 {
            for row in self.rgba.chunks_exact(row_len) {
                for pixel in row.chunks_exact(4).rev() {
                    rgba.extend_from_slice(pixel);
                }
            }
        }

        Frame {
            width: self.width,
            height: self.height,
            rgba,
        }
    }
}

/// Ordered set of exactly `expected` frames, or no frames at all.
///
/// Partially filled sets are never constructed: producers accumulate frames
/// privately and [`CaptureSet::seal`] them once complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSet {
    frames: Vec<Frame>,
}

impl CaptureSet {
    /// Creates an empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seals a complete, ordered frame list into a set.
    ///
    /// # Errors
    /// Returns [`CoreError::IncompleteCaptureSet`] when `frames.len()` differs
    /// from `expected`, and [`CoreError::InvalidBatchCapacity`] when
    /// `expected == 0`.
    pub fn seal(frames: Vec<Frame>, expected: usize) -> Result<Self, CoreError> {
        if expected == 0 {
            return Err(CoreError::InvalidBatchCapacity);
        }
        if frames.len() != expected {
            return Err(CoreError::IncompleteCaptureSet {
                expected,
                actual: frames.len(),
            });
        }

        Ok(Self { frames })
    }

    /// Drops every frame, returning the set to its empty state.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames in shot order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames held (either zero or the sealed count).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` when no frames are held.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decodes an encoded still image (PNG, JPEG) into an RGBA frame.
///
/// # Errors
/// Returns [`CoreError::Decode`] when the bytes are not a supported image.
pub fn decode_image(encoded: &[u8]) -> Result<Frame, CoreError> {
    let decoded = image::load_from_memory(encoded)
        .map_err(|error| CoreError::Decode(error.to_string()))?
        .to_rgba8();
    let width = decoded.width();
    let height = decoded.height();

    Frame::new(width, height, decoded.into_raw())
}

/// Error type for core domain validation and decoding failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Frame buffer shape does not match declared geometry.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Set capacity must be strictly positive.
    #[error("capture set size must be greater than zero")]
    InvalidBatchCapacity,
    /// A set can only be sealed with exactly the expected frame count.
    #[error("incomplete capture set: expected {expected} frames, got {actual}")]
    IncompleteCaptureSet {
        /// Required frame count.
        expected: usize,
        /// Frames actually supplied.
        actual: usize,
    },
    /// Frame dimensions overflow addressable memory.
    #[error("frame dimensions overflow")]
    Overflow,
    /// Encoded image could not be decoded.
    #[error("image decode failure: {0}")]
    Decode(String),
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(CoreError::Overflow)
}

#[cfg(test)]
mod tests {
    //! Unit tests for frame validation and mirroring.

    use super::*;

    #[test]
    fn rejects_buffer_that_does_not_match_geometry() {
        let error = Frame::new(2, 2, vec![0; 15]).expect_err("short buffer must fail");
        assert!(matches!(
            error,
            CoreError::InvalidFrameShape {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn mirroring_reverses_pixels_within_each_row() {
        let rgba = vec![
            1, 0, 0, 255, 2, 0, 0, 255, 3, 0, 0, 255, // row 0
            4, 0, 0, 255, 5, 0, 0, 255, 6, 0, 0, 255, // row 1
        ];
        let frame = Frame::new(3, 2, rgba).expect("frame should be valid");
        let mirrored = frame.mirrored();

        let reds: Vec<u8> = mirrored.rgba.chunks_exact(4).map(|px| px[0]).collect();
        assert_eq!(reds, vec![3, 2, 1, 6, 5, 4]);
        assert_eq!(mirrored.mirrored(), frame);
    }

    #[test]
    fn seal_rejects_partial_sets() {
        let frames = vec![Frame::new(1, 1, vec![0; 4]).unwrap(); 3];
        assert!(matches!(
            CaptureSet::seal(frames, CAPTURE_COUNT),
            Err(CoreError::IncompleteCaptureSet {
                expected: 4,
                actual: 3
            })
        ));
    }
}
