//! Frame capture and GIF generation for mask animation

use std::path::Path;

use image::{Delay, Frame, RgbaImage};

use crate::io::configuration::VIEWER_MIN_FRAME_DELAY_MS;
use crate::io::error::{EffectError, Result, invalid_parameter};
use crate::io::image::{ensure_parent, surface_to_rgba};
use crate::mask::surface::MaskSurface;

const BACKGROUND: [u8; 3] = [0, 0, 0];

/// Records composited surfaces tick by tick
///
/// Frames are rendered when captured, so the effect can keep mutating its
/// surface afterwards.
#[derive(Debug, Default)]
pub struct FrameCapture {
    frames: Vec<RgbaImage>,
}

impl FrameCapture {
    /// Capture with room for `expected` frames
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            frames: Vec::with_capacity(expected),
        }
    }

    /// Snapshot the current surface as a frame
    pub fn record(&mut self, surface: &MaskSurface) {
        self.frames.push(surface_to_rgba(surface, BACKGROUND));
    }

    /// Number of captured frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Export the captured frames as a GIF with automatic frame skipping
    ///
    /// Delays shorter than viewers support are raised to
    /// [`VIEWER_MIN_FRAME_DELAY_MS`] and frames are dropped proportionally so the
    /// apparent speed is kept. The last frame is held longer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No frames were captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(&self, output_path: &Path, frame_delay_ms: u32) -> Result<()> {
        if self.frames.is_empty() {
            return Err(invalid_parameter(
                "frames",
                &0,
                &"no frames captured for animation",
            ));
        }

        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms.max(1)) as usize
        } else {
            1
        };

        let delay = Delay::from_numer_denom_ms(effective_delay_ms, 1);
        let mut frames: Vec<Frame> = self
            .frames
            .iter()
            .step_by(skip_factor)
            .map(|img| Frame::from_parts(img.clone(), 0, 0, delay))
            .collect();
        if let Some(last) = self.frames.last() {
            frames.push(Frame::from_parts(
                last.clone(),
                0,
                0,
                Delay::from_numer_denom_ms(effective_delay_ms * 25, 1),
            ));
        }

        ensure_parent(output_path)?;
        let file = std::fs::File::create(output_path).map_err(|e| EffectError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| EffectError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })
    }
}
