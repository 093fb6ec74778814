use thiserror::Error;

use super::bounding_box::BoundingBox;

/// Errors raised by the face extraction and color clustering core.
///
/// All variants are local to one capture cycle; the caller skips the
/// cycle and retries on the next frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("crop region {region} exceeds frame {frame_width}x{frame_height}")]
    OutOfBounds {
        region: BoundingBox,
        frame_width: u32,
        frame_height: u32,
    },
    #[error("no face detected")]
    DetectionEmpty,
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidInput(message.into())
    }

    /// Whether the pipeline should skip the current cycle instead of failing.
    pub fn skips_cycle(&self) -> bool {
        matches!(
            self,
            CoreError::DetectionEmpty | CoreError::OutOfBounds { .. }
        )
    }
}
