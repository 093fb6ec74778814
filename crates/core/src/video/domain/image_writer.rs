use std::path::Path;

use crate::shared::frame::Frame;

/// Persists a frame as an image (debug dumps of normalized faces).
pub trait ImageWriter: Send {
    /// `size` rescales the output; `None` keeps the frame's dimensions.
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
