use std::path::Path;

use crate::shared::frame::Frame;

/// Source of captured frames.
///
/// The pipeline only sees `Frame`s; decoding and enumeration stay in the
/// adapter.
pub trait FrameReader: Send {
    /// Prepares the source and returns how many frames it will yield.
    fn open(&mut self, path: &Path) -> Result<usize, Box<dyn std::error::Error>>;

    /// Frames in capture order. Errors are per frame; the iterator keeps going.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    fn close(&mut self);
}
