use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::frame_reader::FrameReader;

/// Reads still images as a capture sequence.
///
/// A file path is a one-frame sequence. A directory yields every image file
/// it contains, sorted by file name, so numbered snapshots replay in order.
/// Decoding is lazy, one image per `frames()` step.
pub struct ImageFileReader {
    paths: Option<Vec<PathBuf>>,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self { paths: None }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Decodes to RGB, or RGBA when the source carries alpha.
fn decode(path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let (width, height) = (img.width(), img.height());
    let frame = if img.color().has_alpha() {
        Frame::new(img.into_rgba8().into_raw(), width, height, 4, index)
    } else {
        Frame::new(img.into_rgb8().into_raw(), width, height, 3, index)
    };
    Ok(frame)
}

impl FrameReader for ImageFileReader {
    fn open(&mut self, path: &Path) -> Result<usize, Box<dyn std::error::Error>> {
        let paths = if path.is_dir() {
            list_images(path)?
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(format!("input not found: {}", path.display()).into());
        };
        if paths.is_empty() {
            return Err(format!("no images in {}", path.display()).into());
        }
        log::debug!("opened {} with {} frames", path.display(), paths.len());
        let count = paths.len();
        self.paths = Some(paths);
        Ok(count)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.paths.take() {
            Some(paths) => Box::new(
                paths
                    .into_iter()
                    .enumerate()
                    .map(|(index, path)| decode(&path, index)),
            ),
            None => Box::new(std::iter::once(Err("ImageFileReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.paths = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_rgb(path: &Path, width: u32, height: u32, px: [u8; 3]) {
        image::RgbImage::from_pixel(width, height, image::Rgb(px))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_single_file_yields_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        write_rgb(&path, 100, 80, [50, 100, 200]);

        let mut reader = ImageFileReader::new();
        assert_eq!(reader.open(&path).unwrap(), 1);

        let frames: Vec<_> = reader.frames().collect();
        assert_eq!(frames.len(), 1);
        let frame = frames.into_iter().next().unwrap().unwrap();
        assert_eq!(frame.index(), 0);
        assert_eq!((frame.width(), frame.height(), frame.channels()), (100, 80, 3));
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_directory_yields_images_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_rgb(&dir.path().join("frame_002.png"), 4, 4, [2, 2, 2]);
        write_rgb(&dir.path().join("frame_001.png"), 4, 4, [1, 1, 1]);
        write_rgb(&dir.path().join("frame_003.PNG"), 4, 4, [3, 3, 3]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut reader = ImageFileReader::new();
        assert_eq!(reader.open(dir.path()).unwrap(), 3);

        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();
        let firsts: Vec<u8> = frames.iter().map(|f| f.data()[0]).collect();
        let indices: Vec<usize> = frames.iter().map(|f| f.index()).collect();
        assert_eq!(firsts, vec![1, 2, 3]);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_alpha_image_is_four_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 40]))
            .save(&path)
            .unwrap();

        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();
        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(frame.channels(), 4);
        assert_eq!(&frame.data()[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_open_nonexistent_errors() {
        let mut reader = ImageFileReader::new();
        assert!(reader.open(Path::new("/nonexistent/cat.png")).is_err());
    }

    #[test]
    fn test_open_empty_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = ImageFileReader::new();
        assert!(reader.open(dir.path()).is_err());
    }

    #[test]
    fn test_undecodable_file_errors_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"not a png").unwrap();
        write_rgb(&dir.path().join("b.png"), 2, 2, [9, 9, 9]);

        let mut reader = ImageFileReader::new();
        reader.open(dir.path()).unwrap();
        let frames: Vec<_> = reader.frames().collect();
        assert!(frames[0].is_err());
        assert_eq!(frames[1].as_ref().unwrap().index(), 1);
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = ImageFileReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        write_rgb(&path, 2, 2, [0, 0, 0]);
        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
