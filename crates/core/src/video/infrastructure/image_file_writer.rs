use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes frames with the `image` crate; the format follows the file extension.
///
/// Resizing uses nearest-neighbour so dumped faces keep the exact pixels
/// that were clustered.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_image(frame: &Frame) -> Result<DynamicImage, Box<dyn std::error::Error>> {
    let data = frame.data().to_vec();
    let img = match frame.channels() {
        3 => image::RgbImage::from_raw(frame.width(), frame.height(), data)
            .map(DynamicImage::ImageRgb8),
        4 => image::RgbaImage::from_raw(frame.width(), frame.height(), data)
            .map(DynamicImage::ImageRgba8),
        n => return Err(format!("cannot write a {n}-channel frame").into()),
    };
    img.ok_or_else(|| "Failed to create image from frame data".into())
}

impl ImageWriter for ImageFileWriter {
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut img = to_image(frame)?;
        if let Some((w, h)) = size {
            img = img.resize_exact(w, h, FilterType::Nearest);
        }

        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, channels: u8, px: &[u8]) -> Frame {
        let data = px.repeat((width * height) as usize);
        assert_eq!(px.len(), channels as usize);
        Frame::new(data, width, height, channels, 0)
    }

    #[test]
    fn test_rgb_frame_keeps_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces").join("face_0.png");
        ImageFileWriter::new()
            .write(&path, &solid(20, 10, 3, &[50, 100, 200]), None)
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (20, 10));
        assert_eq!(img.get_pixel(3, 4).0, [50, 100, 200]);
    }

    #[test]
    fn test_rgba_frame_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        ImageFileWriter::new()
            .write(&path, &solid(4, 4, 4, &[1, 2, 3, 128]), None)
            .unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 128]);
    }

    #[test]
    fn test_resize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        ImageFileWriter::new()
            .write(&path, &solid(224, 224, 3, &[9, 8, 7]), Some((64, 32)))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (64, 32));
        assert_eq!(img.get_pixel(63, 31).0, [9, 8, 7]);
    }

    #[test]
    fn test_unsupported_channel_count_errors() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(vec![0; 4], 2, 2, 1, 0);
        assert!(ImageFileWriter::new()
            .write(&dir.path().join("gray.png"), &frame, None)
            .is_err());
    }
}
