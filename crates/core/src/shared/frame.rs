use ndarray::ArrayView3;

use super::bounding_box::BoundingBox;

/// A single captured frame: contiguous 8-bit pixels in row-major order.
///
/// Frames carry either 3 (RGB) or 4 (RGBA) channels. Format conversion
/// happens at I/O boundaries only.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// RGB triplet at `(x, y)`; any alpha channel is ignored.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    /// Iterates pixels as RGB triplets in row-major order, dropping alpha.
    pub fn rgb_pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data
            .chunks_exact(self.channels as usize)
            .map(|px| [px[0], px[1], px[2]])
    }

    /// Copies the pixels inside `region` into a new frame.
    ///
    /// The caller guarantees `region` lies inside the frame.
    pub fn crop(&self, region: &BoundingBox) -> Frame {
        let ch = self.channels as usize;
        let x = region.x as usize;
        let w = region.width as usize;
        let stride = self.width as usize * ch;

        let mut data = Vec::with_capacity(w * region.height as usize * ch);
        for row in region.y as usize..(region.y + region.height) as usize {
            let start = row * stride + x * ch;
            data.extend_from_slice(&self.data[start..start + w * ch]);
        }
        Frame::new(
            data,
            region.width as u32,
            region.height as u32,
            self.channels,
            self.index,
        )
    }

    /// Full-frame box, for bounds checks.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
