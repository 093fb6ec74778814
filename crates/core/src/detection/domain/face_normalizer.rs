use std::ops::Deref;

use crate::shared::constants::NORMALIZED_SIZE;
use crate::shared::error::CoreError;
use crate::shared::frame::Frame;

/// A face crop resampled to `NORMALIZED_SIZE`² RGB pixels.
///
/// Only [`normalize`] builds one, so the size and channel count hold for
/// every value of this type.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedImage(Frame);

impl NormalizedImage {
    pub fn frame(&self) -> &Frame {
        &self.0
    }

    pub fn into_frame(self) -> Frame {
        self.0
    }
}

impl Deref for NormalizedImage {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.0
    }
}

/// Resamples a face crop to `NORMALIZED_SIZE`² with nearest-neighbour sampling.
///
/// Each output pixel copies the source pixel under its center, so blocky
/// upscaling artifacts are preserved exactly; the classifier was tuned
/// on images resampled this way. Alpha is dropped.
pub fn normalize(region: &Frame) -> Result<NormalizedImage, CoreError> {
    if region.is_empty() {
        return Err(CoreError::invalid("cannot normalize an empty region"));
    }

    let size = NORMALIZED_SIZE as usize;
    let src = region.as_ndarray();
    let (src_h, src_w) = (src.shape()[0], src.shape()[1]);

    let cols: Vec<usize> = (0..size).map(|x| nearest(x, src_w, size)).collect();
    let mut data = Vec::with_capacity(size * size * 3);
    for y in 0..size {
        let sy = nearest(y, src_h, size);
        for &sx in &cols {
            for c in 0..3 {
                data.push(src[[sy, sx, c]]);
            }
        }
    }

    Ok(NormalizedImage(Frame::new(
        data,
        NORMALIZED_SIZE,
        NORMALIZED_SIZE,
        3,
        region.index(),
    )))
}

/// Source index whose pixel center is nearest to output pixel `dst`.
fn nearest(dst: usize, src_len: usize, dst_len: usize) -> usize {
    let pos = (dst as f64 + 0.5) * src_len as f64 / dst_len as f64;
    (pos as usize).min(src_len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn gradient(w: u32, h: u32, channels: u8) -> Frame {
        let mut data = Vec::new();
        for y in 0..h {
            for x in 0..w {
                data.push((x * 255 / w.max(1)) as u8);
                data.push((y * 255 / h.max(1)) as u8);
                data.push(77);
                if channels == 4 {
                    data.push(10);
                }
            }
        }
        Frame::new(data, w, h, channels, 9)
    }

    #[rstest]
    #[case::single_pixel(1, 1)]
    #[case::small(7, 5)]
    #[case::exact(224, 224)]
    #[case::large(640, 480)]
    #[case::tall(3, 900)]
    fn test_output_is_always_224_rgb(#[case] w: u32, #[case] h: u32) {
        let out = normalize(&gradient(w, h, 3)).unwrap();
        assert_eq!(out.width(), NORMALIZED_SIZE);
        assert_eq!(out.height(), NORMALIZED_SIZE);
        assert_eq!(out.channels(), 3);
        assert_eq!(out.data().len(), 224 * 224 * 3);
    }

    #[test]
    fn test_single_pixel_fills_output() {
        let src = Frame::new(vec![12, 34, 56], 1, 1, 3, 0);
        let out = normalize(&src).unwrap();
        assert!(out.rgb_pixels().all(|px| px == [12, 34, 56]));
    }

    #[test]
    fn test_rgba_input_drops_alpha() {
        let out = normalize(&gradient(10, 10, 4)).unwrap();
        assert_eq!(out.channels(), 3);
        assert_eq!(out.rgb_at(0, 0), [0, 0, 77]);
    }

    #[test]
    fn test_same_size_is_identity() {
        let src = gradient(224, 224, 3);
        let out = normalize(&src).unwrap();
        assert_eq!(out.data(), src.data());
    }

    #[test]
    fn test_upscale_repeats_source_pixels() {
        // 2x2 → each source pixel becomes a 112x112 block
        let src = Frame::new(
            vec![
                255, 0, 0, /**/ 0, 255, 0, //
                0, 0, 255, /**/ 255, 255, 255,
            ],
            2,
            2,
            3,
            0,
        );
        let out = normalize(&src).unwrap();
        assert_eq!(out.rgb_at(0, 0), [255, 0, 0]);
        assert_eq!(out.rgb_at(111, 111), [255, 0, 0]);
        assert_eq!(out.rgb_at(112, 0), [0, 255, 0]);
        assert_eq!(out.rgb_at(0, 112), [0, 0, 255]);
        assert_eq!(out.rgb_at(223, 223), [255, 255, 255]);
    }

    #[test]
    fn test_output_only_contains_source_colors() {
        let src = gradient(37, 19, 3);
        let palette: std::collections::HashSet<[u8; 3]> = src.rgb_pixels().collect();
        let out = normalize(&src).unwrap();
        assert!(out.rgb_pixels().all(|px| palette.contains(&px)));
    }

    #[test]
    fn test_repeated_calls_are_bit_identical() {
        let src = gradient(123, 77, 3);
        let a = normalize(&src).unwrap();
        let b = normalize(&src).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keeps_frame_index() {
        let out = normalize(&gradient(5, 5, 3)).unwrap();
        assert_eq!(out.index(), 9);
    }

    #[test]
    fn test_empty_region_is_invalid() {
        let src = Frame::new(Vec::new(), 0, 4, 3, 0);
        assert!(matches!(normalize(&src), Err(CoreError::InvalidInput(_))));
    }
}
