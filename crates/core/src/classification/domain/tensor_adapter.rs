use ndarray::Array4;
use serde::{Deserialize, Serialize};

use crate::detection::domain::face_normalizer::NormalizedImage;

/// Row traversal used when flattening the image into the tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// Last image row first; the layout the bundled classifier was trained on.
    #[default]
    BottomUp,
    TopDown,
}

/// Builds the `(1, H, W, 3)` classifier input, channels rescaled to `[-1, 1]`.
///
/// Each channel becomes `(v / 255 - 0.5) * 2`; tensor row 0 is the image
/// row selected by `order`.
pub fn to_tensor(image: &NormalizedImage, order: RowOrder) -> Array4<f32> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let mut tensor = Array4::<f32>::zeros((1, h, w, 3));

    for row in 0..h {
        let src_y = match order {
            RowOrder::BottomUp => h - 1 - row,
            RowOrder::TopDown => row,
        };
        for x in 0..w {
            let px = image.rgb_at(x as u32, src_y as u32);
            for c in 0..3 {
                tensor[[0, row, x, c]] = (px[c] as f32 / 255.0 - 0.5) * 2.0;
            }
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_normalizer::normalize;
    use crate::shared::frame::Frame;
    use approx::assert_relative_eq;

    /// Top half black, bottom half white, 2x2 before normalization.
    fn split_image() -> NormalizedImage {
        let frame = Frame::new(
            vec![0, 0, 0, 0, 0, 0, 255, 255, 255, 255, 255, 255],
            2,
            2,
            3,
            0,
        );
        normalize(&frame).unwrap()
    }

    #[test]
    fn test_shape_is_nhwc() {
        let tensor = to_tensor(&split_image(), RowOrder::BottomUp);
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_values_rescaled_to_unit_range() {
        let tensor = to_tensor(&split_image(), RowOrder::TopDown);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], -1.0);
        assert_relative_eq!(tensor[[0, 223, 0, 0]], 1.0);
        assert!(tensor.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_mid_gray_maps_near_zero() {
        let frame = Frame::new(vec![128, 64, 191], 1, 1, 3, 0);
        let tensor = to_tensor(&normalize(&frame).unwrap(), RowOrder::BottomUp);
        assert_relative_eq!(tensor[[0, 5, 5, 0]], (128.0 / 255.0 - 0.5) * 2.0);
        assert_relative_eq!(tensor[[0, 5, 5, 1]], (64.0 / 255.0 - 0.5) * 2.0);
        assert_relative_eq!(tensor[[0, 5, 5, 2]], (191.0 / 255.0 - 0.5) * 2.0);
    }

    #[test]
    fn test_bottom_up_starts_with_last_row() {
        let tensor = to_tensor(&split_image(), RowOrder::BottomUp);
        // first tensor row is the white bottom of the image
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_relative_eq!(tensor[[0, 223, 0, 0]], -1.0);
    }

    #[test]
    fn test_orders_are_vertical_mirrors() {
        let image = split_image();
        let up = to_tensor(&image, RowOrder::BottomUp);
        let down = to_tensor(&image, RowOrder::TopDown);
        for row in 0..224 {
            assert_eq!(up[[0, row, 17, 1]], down[[0, 223 - row, 17, 1]]);
        }
    }
}
