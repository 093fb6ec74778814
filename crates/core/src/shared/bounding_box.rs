use std::fmt;

use serde::{Deserialize, Serialize};

/// Axis-aligned detection box in frame pixel coordinates.
///
/// Produced by a face detector; carries no identity across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Saturates at `i32::MAX` for boxes reaching past the coordinate range.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Overlapping area of two boxes, or `None` when they do not overlap.
    pub fn intersect(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        let clipped = BoundingBox::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1));
        (!clipped.is_empty()).then_some(clipped)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn frame_box() -> BoundingBox {
        BoundingBox::new(0, 0, 100, 80)
    }

    #[test]
    fn test_edges() {
        let b = BoundingBox::new(10, 20, 30, 40);
        assert_eq!(b.right(), 40);
        assert_eq!(b.bottom(), 60);
    }

    #[rstest]
    #[case::inside(BoundingBox::new(10, 10, 20, 20), true)]
    #[case::same(BoundingBox::new(0, 0, 100, 80), true)]
    #[case::touching_right(BoundingBox::new(80, 0, 20, 10), true)]
    #[case::negative_x(BoundingBox::new(-1, 0, 20, 10), false)]
    #[case::past_bottom(BoundingBox::new(0, 70, 20, 11), false)]
    fn test_contains(#[case] inner: BoundingBox, #[case] expected: bool) {
        assert_eq!(frame_box().contains(&inner), expected);
    }

    #[test]
    fn test_intersect_partial() {
        let clipped = frame_box()
            .intersect(&BoundingBox::new(-10, 60, 50, 50))
            .unwrap();
        assert_eq!(clipped, BoundingBox::new(0, 60, 40, 20));
    }

    #[test]
    fn test_intersect_disjoint_is_none() {
        assert!(frame_box()
            .intersect(&BoundingBox::new(200, 200, 10, 10))
            .is_none());
    }

    #[test]
    fn test_intersect_touching_edges_is_none() {
        assert!(frame_box()
            .intersect(&BoundingBox::new(100, 0, 10, 10))
            .is_none());
    }

    #[rstest]
    #[case::zero_width(BoundingBox::new(0, 0, 0, 10))]
    #[case::negative_height(BoundingBox::new(0, 0, 10, -1))]
    fn test_is_empty(#[case] b: BoundingBox) {
        assert!(b.is_empty());
    }

    #[test]
    fn test_edges_saturate_for_huge_boxes() {
        let huge = BoundingBox::new(10, -5, i32::MAX, i32::MAX);
        assert_eq!(huge.right(), i32::MAX);
        assert!(!frame_box().contains(&huge));
        assert_eq!(
            frame_box().intersect(&huge).unwrap(),
            BoundingBox::new(10, 0, 90, 80)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(BoundingBox::new(5, 6, 70, 80).to_string(), "70x80+5+6");
    }
}
