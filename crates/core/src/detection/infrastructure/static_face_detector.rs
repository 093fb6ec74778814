use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Reports the same caller-supplied boxes for every frame.
///
/// Stands in for an external cascade detector when face positions are
/// already known (fixed camera rigs, annotated images).
pub struct StaticFaceDetector {
    boxes: Vec<BoundingBox>,
}

impl StaticFaceDetector {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }
}

impl FaceDetector for StaticFaceDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        Ok(self.boxes.clone())
    }
}

/// Parses `x,y,w,h` into a box.
pub fn parse_box(spec: &str) -> Result<BoundingBox, String> {
    let parts: Vec<i32> = spec
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid box '{spec}': {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] if *w > 0 && *h > 0 => Ok(BoundingBox::new(*x, *y, *w, *h)),
        [_, _, _, _] => Err(format!("box '{spec}' must have positive width and height")),
        _ => Err(format!("box '{spec}' must be x,y,w,h")),
    }
}
