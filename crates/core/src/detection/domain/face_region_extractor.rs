use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::CoreError;
use crate::shared::frame::Frame;

/// What to do when the enlarged face box reaches past the frame edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropPolicy {
    /// Fail with [`CoreError::OutOfBounds`].
    #[default]
    Strict,
    /// Shrink the crop to the part inside the frame.
    Clamp,
}

impl fmt::Display for CropPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropPolicy::Strict => write!(f, "strict"),
            CropPolicy::Clamp => write!(f, "clamp"),
        }
    }
}

impl FromStr for CropPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(CropPolicy::Strict),
            "clamp" => Ok(CropPolicy::Clamp),
            other => Err(format!(
                "crop policy must be 'strict' or 'clamp', got '{other}'"
            )),
        }
    }
}

/// Grows a detector box by 20% to take in ears and forehead.
///
/// `delta = ceil(width / 10)`; the box moves left by `delta` and up by
/// `2 * delta` (detectors tend to cut the top of the head), and both sides
/// become `trunc(side * 1.2)`. Integer arithmetic keeps the result exact.
/// Returns `None` when the enlarged box does not fit `i32` coordinates.
pub fn enlarge(bbox: &BoundingBox) -> Option<BoundingBox> {
    let (x, y) = (i64::from(bbox.x), i64::from(bbox.y));
    let (w, h) = (i64::from(bbox.width), i64::from(bbox.height));
    let delta = (w + 9).div_euclid(10);
    Some(BoundingBox::new(
        i32::try_from(x - delta).ok()?,
        i32::try_from(y - 2 * delta).ok()?,
        i32::try_from(w * 6 / 5).ok()?,
        i32::try_from(h * 6 / 5).ok()?,
    ))
}

/// Crops the enlarged face at `boxes[index]` out of `source`.
pub fn extract_face(
    boxes: &[BoundingBox],
    source: &Frame,
    index: usize,
    policy: CropPolicy,
) -> Result<Frame, CoreError> {
    if boxes.is_empty() {
        return Err(CoreError::DetectionEmpty);
    }
    let bbox = boxes.get(index).ok_or_else(|| {
        CoreError::invalid(format!(
            "face index {index} out of range for {} detections",
            boxes.len()
        ))
    })?;
    if bbox.is_empty() {
        return Err(CoreError::invalid(format!("degenerate face box {bbox}")));
    }

    let enlarged = enlarge(bbox).ok_or(CoreError::OutOfBounds {
        region: *bbox,
        frame_width: source.width(),
        frame_height: source.height(),
    })?;
    let region = crop_region(&enlarged, source, policy)?;
    log::debug!("face {index}: {bbox} enlarged to {enlarged}, cropping {region}");
    Ok(source.crop(&region))
}

fn crop_region(
    enlarged: &BoundingBox,
    source: &Frame,
    policy: CropPolicy,
) -> Result<BoundingBox, CoreError> {
    let frame = source.bounds();
    let out_of_bounds = || CoreError::OutOfBounds {
        region: *enlarged,
        frame_width: source.width(),
        frame_height: source.height(),
    };
    match policy {
        CropPolicy::Strict if frame.contains(enlarged) => Ok(*enlarged),
        CropPolicy::Strict => Err(out_of_bounds()),
        CropPolicy::Clamp => frame.intersect(enlarged).ok_or_else(out_of_bounds),
    }
}
