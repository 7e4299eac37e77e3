use serde::{Deserialize, Serialize};

use crate::config::FaceConfig;
use crate::keypoint::{BodyPart, KeypointSet};
use crate::types::{BoundingBox, Point};

/// Expansion applied to a whole-body keypoint box before face detection.
const PERSON_EXPAND: f32 = 1.25;

/// Face-mesh landmarks in normalized [0,1] coordinates of the region they
/// were detected in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Selected landmarks mapped into image coordinates through `region`.
    ///
    /// `None` if any index is out of range for this landmark set.
    pub fn select_in_image(&self, indices: &[usize], region: &BoundingBox) -> Option<Vec<Point>> {
        indices
            .iter()
            .map(|&i| self.points.get(i).map(|p| region.denormalize_point(*p)))
            .collect()
    }
}

/// Tight box around keypoints passing `filter` with confidence above `threshold`.
///
/// Fewer than two qualifying keypoints gives `None`.
fn keypoint_box<F>(keypoints: &KeypointSet, threshold: f32, filter: F) -> Option<BoundingBox>
where
    F: Fn(BodyPart) -> bool + 'static,
{
    let points: Vec<Point> = keypoints
        .confident(threshold, filter)
        .map(|k| k.position())
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if points.len() < 2 {
        return None;
    }
    BoundingBox::from_points(&points)
}

/// Grow `bbox` about its centre by `expand`, then widen or heighten it to
/// `aspect` (height / width), then clip to the image.
fn expand_to_aspect(
    bbox: &BoundingBox,
    expand: f32,
    aspect: f32,
    width: u32,
    height: u32,
) -> BoundingBox {
    let center = bbox.center();
    let mut w = bbox.width * expand;
    let mut h = bbox.height * expand;

    if h / w.max(f32::EPSILON) < aspect {
        h = w * aspect;
    } else {
        w = h / aspect;
    }

    BoundingBox::new(center.x - w / 2.0, center.y - h / 2.0, w, h).clip(width, height)
}

/// Estimate a face box from a person's nose, eye and ear keypoints.
pub fn face_box_from_keypoints(
    keypoints: &KeypointSet,
    threshold: f32,
    config: &FaceConfig,
    width: u32,
    height: u32,
) -> Option<BoundingBox> {
    let head = keypoint_box(keypoints, threshold, BodyPart::is_head)?;
    let face = expand_to_aspect(&head, config.expand, config.aspect, width, height);
    (!face.is_empty()).then_some(face)
}

/// Box around all of a person's confident keypoints, expanded and clipped.
/// This is the crop handed to a dedicated face locator.
pub fn person_box_from_keypoints(
    keypoints: &KeypointSet,
    threshold: f32,
    width: u32,
    height: u32,
) -> Option<BoundingBox> {
    let body = keypoint_box(keypoints, threshold, |_| true)?;
    let center = body.center();
    let w = body.width * PERSON_EXPAND;
    let h = body.height * PERSON_EXPAND;
    let person = BoundingBox::new(center.x - w / 2.0, center.y - h / 2.0, w, h).clip(width, height);
    (!person.is_empty()).then_some(person)
}

/// Padded box around one eye's iris points, clipped to the image.
pub fn eye_box(
    iris_points: &[Point],
    padding: f32,
    width: u32,
    height: u32,
) -> Option<BoundingBox> {
    let eye = BoundingBox::from_points(iris_points)?.padded(padding).clip(width, height);
    (!eye.is_empty()).then_some(eye)
}
