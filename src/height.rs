use serde::{Deserialize, Serialize};

use crate::keypoint::{BodyPart, KeypointSet};
use crate::scale::ScaleEstimate;
use crate::types::{Measurement, Reason};

/// Vertical extent of a standing person in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelHeight {
    /// Topmost confident head keypoint (nose, eyes, ears)
    pub head_y: f32,
    /// Lowest confident heel keypoint
    pub heel_y: f32,
    pub pixels: f32,
}

/// Topmost confident head y and lowest confident heel y.
///
/// Either side with no keypoint above `threshold` is reported by reason.
pub fn head_and_heel(keypoints: &KeypointSet, threshold: f32) -> Result<(f32, f32), Reason> {
    let head_y = keypoints
        .confident(threshold, BodyPart::is_head)
        .map(|k| k.y)
        .filter(|y| y.is_finite())
        .reduce(f32::min)
        .ok_or(Reason::NoHeadKeypoints)?;
    let heel_y = keypoints
        .confident(threshold, BodyPart::is_heel)
        .map(|k| k.y)
        .filter(|y| y.is_finite())
        .reduce(f32::max)
        .ok_or(Reason::NoHeelKeypoints)?;
    Ok((head_y, heel_y))
}

/// Measure head-to-heel height in pixels for one body.
pub fn measure_pixel_height(keypoints: &KeypointSet, threshold: f32) -> Measurement<PixelHeight> {
    let (head_y, heel_y) = match head_and_heel(keypoints, threshold) {
        Ok(ys) => ys,
        Err(reason) => return Measurement::Unavailable(reason),
    };

    // inverted or overflowing spans are both unusable
    Measurement::positive(heel_y - head_y, Reason::InvertedHeight).map(|pixels| PixelHeight {
        head_y,
        heel_y,
        pixels,
    })
}

/// Physical height in centimetres from a pixel height and the same person's scale.
pub fn physical_height_cm(
    height: &Measurement<PixelHeight>,
    scale: &ScaleEstimate,
) -> Measurement<f32> {
    match height {
        Measurement::Available(h) => scale.to_mm(h.pixels).map(|mm| mm / 10.0),
        Measurement::Unavailable(reason) => Measurement::Unavailable(*reason),
    }
}
