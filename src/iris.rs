//! Iris diameter estimation from iris-boundary landmarks.
//!
//! The preferred estimate fits the four boundary points to a circle about
//! their centroid. When the points are not circular enough the estimate
//! falls back to a three-point chord construction, which always yields a
//! number but is less reliable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Measurement, Point, Reason};

/// Number of landmarks in the refined face mesh.
pub const FACE_MESH_LANDMARKS: usize = 478;

/// Boundary landmarks of the subject's left iris in the refined face mesh.
pub const LEFT_IRIS: [usize; 4] = [469, 470, 471, 472];

/// Boundary landmarks of the subject's right iris in the refined face mesh.
pub const RIGHT_IRIS: [usize; 4] = [474, 475, 476, 477];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    /// Four points on a near-circle
    High,
    /// Three-point fallback
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrisDiameter {
    pub diameter_px: f32,
    pub quality: FitQuality,
}

/// Circle fit over four boundary points.
///
/// Returns twice the mean centroid distance when the population standard
/// deviation of those distances is below `tolerance`, otherwise `None`.
pub fn diameter_4p(points: &[Point; 4], tolerance: f32) -> Option<f32> {
    let center = Point::centroid(points)?;
    let distances = (*points).map(|p| p.distance(&center));
    let mean = distances.iter().sum::<f32>() / 4.0;
    let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / 4.0;
    let std_dev = variance.sqrt();

    if std_dev < tolerance {
        Some(mean * 2.0)
    } else {
        debug!(std_dev, tolerance, "iris points not circular");
        None
    }
}

/// Chord estimate from two horizontal extremes and one vertical point.
///
/// Averages the horizontal chord with twice the distance from the chord's
/// midpoint to the vertical point.
pub fn diameter_3p(left: Point, right: Point, vertical: Point) -> f32 {
    let horizontal = left.distance(&right);
    let vertical = right.midpoint(&left).distance(&vertical) * 2.0;
    (horizontal + vertical) / 2.0
}

/// Estimate one iris diameter from its boundary points.
///
/// Four points (or more; extras are ignored) try the circle fit first and
/// fall back to the chord estimate using points 0, 2 and 3. Exactly three
/// points go straight to the chord estimate. A zero or non-finite result is
/// reported as degenerate rather than returned.
pub fn estimate_diameter(points: &[Point], tolerance: f32) -> Measurement<IrisDiameter> {
    let estimate = match points {
        [a, b, c, d, ..] => match diameter_4p(&[*a, *b, *c, *d], tolerance) {
            Some(diameter_px) => IrisDiameter {
                diameter_px,
                quality: FitQuality::High,
            },
            None => {
                debug!("falling back to three-point iris estimate");
                IrisDiameter {
                    diameter_px: diameter_3p(*a, *c, *d),
                    quality: FitQuality::Low,
                }
            }
        },
        [a, b, c] => IrisDiameter {
            diameter_px: diameter_3p(*a, *b, *c),
            quality: FitQuality::Low,
        },
        _ => return Measurement::Unavailable(Reason::TooFewIrisPoints),
    };

    Measurement::positive(estimate.diameter_px, Reason::DegenerateDiameter).map(|_| estimate)
}
