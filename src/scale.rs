use serde::{Deserialize, Serialize};

use crate::config::ScaleConfig;
use crate::iris::IrisDiameter;
use crate::types::{Measurement, Reason};

/// Pixel-to-millimetre scale derived from both irises of one person.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleEstimate {
    pub left: Measurement<IrisDiameter>,
    pub right: Measurement<IrisDiameter>,
    pub mean_diameter_px: Measurement<f32>,
    pub mm_per_pixel: Measurement<f32>,
    /// |left - right| as a percentage of the mean; reported, never acted on
    pub asymmetry_pct: Measurement<f32>,
}

impl ScaleEstimate {
    /// Every field unavailable for the same reason.
    pub fn unavailable(reason: Reason) -> Self {
        Self {
            left: Measurement::Unavailable(reason),
            right: Measurement::Unavailable(reason),
            mean_diameter_px: Measurement::Unavailable(reason),
            mm_per_pixel: Measurement::Unavailable(reason),
            asymmetry_pct: Measurement::Unavailable(reason),
        }
    }

    pub fn left_diameter_px(&self) -> Option<f32> {
        self.left.value().map(|d| d.diameter_px)
    }

    pub fn right_diameter_px(&self) -> Option<f32> {
        self.right.value().map(|d| d.diameter_px)
    }

    /// Convert a pixel length to millimetres.
    pub fn to_mm(&self, pixels: f32) -> Measurement<f32> {
        self.mm_per_pixel
            .and_then(|scale| Measurement::positive(pixels * scale, Reason::ScaleUnavailable))
    }
}

/// Combine left and right iris diameters into a scale.
///
/// Both eyes must have a positive diameter; otherwise the scale is
/// unavailable rather than infinite or zero.
pub fn calibrate(
    left: Measurement<IrisDiameter>,
    right: Measurement<IrisDiameter>,
    config: &ScaleConfig,
) -> ScaleEstimate {
    let pair = match (&left, &right) {
        (Measurement::Available(l), Measurement::Available(r))
            if l.diameter_px > 0.0 && r.diameter_px > 0.0 =>
        {
            Some((l.diameter_px, r.diameter_px))
        }
        _ => None,
    };

    let Some((l, r)) = pair else {
        let reason = left
            .reason()
            .or(right.reason())
            .unwrap_or(Reason::DegenerateDiameter);
        return ScaleEstimate {
            left,
            right,
            mean_diameter_px: Measurement::Unavailable(reason),
            mm_per_pixel: Measurement::Unavailable(reason),
            asymmetry_pct: Measurement::Unavailable(reason),
        };
    };

    let mean = (l + r) / 2.0;
    let mm_per_pixel = (config.iris_diameter_mm / mean) * config.calibration_factor;
    let asymmetry = (l - r).abs() / mean * 100.0;

    ScaleEstimate {
        left,
        right,
        mean_diameter_px: Measurement::positive(mean, Reason::DegenerateDiameter),
        mm_per_pixel: Measurement::positive(mm_per_pixel, Reason::DegenerateDiameter),
        asymmetry_pct: if asymmetry.is_finite() {
            Measurement::Available(asymmetry)
        } else {
            Measurement::Unavailable(Reason::DegenerateDiameter)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iris::FitQuality;

    fn diameter(px: f32) -> Measurement<IrisDiameter> {
        Measurement::Available(IrisDiameter {
            diameter_px: px,
            quality: FitQuality::High,
        })
    }

    #[test]
    fn reference_pair() {
        let scale = calibrate(diameter(10.0), diameter(10.4), &ScaleConfig::default());
        let mm = *scale.mm_per_pixel.value().unwrap();
        assert!((mm - 1.147).abs() < 1e-3);
        let asym = *scale.asymmetry_pct.value().unwrap();
        assert!((asym - 3.92).abs() < 1e-2);
        assert!((scale.mean_diameter_px.value().unwrap() - 10.2).abs() < 1e-5);
    }

    #[test]
    fn symmetric_pair_has_zero_asymmetry() {
        for d in [4.0, 10.0, 37.5] {
            let scale = calibrate(diameter(d), diameter(d), &ScaleConfig::default());
            assert_eq!(scale.asymmetry_pct, Measurement::Available(0.0));
        }
    }

    #[test]
    fn missing_eye_means_no_scale() {
        let missing = Measurement::Unavailable(Reason::NoLandmarks);
        let scale = calibrate(diameter(10.0), missing, &ScaleConfig::default());
        assert_eq!(scale.mm_per_pixel, Measurement::Unavailable(Reason::NoLandmarks));
        assert_eq!(scale.left_diameter_px(), Some(10.0));
        assert_eq!(scale.right_diameter_px(), None);

        let scale = calibrate(diameter(0.0), diameter(10.0), &ScaleConfig::default());
        assert!(!scale.mm_per_pixel.is_available());
        assert!(!scale.asymmetry_pct.is_available());
    }

    #[test]
    fn scale_decreases_as_iris_grows() {
        let config = ScaleConfig::default();
        let mut previous = f32::INFINITY;
        for d in [2.0, 5.0, 8.0, 12.0, 30.0, 100.0] {
            let scale = calibrate(diameter(d), diameter(d), &config);
            let mm = *scale.mm_per_pixel.value().unwrap();
            assert!(mm < previous);
            previous = mm;
        }
    }

    #[test]
    fn calibration_factor_scales_result() {
        let config = ScaleConfig {
            iris_diameter_mm: 11.7,
            calibration_factor: 2.0,
        };
        let scale = calibrate(diameter(11.7), diameter(11.7), &config);
        assert!((scale.mm_per_pixel.value().unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn to_mm_uses_scale() {
        let scale = calibrate(diameter(10.0), diameter(10.4), &ScaleConfig::default());
        let mm = *scale.to_mm(400.0).value().unwrap();
        assert!((mm - 458.82).abs() < 0.1);

        let none = ScaleEstimate::unavailable(Reason::NoFaceRegion);
        assert_eq!(none.to_mm(400.0), Measurement::Unavailable(Reason::NoFaceRegion));
    }
}
