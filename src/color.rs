//! Heuristic eye and hair colour classification in HSV space.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EyeColorConfig, HairColorConfig};
use crate::pixels::{median, Hsv, ImageAccess, Region};
use crate::types::{BoundingBox, Point, Reason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeColor {
    #[serde(rename = "Não detectado")]
    NotDetected,
    #[serde(rename = "Azuis")]
    Blue,
    #[serde(rename = "Verdes")]
    Green,
    #[serde(rename = "Mel/Âmbar")]
    Amber,
    #[serde(rename = "Castanhos/Preto")]
    BrownBlack,
}

impl EyeColor {
    pub fn label(self) -> &'static str {
        match self {
            EyeColor::NotDetected => "Não detectado",
            EyeColor::Blue => "Azuis",
            EyeColor::Green => "Verdes",
            EyeColor::Amber => "Mel/Âmbar",
            EyeColor::BrownBlack => "Castanhos/Preto",
        }
    }
}

impl fmt::Display for EyeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HairColor {
    #[serde(rename = "Preto")]
    Black,
    #[serde(rename = "Ruivo")]
    Red,
    #[serde(rename = "Loiro")]
    Blonde,
    #[serde(rename = "Castanho")]
    Brown,
}

impl HairColor {
    pub fn label(self) -> &'static str {
        match self {
            HairColor::Black => "Preto",
            HairColor::Red => "Ruivo",
            HairColor::Blonde => "Loiro",
            HairColor::Brown => "Castanho",
        }
    }
}

impl fmt::Display for HairColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Median hue and saturation inside a disc around the iris centre.
///
/// The disc is centred on the centroid of `iris_points` with radius
/// `radius_factor` times half the distance between the first two points.
/// Pixels outside the image are not part of the mask.
fn iris_hue_saturation<I: ImageAccess>(
    image: &I,
    iris_points: &[Point],
    config: &EyeColorConfig,
) -> Result<(f32, f32), Reason> {
    if iris_points.len() < 2 {
        return Err(Reason::TooFewIrisPoints);
    }
    let center = Point::centroid(iris_points).ok_or(Reason::TooFewIrisPoints)?;
    if !(center.x.is_finite() && center.y.is_finite()) {
        return Err(Reason::EmptyMask);
    }
    let cx = f64::from(center.x.trunc());
    let cy = f64::from(center.y.trunc());
    let half_chord = (iris_points[0].distance(&iris_points[1]) / 2.0).trunc();
    let radius = f64::from((half_chord * config.radius_factor).trunc());
    if !radius.is_finite() {
        return Err(Reason::EmptyMask);
    }

    // scan only the part of the disc's bounding square inside the image
    let x0 = (cx - radius).max(0.0);
    let y0 = (cy - radius).max(0.0);
    let x1 = (cx + radius).min(f64::from(image.width()) - 1.0);
    let y1 = (cy + radius).min(f64::from(image.height()) - 1.0);
    if x0 > x1 || y0 > y1 {
        return Err(Reason::EmptyMask);
    }

    let mut hues = Vec::new();
    let mut saturations = Vec::new();
    let mut masked = 0usize;

    for y in (y0 as i32)..=(y1 as i32) {
        for x in (x0 as i32)..=(x1 as i32) {
            let (dx, dy) = (f64::from(x) - cx, f64::from(y) - cy);
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            masked += 1;
            let hsv = Hsv::from_rgb(image.get_pixel(x, y));
            if hsv.v > config.value_min && hsv.v < config.value_max {
                hues.push(hsv.h);
                saturations.push(hsv.s);
            }
        }
    }

    if masked < config.min_mask_pixels {
        return Err(Reason::EmptyMask);
    }
    let hue = median(&mut hues).ok_or(Reason::NoValidPixels)?;
    let saturation = median(&mut saturations).ok_or(Reason::NoValidPixels)?;
    Ok((hue, saturation))
}

/// Classify eye colour from the iris boundary points of one eye.
///
/// `iris_points` must be in the coordinate frame of `image`. Never fails:
/// anything that prevents sampling yields [`EyeColor::NotDetected`].
pub fn classify_eye_color<I: ImageAccess>(
    image: &I,
    iris_points: &[Point],
    config: &EyeColorConfig,
) -> EyeColor {
    let (hue, saturation) = match iris_hue_saturation(image, iris_points, config) {
        Ok(hs) => hs,
        Err(reason) => {
            debug!(%reason, "eye colour not detected");
            return EyeColor::NotDetected;
        }
    };

    if config.blue.contains(hue, saturation) {
        EyeColor::Blue
    } else if config.green.contains(hue, saturation) {
        EyeColor::Green
    } else if config.amber.contains(hue, saturation) {
        EyeColor::Amber
    } else {
        EyeColor::BrownBlack
    }
}

/// Classify hair colour from the top band of a face region.
///
/// Uses the mean hue, saturation and value of the band. An empty band
/// classifies as [`HairColor::Brown`], the default label.
pub fn classify_hair_color<I: ImageAccess>(face: &I, config: &HairColorConfig) -> HairColor {
    let band_height = (face.height() as f32 * config.band_fraction) as u32;
    let band = Region::new(
        face,
        &BoundingBox::new(0.0, 0.0, face.width() as f32, band_height as f32),
    );
    if band.is_empty() {
        debug!(reason = %Reason::EmptyRegion, "hair band empty");
        return HairColor::Brown;
    }

    let (mut h, mut s, mut v) = (0.0f64, 0.0f64, 0.0f64);
    for y in 0..band.height() as i32 {
        for x in 0..band.width() as i32 {
            let hsv = Hsv::from_rgb(band.get_pixel(x, y));
            h += hsv.h as f64;
            s += hsv.s as f64;
            v += hsv.v as f64;
        }
    }
    let n = (band.width() as f64) * (band.height() as f64);
    let (h, s, v) = ((h / n) as f32, (s / n) as f32, (v / n) as f32);

    if v < config.black_value_max {
        HairColor::Black
    } else if (config.red_hue_min..=config.red_hue_max).contains(&h)
        && s > config.red_saturation_min
    {
        HairColor::Red
    } else if v > config.blonde_value_min && s < config.blonde_saturation_max {
        HairColor::Blonde
    } else {
        HairColor::Brown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn filled(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(100, 100, Rgb(rgb))
    }

    fn iris(cx: f32, cy: f32, r: f32) -> Vec<Point> {
        vec![
            Point::new(cx + r, cy),
            Point::new(cx, cy - r),
            Point::new(cx - r, cy),
            Point::new(cx, cy + r),
        ]
    }

    fn eye(rgb: [u8; 3]) -> EyeColor {
        classify_eye_color(&filled(rgb), &iris(50.0, 50.0, 20.0), &EyeColorConfig::default())
    }

    #[test]
    fn eye_colours() {
        assert_eq!(eye([40, 90, 200]), EyeColor::Blue);
        assert_eq!(eye([100, 150, 60]), EyeColor::Green);
        assert_eq!(eye([180, 130, 50]), EyeColor::Amber);
        assert_eq!(eye([50, 45, 42]), EyeColor::BrownBlack);
    }

    #[test]
    fn eye_colour_ignores_dark_and_bright_noise() {
        assert_eq!(eye([10, 10, 10]), EyeColor::NotDetected);
        assert_eq!(eye([250, 250, 250]), EyeColor::NotDetected);
    }

    #[test]
    fn eye_colour_needs_two_points() {
        let img = filled([40, 90, 200]);
        let config = EyeColorConfig::default();
        assert_eq!(classify_eye_color(&img, &[], &config), EyeColor::NotDetected);
        assert_eq!(
            classify_eye_color(&img, &[Point::new(50.0, 50.0)], &config),
            EyeColor::NotDetected
        );
    }

    #[test]
    fn tiny_iris_mask_is_rejected() {
        let img = filled([40, 90, 200]);
        let result = classify_eye_color(&img, &iris(50.0, 50.0, 5.0), &EyeColorConfig::default());
        assert_eq!(result, EyeColor::NotDetected);
    }

    #[test]
    fn iris_outside_image_is_rejected() {
        let img = filled([40, 90, 200]);
        let result =
            classify_eye_color(&img, &iris(500.0, 500.0, 20.0), &EyeColorConfig::default());
        assert_eq!(result, EyeColor::NotDetected);
    }

    #[test]
    fn oversized_iris_chord_is_clamped_to_image() {
        let img = filled([40, 90, 200]);
        let config = EyeColorConfig::default();
        // disc of radius 51000 centred off-image still covers the whole image
        let points = [
            Point::new(170_000.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        assert_eq!(classify_eye_color(&img, &points, &config), EyeColor::Blue);

        let far_away = [Point::new(170_000.0, 0.0), Point::new(169_000.0, 0.0)];
        assert_eq!(classify_eye_color(&img, &far_away, &config), EyeColor::NotDetected);

        assert_eq!(
            classify_eye_color(&img, &iris(50.0, 50.0, 100_000.0), &config),
            EyeColor::Blue
        );
    }

    #[test]
    fn non_finite_iris_points_are_not_detected() {
        let img = filled([40, 90, 200]);
        let config = EyeColorConfig::default();
        let huge = [
            Point::new(-f32::MAX, 50.0),
            Point::new(f32::MAX, 50.0),
            Point::new(50.0, 50.0),
        ];
        assert_eq!(classify_eye_color(&img, &huge, &config), EyeColor::NotDetected);
        let nan = [Point::new(f32::NAN, 50.0), Point::new(50.0, 50.0)];
        assert_eq!(classify_eye_color(&img, &nan, &config), EyeColor::NotDetected);
    }

    #[test]
    fn eye_colour_uses_only_the_disc() {
        // blue disc on a brown background
        let img = RgbImage::from_fn(100, 100, |x, y| {
            let (dx, dy) = (x as i32 - 50, y as i32 - 50);
            if dx * dx + dy * dy <= 100 {
                Rgb([40, 90, 200])
            } else {
                Rgb([50, 45, 42])
            }
        });
        let result = classify_eye_color(&img, &iris(50.0, 50.0, 20.0), &EyeColorConfig::default());
        assert_eq!(result, EyeColor::Blue);
    }

    #[test]
    fn eye_colour_is_deterministic() {
        let img = RgbImage::from_fn(100, 100, |x, y| Rgb([(x * 2) as u8, (y * 2) as u8, 120]));
        let points = iris(40.0, 60.0, 18.0);
        let config = EyeColorConfig::default();
        let first = classify_eye_color(&img, &points, &config);
        for _ in 0..5 {
            assert_eq!(classify_eye_color(&img, &points, &config), first);
        }
    }

    fn hair(rgb: [u8; 3]) -> HairColor {
        classify_hair_color(&filled(rgb), &HairColorConfig::default())
    }

    #[test]
    fn hair_colours() {
        assert_eq!(hair([20, 20, 20]), HairColor::Black);
        assert_eq!(hair([180, 70, 30]), HairColor::Red);
        assert_eq!(hair([230, 210, 170]), HairColor::Blonde);
        assert_eq!(hair([110, 90, 80]), HairColor::Brown);
    }

    #[test]
    fn hair_samples_only_top_band() {
        // black top 20 rows, blonde below
        let img = RgbImage::from_fn(100, 100, |_, y| {
            if y < 20 {
                Rgb([20, 20, 20])
            } else {
                Rgb([230, 210, 170])
            }
        });
        assert_eq!(classify_hair_color(&img, &HairColorConfig::default()), HairColor::Black);
    }

    #[test]
    fn hair_on_tiny_region_defaults_to_brown() {
        let img = RgbImage::from_pixel(10, 4, Rgb([20, 20, 20]));
        assert_eq!(classify_hair_color(&img, &HairColorConfig::default()), HairColor::Brown);
    }

    #[test]
    fn labels_are_fixed() {
        assert_eq!(EyeColor::NotDetected.to_string(), "Não detectado");
        assert_eq!(EyeColor::Amber.to_string(), "Mel/Âmbar");
        assert_eq!(HairColor::Red.to_string(), "Ruivo");
        assert_eq!(serde_json::to_string(&HairColor::Blonde).unwrap(), "\"Loiro\"");
    }
}
