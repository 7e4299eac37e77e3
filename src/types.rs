use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Arithmetic mean of a set of points. `None` for an empty slice.
    pub fn centroid(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Point::zero(), |acc, p| acc + *p);
        Some(sum * (1.0 / points.len() as f32))
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// A bounding box defined by top-left corner, width, and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tight box around a set of points. `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the box covers less than one whole pixel in either direction.
    pub fn is_empty(&self) -> bool {
        !(self.width >= 1.0 && self.height >= 1.0)
    }

    /// Grow the box by `padding` on every side.
    pub fn padded(&self, padding: f32) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + 2.0 * padding,
            self.height + 2.0 * padding,
        )
    }

    /// Clip the box to a `width` x `height` image.
    pub fn clip(&self, width: u32, height: u32) -> Self {
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = self.right().min(width as f32);
        let y1 = self.bottom().min(height as f32);
        Self::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    /// Convert a point from normalized coordinates [0,1] to image coordinates
    /// within this bounding box.
    pub fn denormalize_point(&self, p: Point) -> Point {
        Point::new(self.x + p.x * self.width, self.y + p.y * self.height)
    }
}

/// Why a derived field could not be produced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    #[error("no confident head keypoints")]
    NoHeadKeypoints,
    #[error("no confident heel keypoints")]
    NoHeelKeypoints,
    #[error("head is not above heels")]
    InvertedHeight,
    #[error("no face region")]
    NoFaceRegion,
    #[error("no face landmarks")]
    NoLandmarks,
    #[error("too few iris points")]
    TooFewIrisPoints,
    #[error("iris points are not circular")]
    NotCircular,
    #[error("degenerate iris diameter")]
    DegenerateDiameter,
    #[error("scale unavailable")]
    ScaleUnavailable,
    #[error("iris mask too small")]
    EmptyMask,
    #[error("no pixels in valid brightness range")]
    NoValidPixels,
    #[error("empty sample region")]
    EmptyRegion,
}

/// A derived value, or the reason it could not be derived.
///
/// Keeps "field absent" apart from "field is zero": physical outputs are
/// only ever `Available` with a finite positive value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Measurement<T> {
    Available(T),
    Unavailable(Reason),
}

impl<T> Measurement<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Measurement::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Measurement::Available(v) => Some(v),
            Measurement::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            Measurement::Available(_) => None,
            Measurement::Unavailable(r) => Some(*r),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Measurement<U> {
        match self {
            Measurement::Available(v) => Measurement::Available(f(v)),
            Measurement::Unavailable(r) => Measurement::Unavailable(r),
        }
    }

    pub fn and_then<U, F: FnOnce(T) -> Measurement<U>>(self, f: F) -> Measurement<U> {
        match self {
            Measurement::Available(v) => f(v),
            Measurement::Unavailable(r) => Measurement::Unavailable(r),
        }
    }
}

impl Measurement<f32> {
    /// Accept `value` only if it is finite and strictly positive.
    pub fn positive(value: f32, otherwise: Reason) -> Self {
        if value.is_finite() && value > 0.0 {
            Measurement::Available(value)
        } else {
            Measurement::Unavailable(otherwise)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);

        let sum = a + b;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 6.0);

        let diff = b - a;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 2.0);

        let mid = a.midpoint(&b);
        assert_eq!(mid, Point::new(2.0, 3.0));
    }

    #[test]
    fn centroid_of_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let c = Point::centroid(&square).unwrap();
        assert!((c.x - 2.0).abs() < 1e-6);
        assert!((c.y - 2.0).abs() < 1e-6);
        assert!(Point::centroid(&[]).is_none());
    }

    #[test]
    fn bounding_box_denormalization() {
        let bbox = BoundingBox::new(100.0, 100.0, 200.0, 200.0);

        let center_img = bbox.denormalize_point(Point::new(0.5, 0.5));
        assert_eq!(center_img.x, 200.0);
        assert_eq!(center_img.y, 200.0);

        let corner = bbox.denormalize_point(Point::new(1.0, 0.0));
        assert_eq!(corner, Point::new(300.0, 100.0));
    }

    #[test]
    fn bounding_box_clip_and_pad() {
        let bbox = BoundingBox::new(-10.0, 5.0, 50.0, 200.0).clip(30, 100);
        assert_eq!(bbox, BoundingBox::new(0.0, 5.0, 30.0, 95.0));

        let padded = BoundingBox::new(10.0, 10.0, 4.0, 4.0).padded(5.0);
        assert_eq!(padded, BoundingBox::new(5.0, 5.0, 14.0, 14.0));

        assert!(BoundingBox::new(0.0, 0.0, 0.5, 10.0).is_empty());
        assert!(BoundingBox::new(40.0, 0.0, 10.0, 10.0).clip(30, 30).is_empty());
    }

    #[test]
    fn measurement_positive_rejects_degenerate_values() {
        assert_eq!(
            Measurement::positive(1.5, Reason::DegenerateDiameter),
            Measurement::Available(1.5)
        );
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert_eq!(
                Measurement::positive(bad, Reason::DegenerateDiameter),
                Measurement::Unavailable(Reason::DegenerateDiameter)
            );
        }
    }

    #[test]
    fn measurement_serializes_tagged() {
        let m: Measurement<f32> = Measurement::Unavailable(Reason::NoFaceRegion);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"status":"unavailable","value":"no_face_region"}"#);
    }
}
