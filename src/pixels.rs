use image::RgbImage;

use crate::types::BoundingBox;

/// Trait for reading RGB pixels from an image.
pub trait ImageAccess {
    /// Get the `[r, g, b]` value at (x, y). Returns black for out-of-bounds pixels.
    fn get_pixel(&self, x: i32, y: i32) -> [u8; 3];

    /// Image dimensions.
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }
}

impl ImageAccess for RgbImage {
    fn get_pixel(&self, x: i32, y: i32) -> [u8; 3] {
        if !ImageAccess::in_bounds(self, x, y) {
            return [0, 0, 0];
        }
        self.get_pixel(x as u32, y as u32).0
    }

    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }
}

/// A rectangular window into another image, addressed in window coordinates.
pub struct Region<'a, I: ImageAccess + ?Sized> {
    parent: &'a I,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl<'a, I: ImageAccess + ?Sized> Region<'a, I> {
    /// The integer pixel window covered by `bbox`, clipped to the parent.
    pub fn new(parent: &'a I, bbox: &BoundingBox) -> Self {
        let clipped = bbox.clip(parent.width(), parent.height());
        let x = clipped.x.floor() as u32;
        let y = clipped.y.floor() as u32;
        let right = (clipped.right().floor() as u32).min(parent.width());
        let bottom = (clipped.bottom().floor() as u32).min(parent.height());
        Self {
            parent,
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The pixel window actually covered, in parent coordinates.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// Copy the window into an owned buffer, e.g. to hand to a model.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(self.get_pixel(x as i32, y as i32))
        })
    }
}

impl<I: ImageAccess + ?Sized> ImageAccess for Region<'_, I> {
    fn get_pixel(&self, x: i32, y: i32) -> [u8; 3] {
        if !self.in_bounds(x, y) {
            return [0, 0, 0];
        }
        self.parent
            .get_pixel(self.x as i32 + x, self.y as i32 + y)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Hue in degrees [0, 360); saturation and value on 0..=255.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        let r = r as f32;
        let g = g as f32;
        let b = b as f32;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let chroma = max - min;

        let s = if max > 0.0 { 255.0 * chroma / max } else { 0.0 };

        let h = if chroma == 0.0 {
            0.0
        } else if max == r {
            60.0 * (g - b) / chroma
        } else if max == g {
            60.0 * (b - r) / chroma + 120.0
        } else {
            60.0 * (r - g) / chroma + 240.0
        };
        let h = if h < 0.0 { h + 360.0 } else { h };

        Self { h, s, v: max }
    }
}

/// Median of a sample; the mean of the two middle values for even lengths.
pub fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
