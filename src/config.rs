//! Tunable constants for calibration, keypoint filtering and colour heuristics.
//!
//! Every section has defaults, so an empty TOML file (or no file at all)
//! yields the stock configuration. The calibration factor and circularity
//! tolerance are empirical and not tied to any particular camera.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scale: ScaleConfig,
    #[serde(default)]
    pub iris: IrisConfig,
    #[serde(default)]
    pub height: HeightConfig,
    #[serde(default)]
    pub face: FaceConfig,
    #[serde(default)]
    pub eye_color: EyeColorConfig,
    #[serde(default)]
    pub hair_color: HairColorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    /// Average human iris diameter (mm)
    #[serde(default = "default_iris_diameter_mm")]
    pub iris_diameter_mm: f32,
    /// Multiplicative correction applied to the iris-derived scale
    #[serde(default = "default_calibration_factor")]
    pub calibration_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrisConfig {
    /// Max standard deviation (px) of centroid distances for a 4-point fit
    #[serde(default = "default_circularity_tolerance")]
    pub circularity_tolerance_px: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightConfig {
    /// Keypoints must have confidence strictly above this
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceConfig {
    /// Growth factor applied to the head-keypoint box about its centre
    #[serde(default = "default_face_expand")]
    pub expand: f32,
    /// Height / width of the keypoint-derived face box
    #[serde(default = "default_face_aspect")]
    pub aspect: f32,
    #[serde(default = "default_eye_box_padding")]
    pub eye_box_padding_px: f32,
}

/// Hue bounds are degrees in [0, 360); saturation and value are on 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueBand {
    pub hue_min: f32,
    pub hue_max: f32,
    /// Saturation must be strictly above this
    pub saturation_min: f32,
}

impl HueBand {
    pub const fn new(hue_min: f32, hue_max: f32, saturation_min: f32) -> Self {
        Self {
            hue_min,
            hue_max,
            saturation_min,
        }
    }

    pub fn contains(&self, hue: f32, saturation: f32) -> bool {
        (self.hue_min..=self.hue_max).contains(&hue) && saturation > self.saturation_min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeColorConfig {
    /// Mask radius as a fraction of half the reference iris chord
    #[serde(default = "default_radius_factor")]
    pub radius_factor: f32,
    #[serde(default = "default_min_mask_pixels")]
    pub min_mask_pixels: usize,
    /// Pixels are kept only when value_min < V < value_max
    #[serde(default = "default_value_min")]
    pub value_min: f32,
    #[serde(default = "default_value_max")]
    pub value_max: f32,
    #[serde(default = "default_blue_band")]
    pub blue: HueBand,
    #[serde(default = "default_green_band")]
    pub green: HueBand,
    #[serde(default = "default_amber_band")]
    pub amber: HueBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HairColorConfig {
    /// Fraction of the face region height sampled from the top
    #[serde(default = "default_band_fraction")]
    pub band_fraction: f32,
    #[serde(default = "default_black_value_max")]
    pub black_value_max: f32,
    #[serde(default = "default_red_hue_min")]
    pub red_hue_min: f32,
    #[serde(default = "default_red_hue_max")]
    pub red_hue_max: f32,
    #[serde(default = "default_red_saturation_min")]
    pub red_saturation_min: f32,
    #[serde(default = "default_blonde_value_min")]
    pub blonde_value_min: f32,
    #[serde(default = "default_blonde_saturation_max")]
    pub blonde_saturation_max: f32,
}

fn default_iris_diameter_mm() -> f32 { 11.7 }
fn default_calibration_factor() -> f32 { 1.0 }
fn default_circularity_tolerance() -> f32 { 2.0 }
fn default_confidence_threshold() -> f32 { 0.1 }
fn default_face_expand() -> f32 { 1.8 }
fn default_face_aspect() -> f32 { 1.25 }
fn default_eye_box_padding() -> f32 { 5.0 }
fn default_radius_factor() -> f32 { 0.6 }
fn default_min_mask_pixels() -> usize { 25 }
fn default_value_min() -> f32 { 30.0 }
fn default_value_max() -> f32 { 230.0 }
fn default_blue_band() -> HueBand { HueBand::new(180.0, 240.0, 40.0) }
fn default_green_band() -> HueBand { HueBand::new(60.0, 120.0, 40.0) }
fn default_amber_band() -> HueBand { HueBand::new(20.0, 50.0, 60.0) }
fn default_band_fraction() -> f32 { 0.2 }
fn default_black_value_max() -> f32 { 60.0 }
fn default_red_hue_min() -> f32 { 10.0 }
fn default_red_hue_max() -> f32 { 30.0 }
fn default_red_saturation_min() -> f32 { 90.0 }
fn default_blonde_value_min() -> f32 { 180.0 }
fn default_blonde_saturation_max() -> f32 { 80.0 }

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            iris_diameter_mm: default_iris_diameter_mm(),
            calibration_factor: default_calibration_factor(),
        }
    }
}

impl Default for IrisConfig {
    fn default() -> Self {
        Self {
            circularity_tolerance_px: default_circularity_tolerance(),
        }
    }
}

impl Default for HeightConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            expand: default_face_expand(),
            aspect: default_face_aspect(),
            eye_box_padding_px: default_eye_box_padding(),
        }
    }
}

impl Default for EyeColorConfig {
    fn default() -> Self {
        Self {
            radius_factor: default_radius_factor(),
            min_mask_pixels: default_min_mask_pixels(),
            value_min: default_value_min(),
            value_max: default_value_max(),
            blue: default_blue_band(),
            green: default_green_band(),
            amber: default_amber_band(),
        }
    }
}

impl Default for HairColorConfig {
    fn default() -> Self {
        Self {
            band_fraction: default_band_fraction(),
            black_value_max: default_black_value_max(),
            red_hue_min: default_red_hue_min(),
            red_hue_max: default_red_hue_max(),
            red_saturation_min: default_red_saturation_min(),
            blonde_value_min: default_blonde_value_min(),
            blonde_saturation_max: default_blonde_saturation_max(),
        }
    }
}

impl Config {
    /// Load and validate a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        positive("scale.iris_diameter_mm", self.scale.iris_diameter_mm)?;
        positive("scale.calibration_factor", self.scale.calibration_factor)?;
        non_negative("iris.circularity_tolerance_px", self.iris.circularity_tolerance_px)?;

        let t = self.height.confidence_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(Error::InvalidConfig(format!(
                "height.confidence_threshold must be in [0, 1], got {t}"
            )));
        }

        positive("face.expand", self.face.expand)?;
        positive("face.aspect", self.face.aspect)?;
        non_negative("face.eye_box_padding_px", self.face.eye_box_padding_px)?;

        positive("eye_color.radius_factor", self.eye_color.radius_factor)?;
        if self.eye_color.value_min >= self.eye_color.value_max {
            return Err(Error::InvalidConfig(
                "eye_color.value_min must be below eye_color.value_max".into(),
            ));
        }
        for (name, band) in [
            ("eye_color.blue", &self.eye_color.blue),
            ("eye_color.green", &self.eye_color.green),
            ("eye_color.amber", &self.eye_color.amber),
        ] {
            if band.hue_min > band.hue_max {
                return Err(Error::InvalidConfig(format!(
                    "{name}: hue_min must not exceed hue_max"
                )));
            }
        }

        let f = self.hair_color.band_fraction;
        if !(f > 0.0 && f <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "hair_color.band_fraction must be in (0, 1], got {f}"
            )));
        }
        if self.hair_color.red_hue_min > self.hair_color.red_hue_max {
            return Err(Error::InvalidConfig(
                "hair_color.red_hue_min must not exceed red_hue_max".into(),
            ));
        }

        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}
