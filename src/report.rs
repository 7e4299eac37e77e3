//! Display strings for a [`PersonRecord`], as shown on the results page.

use serde::Serialize;

use crate::pipeline::{PersonRecord, RecordStatus};
use crate::types::Measurement;

const FAILED: &str = "Falha";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonReport {
    pub id: usize,
    pub status: RecordStatus,
    pub right_iris: String,
    pub left_iris: String,
    pub mean_iris: String,
    pub scale: String,
    pub iris_difference: String,
    pub eye_color: String,
    pub hair_color: String,
    pub height: String,
    pub estimated_age: String,
    pub age_range: String,
}

fn format_or<T, F: Fn(&T) -> String>(m: &Measurement<T>, fallback: &str, f: F) -> String {
    match m {
        Measurement::Available(v) => f(v),
        Measurement::Unavailable(_) => fallback.to_string(),
    }
}

impl PersonReport {
    pub fn from_record(record: &PersonRecord) -> Self {
        let scale = &record.scale;
        Self {
            id: record.index,
            status: record.status,
            right_iris: format_or(&scale.right, FAILED, |d| format!("{:.2}px", d.diameter_px)),
            left_iris: format_or(&scale.left, FAILED, |d| format!("{:.2}px", d.diameter_px)),
            mean_iris: format_or(&scale.mean_diameter_px, NOT_AVAILABLE, |d| format!("{d:.2}px")),
            scale: format_or(&scale.mm_per_pixel, NOT_AVAILABLE, |s| format!("{s:.3} mm/px")),
            iris_difference: format_or(&scale.asymmetry_pct, NOT_AVAILABLE, |p| format!("{p:.1}%")),
            eye_color: format_or(&record.eye_color, NOT_AVAILABLE, |c| c.to_string()),
            hair_color: format_or(&record.hair_color, NOT_AVAILABLE, |c| c.to_string()),
            height: format_or(&record.height_cm, NOT_AVAILABLE, |h| format!("{h:.1} cm")),
            estimated_age: format_or(&record.age, NOT_AVAILABLE, |a| {
                format!("{} anos", a.representative_age)
            }),
            age_range: format_or(&record.age, NOT_AVAILABLE, |a| a.age_range_label().to_string()),
        }
    }
}

/// Multi-line text block for a set of reports.
pub fn format_human_readable(reports: &[PersonReport]) -> String {
    let mut s = String::new();

    s.push_str(&format!("People measured: {}\n", reports.len()));
    if reports.is_empty() {
        s.push_str("\nNo person with visible head and heels found.\n");
        return s;
    }

    for r in reports {
        s.push_str(&format!("\n--- Person {} ({:?}) ---\n", r.id, r.status));
        s.push_str(&format!("Height:      {}\n", r.height));
        s.push_str(&format!("Scale:       {}\n", r.scale));
        s.push_str(&format!(
            "Iris:        R {} / L {} (mean {}, diff {})\n",
            r.right_iris, r.left_iris, r.mean_iris, r.iris_difference
        ));
        s.push_str(&format!("Age:         {} - {}\n", r.estimated_age, r.age_range));
        s.push_str(&format!("Eye colour:  {}\n", r.eye_color));
        s.push_str(&format!("Hair colour: {}\n", r.hair_color));
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::AgeEstimate;
    use crate::color::{EyeColor, HairColor};
    use crate::config::ScaleConfig;
    use crate::height::PixelHeight;
    use crate::iris::{FitQuality, IrisDiameter};
    use crate::pipeline::Annotations;
    use crate::scale::{calibrate, ScaleEstimate};
    use crate::types::Reason;

    fn diameter(px: f32) -> Measurement<IrisDiameter> {
        Measurement::Available(IrisDiameter {
            diameter_px: px,
            quality: FitQuality::High,
        })
    }

    #[test]
    fn full_record_strings() {
        let record = PersonRecord {
            index: 1,
            status: RecordStatus::Success,
            pixel_height: Measurement::Available(PixelHeight {
                head_y: 50.0,
                heel_y: 450.0,
                pixels: 400.0,
            }),
            height_cm: Measurement::Available(45.882),
            scale: calibrate(diameter(10.4), diameter(10.0), &ScaleConfig::default()),
            age: Measurement::Available(AgeEstimate::fallback()),
            eye_color: Measurement::Available(EyeColor::Amber),
            hair_color: Measurement::Available(HairColor::Blonde),
            annotations: Annotations::default(),
        };
        let report = PersonReport::from_record(&record);
        assert_eq!(report.left_iris, "10.40px");
        assert_eq!(report.right_iris, "10.00px");
        assert_eq!(report.mean_iris, "10.20px");
        assert_eq!(report.scale, "1.147 mm/px");
        assert_eq!(report.iris_difference, "3.9%");
        assert_eq!(report.height, "45.9 cm");
        assert_eq!(report.estimated_age, "12 anos");
        assert_eq!(report.age_range, "Child (3-12)");
        assert_eq!(report.eye_color, "Mel/Âmbar");
        assert_eq!(report.hair_color, "Loiro");

        let text = format_human_readable(&[report]);
        assert!(text.contains("--- Person 1 (Success) ---"));
        assert!(text.contains("45.9 cm"));
    }

    #[test]
    fn missing_fields_render_as_failure_markers() {
        let record = PersonRecord {
            index: 3,
            status: RecordStatus::Partial,
            pixel_height: Measurement::Unavailable(Reason::InvertedHeight),
            height_cm: Measurement::Unavailable(Reason::InvertedHeight),
            scale: ScaleEstimate::unavailable(Reason::NoFaceRegion),
            age: Measurement::Unavailable(Reason::NoFaceRegion),
            eye_color: Measurement::Unavailable(Reason::NoFaceRegion),
            hair_color: Measurement::Unavailable(Reason::NoFaceRegion),
            annotations: Annotations::default(),
        };
        let report = PersonReport::from_record(&record);
        assert_eq!(report.right_iris, "Falha");
        assert_eq!(report.left_iris, "Falha");
        assert_eq!(report.mean_iris, "N/A");
        assert_eq!(report.scale, "N/A");
        assert_eq!(report.height, "N/A");
        assert_eq!(report.estimated_age, "N/A");
        assert_eq!(report.eye_color, "N/A");
    }

    #[test]
    fn empty_report() {
        assert!(format_human_readable(&[]).contains("People measured: 0"));
    }
}
