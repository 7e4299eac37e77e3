//! Per-person fusion of pose, face-mesh and age-classifier outputs.
//!
//! Each detected person is handled in isolation. Height requires a head and
//! a heel keypoint; without either the person is skipped. Every other step
//! degrades only its own field when it fails, so a record is either fully
//! populated ([`RecordStatus::Success`]) or partially ([`RecordStatus::Partial`]).

use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::age::{self, AgeEstimate};
use crate::color::{classify_eye_color, classify_hair_color, EyeColor, HairColor};
use crate::config::Config;
use crate::detector::{AgeClassifier, FaceLocator, FaceMeshDetector, PoseDetector};
use crate::error::{Error, Result};
use crate::face::{eye_box, face_box_from_keypoints, person_box_from_keypoints, FaceLandmarks};
use crate::height::{measure_pixel_height, physical_height_cm, PixelHeight};
use crate::iris::{estimate_diameter, IrisDiameter, LEFT_IRIS, RIGHT_IRIS};
use crate::keypoint::KeypointSet;
use crate::pixels::{ImageAccess, Region};
use crate::scale::{calibrate, ScaleEstimate};
use crate::types::{BoundingBox, Measurement, Point, Reason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Success,
    Partial,
}

/// What the face-side detectors reported for one person.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceObservation {
    /// Face region in image pixel coordinates
    pub region: BoundingBox,
    /// Face-mesh landmarks normalized to `region`
    pub landmarks: Option<FaceLandmarks>,
    /// Age-bucket probabilities, or why the classifier produced none
    pub age_probabilities: std::result::Result<Vec<f32>, String>,
}

/// Raw detector outputs for one person.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonObservation {
    pub keypoints: KeypointSet,
    pub face: Option<FaceObservation>,
}

/// Vertical line from head to heel, for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightLine {
    pub x: f32,
    pub head_y: f32,
    pub heel_y: f32,
}

/// Regions a rendering layer may draw or crop. Positions only, no pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub face_box: Option<BoundingBox>,
    pub left_eye_box: Option<BoundingBox>,
    pub right_eye_box: Option<BoundingBox>,
    pub height_line: Option<HeightLine>,
}

/// The fused measurements of one person in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// 1-based position in the pose detector's output
    pub index: usize,
    pub status: RecordStatus,
    pub pixel_height: Measurement<PixelHeight>,
    pub height_cm: Measurement<f32>,
    pub scale: ScaleEstimate,
    pub age: Measurement<AgeEstimate>,
    pub eye_color: Measurement<EyeColor>,
    pub hair_color: Measurement<HairColor>,
    pub annotations: Annotations,
}

/// Iris diameter for one eye, plus the image-space points it was measured from.
fn measure_iris(
    landmarks: Option<&FaceLandmarks>,
    indices: &[usize; 4],
    region: &BoundingBox,
    tolerance: f32,
) -> (Measurement<IrisDiameter>, Vec<Point>) {
    let Some(landmarks) = landmarks else {
        return (Measurement::Unavailable(Reason::NoLandmarks), Vec::new());
    };
    match landmarks.select_in_image(indices, region) {
        Some(points) => (estimate_diameter(&points, tolerance), points),
        None => (Measurement::Unavailable(Reason::TooFewIrisPoints), Vec::new()),
    }
}

/// Fuse one person's detector outputs into a record.
///
/// Returns `None` when the person has no confident head or heel keypoint.
/// `image` is the full source image the observation's coordinates refer to.
pub fn fuse_person<I: ImageAccess>(
    index: usize,
    observation: &PersonObservation,
    image: &I,
    config: &Config,
) -> Option<PersonRecord> {
    let threshold = config.height.confidence_threshold;
    let pixel_height = measure_pixel_height(&observation.keypoints, threshold);
    if let Measurement::Unavailable(reason @ (Reason::NoHeadKeypoints | Reason::NoHeelKeypoints)) =
        pixel_height
    {
        debug!(index, %reason, "skipping person");
        return None;
    }

    let mut annotations = Annotations {
        height_line: pixel_height.value().map(|h| HeightLine {
            x: image.width() as f32 * 0.5,
            head_y: h.head_y,
            heel_y: h.heel_y,
        }),
        ..Annotations::default()
    };

    let face = observation.face.as_ref().and_then(|face| {
        let region = face.region.clip(image.width(), image.height());
        (!region.is_empty()).then_some((face, region))
    });

    let Some((face, region)) = face else {
        let reason = Reason::NoFaceRegion;
        let scale = ScaleEstimate::unavailable(reason);
        return Some(PersonRecord {
            index,
            status: RecordStatus::Partial,
            height_cm: physical_height_cm(&pixel_height, &scale),
            pixel_height,
            scale,
            age: Measurement::Unavailable(reason),
            eye_color: Measurement::Unavailable(reason),
            hair_color: Measurement::Unavailable(reason),
            annotations,
        });
    };
    annotations.face_box = Some(region);

    let tolerance = config.iris.circularity_tolerance_px;
    let landmarks = face.landmarks.as_ref();
    // face.region, not the clipped box: landmarks are normalized to what the mesh saw
    let (left, left_points) = measure_iris(landmarks, &LEFT_IRIS, &face.region, tolerance);
    let (right, right_points) = measure_iris(landmarks, &RIGHT_IRIS, &face.region, tolerance);

    let padding = config.face.eye_box_padding_px;
    annotations.left_eye_box = eye_box(&left_points, padding, image.width(), image.height());
    annotations.right_eye_box = eye_box(&right_points, padding, image.width(), image.height());

    let scale = calibrate(left, right, &config.scale);
    let height_cm = physical_height_cm(&pixel_height, &scale);

    let age = age::estimate_or_fallback(face.age_probabilities.clone());
    let eye_color = classify_eye_color(image, &right_points, &config.eye_color);
    let hair_color = classify_hair_color(&Region::new(image, &region), &config.hair_color);

    let status = if height_cm.is_available() && scale.mm_per_pixel.is_available() {
        RecordStatus::Success
    } else {
        RecordStatus::Partial
    };

    debug!(
        index,
        ?status,
        mm_per_pixel = ?scale.mm_per_pixel.value(),
        height_cm = ?height_cm.value(),
        "person fused"
    );

    Some(PersonRecord {
        index,
        status,
        pixel_height,
        height_cm,
        scale,
        age: Measurement::Available(age),
        eye_color: Measurement::Available(eye_color),
        hair_color: Measurement::Available(hair_color),
        annotations,
    })
}

/// Fuse every observation of one image, in detector order.
pub fn fuse_people<I: ImageAccess>(
    observations: &[PersonObservation],
    image: &I,
    config: &Config,
) -> Vec<PersonRecord> {
    observations
        .iter()
        .enumerate()
        .filter_map(|(i, obs)| fuse_person(i + 1, obs, image, config))
        .collect()
}

/// Runs the injected models over an image and fuses their outputs per person.
///
/// Models are shared handles; one pipeline may serve many images, from many
/// threads.
#[derive(Clone)]
pub struct MeasurementPipeline {
    config: Config,
    pose: Option<Arc<dyn PoseDetector>>,
    face_locator: Option<Arc<dyn FaceLocator>>,
    face_mesh: Arc<dyn FaceMeshDetector>,
    age: Arc<dyn AgeClassifier>,
}

impl MeasurementPipeline {
    pub fn new(
        config: Config,
        face_mesh: Arc<dyn FaceMeshDetector>,
        age: Arc<dyn AgeClassifier>,
    ) -> Self {
        Self {
            config,
            pose: None,
            face_locator: None,
            face_mesh,
            age,
        }
    }

    /// Enable [`MeasurementPipeline::measure_image`].
    pub fn with_pose_detector(mut self, pose: Arc<dyn PoseDetector>) -> Self {
        self.pose = Some(pose);
        self
    }

    /// Prefer a dedicated face detector over the head-keypoint estimate.
    pub fn with_face_locator(mut self, locator: Arc<dyn FaceLocator>) -> Self {
        self.face_locator = Some(locator);
        self
    }

    /// Face region from the dedicated locator, falling back to head keypoints.
    fn locate_face(&self, image: &RgbImage, keypoints: &KeypointSet) -> Option<BoundingBox> {
        let threshold = self.config.height.confidence_threshold;
        let (width, height) = image.dimensions();

        if let Some(locator) = &self.face_locator {
            let person = person_box_from_keypoints(keypoints, threshold, width, height)
                .map(|b| Region::new(image, &b))
                .filter(|r| !r.is_empty());
            if let Some(person) = person {
                let offset = person.bounds();
                match locator.infer(&person.to_rgb_image()) {
                    Ok(Some(face)) => {
                        let face = BoundingBox::new(
                            offset.x + face.x,
                            offset.y + face.y,
                            face.width,
                            face.height,
                        )
                        .clip(width, height);
                        if !face.is_empty() {
                            return Some(face);
                        }
                    }
                    Ok(None) => debug!("face locator found no face"),
                    Err(e) => warn!(error = %e, "face locator failed"),
                }
            }
        }

        face_box_from_keypoints(keypoints, threshold, &self.config.face, width, height)
    }

    /// Run the face-side models for one person.
    pub fn observe(&self, image: &RgbImage, keypoints: KeypointSet) -> PersonObservation {
        let face = self.locate_face(image, &keypoints).and_then(|bbox| {
            let region = Region::new(image, &bbox);
            if region.is_empty() {
                return None;
            }
            let crop = region.to_rgb_image();

            let landmarks = match self.face_mesh.infer(&crop) {
                Ok(landmarks) => landmarks,
                Err(e) => {
                    warn!(error = %e, "face mesh failed");
                    None
                }
            };
            let age_probabilities = self.age.infer(&crop).map_err(|e| e.to_string());

            Some(FaceObservation {
                region: region.bounds(),
                landmarks,
                age_probabilities,
            })
        });

        PersonObservation { keypoints, face }
    }

    /// Measure every person in `people`, given their pose keypoints.
    #[tracing::instrument(name = "Measure people", skip_all, fields(people = people.len()))]
    pub fn measure_people(&self, image: &RgbImage, people: &[KeypointSet]) -> Vec<PersonRecord> {
        let observations: Vec<_> = people
            .iter()
            .map(|keypoints| self.observe(image, keypoints.clone()))
            .collect();
        let records = fuse_people(&observations, image, &self.config);
        info!(detected = people.len(), measured = records.len(), "image measured");
        records
    }

    /// Detect people with the pose model, then measure each one.
    #[tracing::instrument(name = "Measure image", skip_all, err)]
    pub fn measure_image(&self, image: &RgbImage) -> Result<Vec<PersonRecord>> {
        let pose = self.pose.as_ref().ok_or(Error::MissingModel("pose"))?;
        let people = pose.infer(image)?;
        Ok(self.measure_people(image, &people))
    }
}
