//! Interfaces to the external models the pipeline consumes.
//!
//! Implementations are loaded once by the caller and shared read-only, so
//! every trait requires `Send + Sync` and takes `&self`. Inputs are owned
//! RGB crops of the region being analysed; outputs are raw detector results.

use image::RgbImage;

use crate::error::Result;
use crate::face::FaceLandmarks;
use crate::keypoint::KeypointSet;
use crate::types::BoundingBox;

/// Whole-image body pose detection.
pub trait PoseDetector: Send + Sync {
    /// One keypoint set per detected person, in pixel coordinates of `image`.
    fn infer(&self, image: &RgbImage) -> Result<Vec<KeypointSet>>;
}

/// Dedicated face detection within one person's crop.
pub trait FaceLocator: Send + Sync {
    /// Face box in pixel coordinates of `region`, or `None` if no face is found.
    fn infer(&self, region: &RgbImage) -> Result<Option<BoundingBox>>;
}

/// Face-mesh landmark extraction (478-point refined mesh including irises).
pub trait FaceMeshDetector: Send + Sync {
    /// Landmarks normalized to `face`, or `None` if no face mesh was found.
    fn infer(&self, face: &RgbImage) -> Result<Option<FaceLandmarks>>;
}

/// Age-bucket classification of a face crop.
pub trait AgeClassifier: Send + Sync {
    /// Probability per age bucket, in classifier output order.
    fn infer(&self, face: &RgbImage) -> Result<Vec<f32>>;
}
