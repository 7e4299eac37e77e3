//! # bio-pixel
//!
//! Anthropometric measurements of people in a single still image, derived
//! from the raw outputs of a pose detector, a face-mesh detector and an
//! age classifier.
//!
//! This crate provides:
//! - **Iris scale**: pixel iris diameters (circle fit with a chord fallback)
//!   turned into a mm-per-pixel scale using the average human iris diameter
//! - **Body height**: head-to-heel pixel height from confident keypoints,
//!   converted to centimetres with the same person's iris scale
//! - **Age**: most probable age bucket, its representative age and an age range
//! - **Colour**: heuristic eye and hair colour labels from HSV statistics
//! - **Fusion**: one [`PersonRecord`] per detected person, where every
//!   failed step degrades only its own field
//!
//! The neural networks themselves are external. They are plugged in through
//! the traits in [`detector`], or their recorded outputs are fused directly
//! with [`fuse_people`].
//!
//! ## Algorithm Overview
//!
//! 1. Select the topmost confident head keypoint and lowest confident heel;
//!    people missing either are skipped
//! 2. Locate the face (dedicated detector or head-keypoint box)
//! 3. Map the face mesh iris landmarks into the image and estimate both
//!    iris diameters
//! 4. `mm_per_pixel = iris_diameter_mm / mean_diameter * calibration_factor`
//! 5. `height_cm = pixel_height * mm_per_pixel / 10`
//! 6. Age from the classifier's probabilities (fallback age 12 on failure)
//! 7. Eye colour from a disc inside the iris, hair colour from the top of the face
//!
//! ## Quick Start
//!
//! ```rust
//! use bio_pixel::{
//!     fuse_people, BoundingBox, Config, FaceLandmarks, FaceObservation, KeypointSet,
//!     PersonObservation, Point, Skeleton, LEFT_IRIS, RIGHT_IRIS,
//! };
//! use image::{Rgb, RgbImage};
//!
//! let image = RgbImage::from_pixel(640, 480, Rgb([120, 100, 90]));
//!
//! // Keypoints from a pose detector (BlazePose layout, pixel coordinates)
//! let mut raw = vec![(320.0, 240.0, 0.0); 33];
//! raw[0] = (320.0, 40.0, 0.9); // nose
//! raw[29] = (310.0, 440.0, 0.9); // left heel
//! raw[30] = (330.0, 440.0, 0.9); // right heel
//! let keypoints = KeypointSet::from_raw(Skeleton::BlazePose33, &raw);
//!
//! // Face mesh output, normalized to the face region
//! let region = BoundingBox::new(280.0, 10.0, 80.0, 100.0);
//! let mut mesh = vec![Point::new(0.5, 0.5); 478];
//! for (indices, cx) in [(LEFT_IRIS, 0.35), (RIGHT_IRIS, 0.65)] {
//!     let r = 5.0 / 80.0;
//!     let ry = 5.0 / 100.0;
//!     mesh[indices[0]] = Point::new(cx + r, 0.4);
//!     mesh[indices[1]] = Point::new(cx, 0.4 - ry);
//!     mesh[indices[2]] = Point::new(cx - r, 0.4);
//!     mesh[indices[3]] = Point::new(cx, 0.4 + ry);
//! }
//!
//! let person = PersonObservation {
//!     keypoints,
//!     face: Some(FaceObservation {
//!         region,
//!         landmarks: Some(FaceLandmarks::new(mesh)),
//!         age_probabilities: Ok(vec![0.0, 0.0, 0.0, 0.1, 0.7, 0.2, 0.0, 0.0]),
//!     }),
//! };
//!
//! let records = fuse_people(&[person], &image, &Config::default());
//! assert_eq!(records.len(), 1);
//! println!("{:?}", records[0].height_cm);
//! ```
//!
//! ## Custom Image Types
//!
//! Implement the [`ImageAccess`] trait for your own image types:
//!
//! ```rust
//! use bio_pixel::ImageAccess;
//!
//! struct MyImage { /* ... */ }
//!
//! impl ImageAccess for MyImage {
//!     fn get_pixel(&self, x: i32, y: i32) -> [u8; 3] {
//!         // Return [r, g, b] at (x, y)
//!         // Return black for out-of-bounds
//!         [0, 0, 0]
//!     }
//!     fn width(&self) -> u32 { 640 }
//!     fn height(&self) -> u32 { 480 }
//! }
//! ```

pub mod age;
pub mod color;
pub mod config;
pub mod detector;
mod error;
pub mod face;
pub mod height;
pub mod iris;
pub mod keypoint;
pub mod logging;
pub mod pipeline;
pub mod pixels;
pub mod report;
pub mod scale;
mod types;

pub use age::{AgeBucket, AgeEstimate, AgeRange, FALLBACK_AGE};
pub use color::{classify_eye_color, classify_hair_color, EyeColor, HairColor};
pub use config::Config;
pub use detector::{AgeClassifier, FaceLocator, FaceMeshDetector, PoseDetector};
pub use error::{Error, Result};
pub use face::FaceLandmarks;
pub use height::{measure_pixel_height, physical_height_cm, PixelHeight};
pub use iris::{estimate_diameter, FitQuality, IrisDiameter, LEFT_IRIS, RIGHT_IRIS};
pub use keypoint::{BodyPart, Keypoint, KeypointSet, LabeledKeypoint, Skeleton};
pub use pipeline::{
    fuse_people, fuse_person, Annotations, FaceObservation, HeightLine, MeasurementPipeline,
    PersonObservation, PersonRecord, RecordStatus,
};
pub use pixels::{Hsv, ImageAccess, Region};
pub use report::PersonReport;
pub use scale::{calibrate, ScaleEstimate};
pub use types::{BoundingBox, Measurement, Point, Reason};
