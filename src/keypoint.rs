use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Anatomical landmark labels shared by the supported pose layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose,
    Neck,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    MidHip,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
    LeftBigToe,
    LeftSmallToe,
    RightBigToe,
    RightSmallToe,
}

impl BodyPart {
    /// Nose, eyes and ears: candidates for the top of the head.
    pub fn is_head(self) -> bool {
        matches!(
            self,
            BodyPart::Nose
                | BodyPart::LeftEyeInner
                | BodyPart::LeftEye
                | BodyPart::LeftEyeOuter
                | BodyPart::RightEyeInner
                | BodyPart::RightEye
                | BodyPart::RightEyeOuter
                | BodyPart::LeftEar
                | BodyPart::RightEar
        )
    }

    pub fn is_heel(self) -> bool {
        matches!(self, BodyPart::LeftHeel | BodyPart::RightHeel)
    }
}

/// Index-to-label layout of a pose detector's output array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skeleton {
    /// MediaPipe BlazePose, 33 landmarks
    BlazePose33,
    /// OpenPose BODY_25
    Body25,
    /// COCO / MoveNet, 17 keypoints (no heels)
    Coco17,
}

const BLAZE_POSE_33: [BodyPart; 33] = [
    BodyPart::Nose,
    BodyPart::LeftEyeInner,
    BodyPart::LeftEye,
    BodyPart::LeftEyeOuter,
    BodyPart::RightEyeInner,
    BodyPart::RightEye,
    BodyPart::RightEyeOuter,
    BodyPart::LeftEar,
    BodyPart::RightEar,
    BodyPart::MouthLeft,
    BodyPart::MouthRight,
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftElbow,
    BodyPart::RightElbow,
    BodyPart::LeftWrist,
    BodyPart::RightWrist,
    BodyPart::LeftPinky,
    BodyPart::RightPinky,
    BodyPart::LeftIndex,
    BodyPart::RightIndex,
    BodyPart::LeftThumb,
    BodyPart::RightThumb,
    BodyPart::LeftHip,
    BodyPart::RightHip,
    BodyPart::LeftKnee,
    BodyPart::RightKnee,
    BodyPart::LeftAnkle,
    BodyPart::RightAnkle,
    BodyPart::LeftHeel,
    BodyPart::RightHeel,
    BodyPart::LeftFootIndex,
    BodyPart::RightFootIndex,
];

const BODY_25: [BodyPart; 25] = [
    BodyPart::Nose,
    BodyPart::Neck,
    BodyPart::RightShoulder,
    BodyPart::RightElbow,
    BodyPart::RightWrist,
    BodyPart::LeftShoulder,
    BodyPart::LeftElbow,
    BodyPart::LeftWrist,
    BodyPart::MidHip,
    BodyPart::RightHip,
    BodyPart::RightKnee,
    BodyPart::RightAnkle,
    BodyPart::LeftHip,
    BodyPart::LeftKnee,
    BodyPart::LeftAnkle,
    BodyPart::RightEye,
    BodyPart::LeftEye,
    BodyPart::RightEar,
    BodyPart::LeftEar,
    BodyPart::LeftBigToe,
    BodyPart::LeftSmallToe,
    BodyPart::LeftHeel,
    BodyPart::RightBigToe,
    BodyPart::RightSmallToe,
    BodyPart::RightHeel,
];

const COCO_17: [BodyPart; 17] = [
    BodyPart::Nose,
    BodyPart::LeftEye,
    BodyPart::RightEye,
    BodyPart::LeftEar,
    BodyPart::RightEar,
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftElbow,
    BodyPart::RightElbow,
    BodyPart::LeftWrist,
    BodyPart::RightWrist,
    BodyPart::LeftHip,
    BodyPart::RightHip,
    BodyPart::LeftKnee,
    BodyPart::RightKnee,
    BodyPart::LeftAnkle,
    BodyPart::RightAnkle,
];

impl Skeleton {
    /// Labels in detector output order.
    pub fn parts(self) -> &'static [BodyPart] {
        match self {
            Skeleton::BlazePose33 => &BLAZE_POSE_33,
            Skeleton::Body25 => &BODY_25,
            Skeleton::Coco17 => &COCO_17,
        }
    }

    pub fn len(self) -> usize {
        self.parts().len()
    }
}

/// A single keypoint in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Confidence strictly exceeds the threshold. NaN confidence never does.
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledKeypoint {
    pub part: BodyPart,
    #[serde(flatten)]
    pub keypoint: Keypoint,
}

/// All keypoints of one detected body, in detector output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeypointSet {
    pub points: Vec<LabeledKeypoint>,
}

impl KeypointSet {
    pub fn new(points: Vec<LabeledKeypoint>) -> Self {
        Self { points }
    }

    /// Label a raw `(x, y, confidence)` array using a detector layout.
    ///
    /// Entries beyond the layout's length are ignored; missing trailing
    /// entries are simply absent.
    pub fn from_raw(skeleton: Skeleton, raw: &[(f32, f32, f32)]) -> Self {
        let points = skeleton
            .parts()
            .iter()
            .zip(raw)
            .map(|(&part, &(x, y, confidence))| LabeledKeypoint {
                part,
                keypoint: Keypoint::new(x, y, confidence),
            })
            .collect();
        Self { points }
    }

    /// Like [`KeypointSet::from_raw`] for coordinates normalized to [0,1].
    pub fn from_normalized(
        skeleton: Skeleton,
        raw: &[(f32, f32, f32)],
        width: u32,
        height: u32,
    ) -> Self {
        let scaled: Vec<_> = raw
            .iter()
            .map(|&(x, y, c)| (x * width as f32, y * height as f32, c))
            .collect();
        Self::from_raw(skeleton, &scaled)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keypoints whose label matches `filter` and whose confidence exceeds `threshold`.
    pub fn confident<'a, F>(
        &'a self,
        threshold: f32,
        filter: F,
    ) -> impl Iterator<Item = &'a Keypoint> + 'a
    where
        F: Fn(BodyPart) -> bool + 'a,
    {
        self.points
            .iter()
            .filter(move |p| filter(p.part) && p.keypoint.is_confident(threshold))
            .map(|p| &p.keypoint)
    }
}
