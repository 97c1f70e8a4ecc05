// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! COCO-17 keypoint and per-person pose types.
//!
//! A [`PersonPose`] is what the external pose model yields for one person in one
//! frame: 17 keypoints plus a bounding box. Person ids are frame-local indices and
//! carry no identity across frames.

use ndarray::{Array2, Array3, s};
use serde::{Deserialize, Serialize};

/// Number of keypoints in the COCO-Pose layout.
pub const NUM_KEYPOINTS: usize = 17;

/// COCO-Pose keypoint indices.
pub mod kpt {
    pub const NOSE: usize = 0;
    pub const LEFT_EYE: usize = 1;
    pub const RIGHT_EYE: usize = 2;
    pub const LEFT_EAR: usize = 3;
    pub const RIGHT_EAR: usize = 4;
    pub const LEFT_SHOULDER: usize = 5;
    pub const RIGHT_SHOULDER: usize = 6;
    pub const LEFT_ELBOW: usize = 7;
    pub const RIGHT_ELBOW: usize = 8;
    pub const LEFT_WRIST: usize = 9;
    pub const RIGHT_WRIST: usize = 10;
    pub const LEFT_HIP: usize = 11;
    pub const RIGHT_HIP: usize = 12;
    pub const LEFT_KNEE: usize = 13;
    pub const RIGHT_KNEE: usize = 14;
    pub const LEFT_ANKLE: usize = 15;
    pub const RIGHT_ANKLE: usize = 16;
}

/// A single body-landmark estimate in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Keypoint {
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels (grows downwards).
    pub y: f32,
    /// Visibility confidence in `[0, 1]`.
    pub conf: f32,
}

impl Keypoint {
    /// Create a new keypoint.
    #[must_use]
    pub const fn new(x: f32, y: f32, conf: f32) -> Self {
        Self { x, y, conf }
    }

    /// Whether the keypoint's confidence is strictly above `threshold`.
    #[must_use]
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.conf > threshold
    }

    /// Whether all three components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.conf.is_finite()
    }
}

impl From<[f32; 3]> for Keypoint {
    fn from([x, y, conf]: [f32; 3]) -> Self {
        Self { x, y, conf }
    }
}

impl From<Keypoint> for [f32; 3] {
    fn from(kp: Keypoint) -> Self {
        [kp.x, kp.y, kp.conf]
    }
}

/// One detected person: keypoints, bounding box and frame-local index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonPose {
    /// Keypoints in COCO order. Well-formed poses hold exactly [`NUM_KEYPOINTS`].
    pub keypoints: Vec<Keypoint>,
    /// Bounding box as `[x1, y1, x2, y2]`.
    pub bbox: [f32; 4],
    /// Index of the person within its frame.
    #[serde(default)]
    pub person_id: usize,
}

impl PersonPose {
    /// Create a new pose.
    #[must_use]
    pub const fn new(keypoints: Vec<Keypoint>, bbox: [f32; 4], person_id: usize) -> Self {
        Self {
            keypoints,
            bbox,
            person_id,
        }
    }

    /// Build poses from a pose model's raw output.
    ///
    /// # Arguments
    ///
    /// * `keypoints` - Keypoint tensor with shape (N, 17, 3) or (N, 17, 2).
    /// * `boxes` - Box array with shape (N, 4+), first four columns `x1, y1, x2, y2`.
    ///
    /// # Returns
    ///
    /// * One pose per row present in both arrays; person ids are row indices.
    ///   Keypoints without a visibility column are treated as fully visible.
    #[must_use]
    pub fn from_arrays(keypoints: &Array3<f32>, boxes: &Array2<f32>) -> Vec<Self> {
        let (n_kpt, _, dims) = keypoints.dim();
        if dims < 2 || boxes.ncols() < 4 {
            return Vec::new();
        }
        let n = n_kpt.min(boxes.nrows());

        (0..n)
            .map(|i| {
                let person = keypoints.slice(s![i, .., ..]);
                let kpts = person
                    .outer_iter()
                    .map(|row| {
                        let conf = if dims > 2 { row[2] } else { 1.0 };
                        Keypoint::new(row[0], row[1], conf)
                    })
                    .collect();
                let b = boxes.row(i);
                Self::new(kpts, [b[0], b[1], b[2], b[3]], i)
            })
            .collect()
    }

    /// Get a keypoint by COCO index, `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index)
    }

    /// Whether the pose has the full COCO layout.
    ///
    /// Non-finite values are allowed; comparisons against NaN are false, so
    /// such a keypoint simply never satisfies a rule.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.keypoints.len() == NUM_KEYPOINTS
    }

    /// Count keypoints whose confidence is strictly above `threshold`.
    #[must_use]
    pub fn confident_count(&self, threshold: f32) -> usize {
        self.keypoints
            .iter()
            .filter(|kp| kp.is_confident(threshold))
            .count()
    }
}
