// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::keypoints::kpt;

/// Body skeleton drawn over flagged people (pairs of COCO keypoint indices).
/// Face keypoints are left out.
pub const SKELETON: [[usize; 2]; 12] = [
    [kpt::LEFT_SHOULDER, kpt::RIGHT_SHOULDER],
    [kpt::LEFT_SHOULDER, kpt::LEFT_ELBOW],
    [kpt::LEFT_ELBOW, kpt::LEFT_WRIST],
    [kpt::RIGHT_SHOULDER, kpt::RIGHT_ELBOW],
    [kpt::RIGHT_ELBOW, kpt::RIGHT_WRIST],
    [kpt::LEFT_SHOULDER, kpt::LEFT_HIP],
    [kpt::RIGHT_SHOULDER, kpt::RIGHT_HIP],
    [kpt::LEFT_HIP, kpt::RIGHT_HIP],
    [kpt::LEFT_HIP, kpt::LEFT_KNEE],
    [kpt::LEFT_KNEE, kpt::LEFT_ANKLE],
    [kpt::RIGHT_HIP, kpt::RIGHT_KNEE],
    [kpt::RIGHT_KNEE, kpt::RIGHT_ANKLE],
];

/// Keypoints drawn as joints: shoulders through ankles.
pub const BODY_JOINTS: std::ops::RangeInclusive<usize> = kpt::LEFT_SHOULDER..=kpt::RIGHT_ANKLE;

/// Minimum confidence for a keypoint to be drawn.
pub const DRAW_CONF: f32 = 0.5;
