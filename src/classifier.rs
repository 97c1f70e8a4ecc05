// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Rule-based suspicious action classifier.
//!
//! Each rule is a pure function over one person's keypoints. Rules run in a
//! fixed priority order and the first one that fires decides the label, so a
//! person yields at most one [`Action`] per frame:
//!
//! 1. falling
//! 2. hands up / hand raised
//! 3. crouching
//! 4. aggressive stance
//!
//! Poses that are malformed or lack enough confident keypoints classify as
//! `None`; nothing in here returns an error.

use crate::action::{Action, ActionType};
use crate::config::{ClassifierConfig, Sensitivity};
use crate::keypoints::{Keypoint, NUM_KEYPOINTS, PersonPose, kpt};

/// Confidence floor for falling and hands-up keypoints.
const BASE_CONF: f32 = 0.3;
/// Confidence floor for crouching keypoints.
const CROUCH_CONF: f32 = 0.5;
/// Confidence floor for aggressive-stance arm keypoints.
const ARM_CONF: f32 = 0.4;

/// Nose drop below the shoulder line, as a fraction of body height.
const FALL_RATIO: f32 = 0.2;
/// Maximum nose-to-knee distance for crouching, as a fraction of body height.
const CROUCH_RATIO: f32 = 0.8;
/// Slack below the shoulder for a "raised" wrist, as a fraction of body height.
const GUARD_RATIO: f32 = 0.1;
/// Horizontal wrist reach for an "extended" arm, as a fraction of shoulder width.
const REACH_RATIO: f32 = 0.5;

/// Keypoints plus derived torso measurements shared by all rules.
struct Body<'a> {
    kp: &'a [Keypoint; NUM_KEYPOINTS],
    shoulder_mid_y: f32,
    body_height: f32,
    shoulder_width: f32,
}

impl<'a> Body<'a> {
    fn new(kp: &'a [Keypoint; NUM_KEYPOINTS]) -> Self {
        let (ls, rs) = (kp[kpt::LEFT_SHOULDER], kp[kpt::RIGHT_SHOULDER]);
        let (lh, rh) = (kp[kpt::LEFT_HIP], kp[kpt::RIGHT_HIP]);

        let shoulder_mid_y = (ls.y + rs.y) / 2.0;
        let hip_mid_y = (lh.y + rh.y) / 2.0;

        Self {
            kp,
            shoulder_mid_y,
            body_height: (hip_mid_y - shoulder_mid_y).abs(),
            shoulder_width: (ls.x - rs.x).abs(),
        }
    }

    fn at(&self, index: usize) -> Keypoint {
        self.kp[index]
    }

    fn all_confident(&self, indices: &[usize], threshold: f32) -> bool {
        indices.iter().all(|&i| self.kp[i].is_confident(threshold))
    }
}

type Rule = fn(&Body<'_>, Sensitivity) -> Option<ActionType>;

/// Rules in priority order.
const RULES: [Rule; 4] = [falling, raised_hands, crouching, aggressive_stance];

fn falling(body: &Body<'_>, sensitivity: Sensitivity) -> Option<ActionType> {
    if !body.all_confident(&[kpt::NOSE, kpt::LEFT_HIP, kpt::RIGHT_HIP], BASE_CONF) {
        return None;
    }
    let limit =
        body.shoulder_mid_y + body.body_height * FALL_RATIO * sensitivity.multiplier();
    (body.at(kpt::NOSE).y > limit).then_some(ActionType::Falling)
}

fn raised_hands(body: &Body<'_>, sensitivity: Sensitivity) -> Option<ActionType> {
    let nose = body.at(kpt::NOSE);
    let is_raised = |wrist: usize, shoulder: usize| {
        let w = body.at(wrist);
        w.is_confident(BASE_CONF)
            && (w.y < body.at(shoulder).y || (nose.is_confident(BASE_CONF) && w.y < nose.y))
    };

    let left = is_raised(kpt::LEFT_WRIST, kpt::LEFT_SHOULDER);
    let right = is_raised(kpt::RIGHT_WRIST, kpt::RIGHT_SHOULDER);

    match (left, right) {
        (true, true) => Some(ActionType::HandsUp),
        (true, false) | (false, true) if sensitivity.flags_single_hand() => {
            Some(ActionType::HandRaised)
        }
        _ => None,
    }
}

fn crouching(body: &Body<'_>, _sensitivity: Sensitivity) -> Option<ActionType> {
    if !body.all_confident(&[kpt::LEFT_KNEE, kpt::RIGHT_KNEE, kpt::NOSE], CROUCH_CONF) {
        return None;
    }
    let knee_mid_y = (body.at(kpt::LEFT_KNEE).y + body.at(kpt::RIGHT_KNEE).y) / 2.0;
    ((body.at(kpt::NOSE).y - knee_mid_y).abs() < body.body_height * CROUCH_RATIO)
        .then_some(ActionType::Crouching)
}

fn aggressive_stance(body: &Body<'_>, _sensitivity: Sensitivity) -> Option<ActionType> {
    let arms = [
        kpt::LEFT_ELBOW,
        kpt::RIGHT_ELBOW,
        kpt::LEFT_WRIST,
        kpt::RIGHT_WRIST,
    ];
    if !body.all_confident(&arms, ARM_CONF) {
        return None;
    }

    let threatening = |wrist: usize, shoulder: usize| {
        let (w, s) = (body.at(wrist), body.at(shoulder));
        let raised = w.y < s.y + body.body_height * GUARD_RATIO;
        let extended = (w.x - s.x).abs() > body.shoulder_width * REACH_RATIO;
        raised && extended
    };

    (threatening(kpt::LEFT_WRIST, kpt::LEFT_SHOULDER)
        || threatening(kpt::RIGHT_WRIST, kpt::RIGHT_SHOULDER))
    .then_some(ActionType::AggressiveStance)
}

/// Flags suspicious actions from single-frame poses.
///
/// # Example
///
/// ```rust
/// use pose_sentinel::{ClassifierConfig, PoseClassifier, Sensitivity};
///
/// let classifier = PoseClassifier::new(ClassifierConfig::new().with_sensitivity(Sensitivity::Low));
/// let actions = classifier.classify_all(&[]);
/// assert!(actions.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PoseClassifier {
    config: ClassifierConfig,
}

impl PoseClassifier {
    /// Create a classifier with the given configuration.
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Get the classifier configuration.
    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Change the sensitivity level.
    pub const fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.config.sensitivity = sensitivity;
    }

    /// Classify one person.
    ///
    /// # Returns
    ///
    /// * The first matching action in priority order, or `None` when the pose is
    ///   malformed, has too few confident keypoints, or matches no rule.
    #[must_use]
    pub fn classify(&self, pose: &PersonPose) -> Option<Action> {
        if !pose.is_well_formed()
            || pose.confident_count(self.config.keypoint_confidence) < self.config.min_keypoints
        {
            return None;
        }
        let kp: &[Keypoint; NUM_KEYPOINTS] = pose.keypoints.as_slice().try_into().ok()?;
        let body = Body::new(kp);

        RULES
            .iter()
            .find_map(|rule| rule(&body, self.config.sensitivity))
            .map(|action_type| Action::flagged(action_type, pose.person_id))
    }

    /// Classify every person in a frame, keeping only flagged ones.
    #[must_use]
    pub fn classify_all(&self, poses: &[PersonPose]) -> Vec<Action> {
        poses.iter().filter_map(|pose| self.classify(pose)).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::action::Severity;

    /// Upright person facing the camera; matches no rule.
    pub(crate) fn standing_pose() -> PersonPose {
        let points = [
            [100.0, 80.0],  // nose
            [95.0, 75.0],   // left eye
            [105.0, 75.0],  // right eye
            [90.0, 78.0],   // left ear
            [110.0, 78.0],  // right ear
            [80.0, 100.0],  // left shoulder
            [120.0, 100.0], // right shoulder
            [75.0, 120.0],  // left elbow
            [125.0, 120.0], // right elbow
            [75.0, 140.0],  // left wrist
            [125.0, 140.0], // right wrist
            [85.0, 140.0],  // left hip
            [115.0, 140.0], // right hip
            [85.0, 180.0],  // left knee
            [115.0, 180.0], // right knee
            [85.0, 220.0],  // left ankle
            [115.0, 220.0], // right ankle
        ];
        let keypoints = points
            .iter()
            .map(|&[x, y]| Keypoint::new(x, y, 0.9))
            .collect();
        PersonPose::new(keypoints, [60.0, 60.0, 140.0, 230.0], 0)
    }

    fn classify(pose: &PersonPose, sensitivity: Sensitivity) -> Option<ActionType> {
        let config = ClassifierConfig::new().with_sensitivity(sensitivity);
        PoseClassifier::new(config)
            .classify(pose)
            .map(|a| a.action_type)
    }

    #[test]
    fn test_standing_is_clean() {
        let pose = standing_pose();
        for s in [Sensitivity::Low, Sensitivity::Medium, Sensitivity::High] {
            assert_eq!(classify(&pose, s), None);
        }
    }

    #[test]
    fn test_falling() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = 145.0;

        let action = PoseClassifier::default().classify(&pose).unwrap();
        assert_eq!(action.action_type, ActionType::Falling);
        assert_eq!(action.severity, Severity::High);
        assert_eq!(action.person_id, 0);
    }

    #[test]
    fn test_falling_threshold_scales_with_sensitivity() {
        // Threshold is 100 + 40 * 0.2 * mult: 109.6 low, 108 medium, 106.4 high.
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = 107.0;
        assert_eq!(classify(&pose, Sensitivity::High), Some(ActionType::Falling));
        assert_eq!(classify(&pose, Sensitivity::Medium), None);

        pose.keypoints[kpt::NOSE].y = 109.0;
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::Falling));
        assert_eq!(classify(&pose, Sensitivity::Low), None);
    }

    #[test]
    fn test_falling_needs_confident_hips() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = 145.0;
        pose.keypoints[kpt::LEFT_HIP].conf = 0.2;
        assert_ne!(classify(&pose, Sensitivity::Medium), Some(ActionType::Falling));
    }

    #[test]
    fn test_hands_up_any_sensitivity() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::LEFT_WRIST].y = 60.0;
        pose.keypoints[kpt::RIGHT_WRIST].y = 60.0;
        for s in [Sensitivity::Low, Sensitivity::Medium, Sensitivity::High] {
            assert_eq!(classify(&pose, s), Some(ActionType::HandsUp));
        }
    }

    #[test]
    fn test_wrist_above_nose_counts_as_raised() {
        // Head bowed just below the shoulder line (falling line is 108),
        // wrists between shoulders and nose.
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = 105.0;
        pose.keypoints[kpt::LEFT_WRIST].y = 102.0;
        pose.keypoints[kpt::RIGHT_WRIST].y = 102.0;
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::HandsUp));

        pose.keypoints[kpt::NOSE].conf = 0.2;
        assert_eq!(classify(&pose, Sensitivity::Medium), None);
    }

    #[test]
    fn test_single_hand_raised() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::LEFT_WRIST].y = 60.0;

        assert_eq!(classify(&pose, Sensitivity::Low), None);
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::HandRaised));
        assert_eq!(classify(&pose, Sensitivity::High), Some(ActionType::HandRaised));
    }

    #[test]
    fn test_single_hand_at_low_falls_through_to_crouching() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::LEFT_WRIST].y = 60.0;
        pose.keypoints[kpt::LEFT_KNEE].y = 110.0;
        pose.keypoints[kpt::RIGHT_KNEE].y = 110.0;

        assert_eq!(classify(&pose, Sensitivity::Low), Some(ActionType::Crouching));
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::HandRaised));
    }

    #[test]
    fn test_single_hand_at_low_falls_through_to_aggressive_stance() {
        let mut pose = standing_pose();
        // Raised and reaching 30px past the left shoulder (shoulder width 40).
        pose.keypoints[kpt::LEFT_WRIST] = Keypoint::new(50.0, 60.0, 0.9);

        assert_eq!(classify(&pose, Sensitivity::Low), Some(ActionType::AggressiveStance));
        assert_eq!(classify(&pose, Sensitivity::High), Some(ActionType::HandRaised));
    }

    #[test]
    fn test_non_finite_unused_keypoint_is_ignored() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = 145.0;
        pose.keypoints[kpt::LEFT_EAR].x = f32::NAN;
        pose.keypoints[kpt::LEFT_ANKLE].y = f32::INFINITY;
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::Falling));

        // A NaN nose fails every comparison, so no rule reading it fires.
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = f32::NAN;
        assert_eq!(classify(&pose, Sensitivity::High), None);
    }

    #[test]
    fn test_unconfident_wrist_is_not_raised() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::LEFT_WRIST].y = 60.0;
        pose.keypoints[kpt::LEFT_WRIST].conf = 0.25;
        pose.keypoints[kpt::RIGHT_WRIST].y = 60.0;
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::HandRaised));
    }

    #[test]
    fn test_crouching() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::LEFT_KNEE].y = 110.0;
        pose.keypoints[kpt::RIGHT_KNEE].y = 110.0;
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::Crouching));

        pose.keypoints[kpt::NOSE].conf = 0.45;
        assert_eq!(classify(&pose, Sensitivity::Medium), None);
    }

    #[test]
    fn test_aggressive_stance() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::LEFT_WRIST].x = 30.0;
        pose.keypoints[kpt::LEFT_WRIST].y = 100.0;
        assert_eq!(
            classify(&pose, Sensitivity::Medium),
            Some(ActionType::AggressiveStance)
        );

        pose.keypoints[kpt::RIGHT_ELBOW].conf = 0.35;
        assert_eq!(classify(&pose, Sensitivity::Medium), None);
    }

    #[test]
    fn test_too_few_confident_keypoints() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = 145.0;
        for (i, kp) in pose.keypoints.iter_mut().enumerate() {
            if ![kpt::NOSE, kpt::LEFT_HIP, kpt::RIGHT_HIP, kpt::LEFT_SHOULDER].contains(&i) {
                kp.conf = 0.2;
            }
        }
        assert_eq!(pose.confident_count(0.3), 4);
        assert_eq!(classify(&pose, Sensitivity::High), None);
    }

    #[test]
    fn test_falling_beats_hands_up() {
        let mut pose = standing_pose();
        pose.keypoints[kpt::NOSE].y = 145.0;
        pose.keypoints[kpt::LEFT_WRIST].y = 60.0;
        pose.keypoints[kpt::RIGHT_WRIST].y = 60.0;
        assert_eq!(classify(&pose, Sensitivity::Medium), Some(ActionType::Falling));
    }

    #[test]
    fn test_malformed_pose_is_ignored() {
        let mut pose = standing_pose();
        pose.keypoints.truncate(10);
        assert_eq!(classify(&pose, Sensitivity::High), None);

        let empty = PersonPose::new(Vec::new(), [0.0; 4], 0);
        assert_eq!(classify(&empty, Sensitivity::High), None);
    }

    #[test]
    fn test_classify_all_keeps_person_ids() {
        let standing = standing_pose();
        let mut fallen = standing_pose();
        fallen.person_id = 1;
        fallen.keypoints[kpt::NOSE].y = 145.0;
        let mut waving = standing_pose();
        waving.person_id = 2;
        waving.keypoints[kpt::RIGHT_WRIST].y = 50.0;

        let actions = PoseClassifier::default().classify_all(&[standing, fallen, waving]);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].person_id, 1);
        assert_eq!(actions[0].action_type, ActionType::Falling);
        assert_eq!(actions[1].person_id, 2);
        assert_eq!(actions[1].action_type, ActionType::HandRaised);
    }
}
