// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the sentinel library

use std::fs;

use image::{DynamicImage, Rgb, RgbImage};
use ndarray::{Array2, Array3};
use pose_sentinel::keypoints::kpt;
#[cfg(feature = "annotate")]
use pose_sentinel::Annotator;
use pose_sentinel::{
    ActionType, ClassifierConfig, Keypoint, Monitor, MonitorConfig, NUM_KEYPOINTS, PersonPose,
    PoseClassifier, PoseSource, Sensitivity, Severity,
};

/// Shoulders at y=100, hips at y=140, nose above the shoulders.
fn upright(person_id: usize) -> PersonPose {
    let mut kp = vec![Keypoint::new(100.0, 80.0, 0.9); NUM_KEYPOINTS];
    kp[kpt::LEFT_SHOULDER] = Keypoint::new(80.0, 100.0, 0.9);
    kp[kpt::RIGHT_SHOULDER] = Keypoint::new(120.0, 100.0, 0.9);
    kp[kpt::LEFT_ELBOW] = Keypoint::new(75.0, 120.0, 0.9);
    kp[kpt::RIGHT_ELBOW] = Keypoint::new(125.0, 120.0, 0.9);
    kp[kpt::LEFT_WRIST] = Keypoint::new(75.0, 140.0, 0.9);
    kp[kpt::RIGHT_WRIST] = Keypoint::new(125.0, 140.0, 0.9);
    kp[kpt::LEFT_HIP] = Keypoint::new(85.0, 140.0, 0.9);
    kp[kpt::RIGHT_HIP] = Keypoint::new(115.0, 140.0, 0.9);
    kp[kpt::LEFT_KNEE] = Keypoint::new(85.0, 180.0, 0.9);
    kp[kpt::RIGHT_KNEE] = Keypoint::new(115.0, 180.0, 0.9);
    kp[kpt::LEFT_ANKLE] = Keypoint::new(85.0, 220.0, 0.9);
    kp[kpt::RIGHT_ANKLE] = Keypoint::new(115.0, 220.0, 0.9);
    PersonPose::new(kp, [60.0, 60.0, 140.0, 230.0], person_id)
}

fn classifier(sensitivity: Sensitivity) -> PoseClassifier {
    PoseClassifier::new(ClassifierConfig::new().with_sensitivity(sensitivity))
}

#[test]
fn test_head_below_shoulders_is_falling() {
    let mut pose = upright(0);
    pose.keypoints[kpt::NOSE].y = 145.0;

    let action = classifier(Sensitivity::Medium).classify(&pose).unwrap();
    assert_eq!(action.action_type, ActionType::Falling);
    assert_eq!(action.severity, Severity::High);
}

#[test]
fn test_both_wrists_up_at_every_sensitivity() {
    let mut pose = upright(0);
    pose.keypoints[kpt::LEFT_WRIST].y = 70.0;
    pose.keypoints[kpt::RIGHT_WRIST].y = 70.0;

    for s in [Sensitivity::Low, Sensitivity::Medium, Sensitivity::High] {
        let action = classifier(s).classify(&pose).unwrap();
        assert_eq!(action.action_type, ActionType::HandsUp);
    }
}

#[test]
fn test_one_wrist_up_ignored_at_low() {
    let mut pose = upright(0);
    pose.keypoints[kpt::RIGHT_WRIST].y = 70.0;
    assert!(classifier(Sensitivity::Low).classify(&pose).is_none());
}

#[test]
fn test_few_confident_keypoints_never_flag() {
    let mut pose = upright(0);
    pose.keypoints[kpt::NOSE].y = 145.0;
    for kp in pose.keypoints.iter_mut().skip(kpt::LEFT_ELBOW) {
        kp.conf = 0.1;
    }
    // nose, eyes, ears and shoulders remain: 7 points, still enough.
    assert!(pose.confident_count(0.3) >= 5);
    for kp in pose.keypoints.iter_mut().take(kpt::LEFT_ELBOW).skip(2) {
        kp.conf = 0.1;
    }
    assert_eq!(pose.confident_count(0.3), 2);
    assert!(classifier(Sensitivity::High).classify(&pose).is_none());
}

#[test]
fn test_first_rule_wins() {
    let mut pose = upright(0);
    pose.keypoints[kpt::NOSE].y = 145.0;
    pose.keypoints[kpt::LEFT_WRIST].y = 60.0;
    pose.keypoints[kpt::RIGHT_WRIST].y = 60.0;

    let actions = classifier(Sensitivity::Medium).classify_all(&[pose]);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action_type, ActionType::Falling);
}

#[test]
fn test_tensor_input() {
    let mut kpts = Array3::<f32>::zeros((2, NUM_KEYPOINTS, 3));
    let mut boxes = Array2::<f32>::zeros((2, 6));
    for (i, person) in [upright(0), upright(1)].iter().enumerate() {
        for (k, kp) in person.keypoints.iter().enumerate() {
            kpts[[i, k, 0]] = kp.x;
            kpts[[i, k, 1]] = kp.y;
            kpts[[i, k, 2]] = kp.conf;
        }
        for (c, v) in person.bbox.iter().enumerate() {
            boxes[[i, c]] = *v;
        }
    }
    kpts[[1, kpt::NOSE, 1]] = 150.0;

    let poses = PersonPose::from_arrays(&kpts, &boxes);
    let actions = classifier(Sensitivity::Medium).classify_all(&poses);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].person_id, 1);
}

#[cfg(feature = "annotate")]
#[test]
fn test_annotator_without_actions_is_identity() {
    let frame = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |x, y| {
        Rgb([(x * 3) as u8, (y * 5) as u8, 7])
    }));
    let out = Annotator::new().annotate(&frame, &[upright(0)], &[]);
    assert_eq!(out.as_bytes(), frame.as_bytes());
}

#[cfg(feature = "annotate")]
#[test]
fn test_pose_file_through_monitor() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..3 {
        RgbImage::from_pixel(320, 240, Rgb([30, 30, 30]))
            .save(dir.path().join(format!("f{i}.png")))
            .unwrap();
    }

    let mut fallen = upright(0);
    fallen.keypoints[kpt::NOSE].y = 150.0;
    let persons = serde_json::json!([{
        "bbox": fallen.bbox,
        "keypoints": fallen.keypoints,
    }]);
    let file = serde_json::json!({
        "source": "garage",
        "frames": [
            {"image": "f0.png", "persons": persons},
            {"image": "f1.png", "persons": persons},
            {"image": "f2.png", "persons": persons},
        ]
    });
    let pose_path = dir.path().join("poses.json");
    fs::write(&pose_path, serde_json::to_string(&file).unwrap()).unwrap();

    let source = PoseSource::open(&pose_path).unwrap();
    let mut monitor = Monitor::new(MonitorConfig::new().with_detect_every(3));

    let mut last = None;
    for frame in source.iter() {
        let frame = frame.unwrap();
        let report = monitor.process(source.name(), &frame.poses);
        last = Some((report, monitor.render(source.name(), &frame.image)));
    }

    let (report, rendered) = last.unwrap();
    assert!(report.detected);
    assert_eq!(report.actions[0].action_type, ActionType::Falling);
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].message, "[garage] Fall detected or person lying down");
    assert_eq!(rendered.to_rgb8().get_pixel(60, 60).0, [255, 0, 0]);
}
