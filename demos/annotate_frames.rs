// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Example demonstrating classification and annotation without a pose file.
//!
//! This example covers:
//! 1. Building poses from a keypoint tensor, as a pose model would return them.
//! 2. Classifying each person and annotating the frame.
//! 3. Adding the warning panel for the primary action and saving the result.

use image::{DynamicImage, Rgb, RgbImage};
use ndarray::{Array2, Array3};
use pose_sentinel::keypoints::kpt;
use pose_sentinel::{
    Annotator, ClassifierConfig, NUM_KEYPOINTS, PersonPose, PoseClassifier, Result, Sensitivity,
};

fn main() -> Result<()> {
    // Two people: one standing with both hands up, one standing normally.
    let mut keypoints = Array3::<f32>::zeros((2, NUM_KEYPOINTS, 3));
    let boxes = Array2::from_shape_vec(
        (2, 4),
        vec![60.0, 40.0, 180.0, 330.0, 260.0, 40.0, 380.0, 330.0],
    )
    .map_err(|e| pose_sentinel::SentinelError::ConfigError(e.to_string()))?;

    for (person, offset) in [(0usize, 0.0f32), (1, 200.0)] {
        let layout = [
            (kpt::NOSE, 120.0, 70.0),
            (kpt::LEFT_SHOULDER, 95.0, 110.0),
            (kpt::RIGHT_SHOULDER, 145.0, 110.0),
            (kpt::LEFT_ELBOW, 90.0, 150.0),
            (kpt::RIGHT_ELBOW, 150.0, 150.0),
            (kpt::LEFT_WRIST, 90.0, 190.0),
            (kpt::RIGHT_WRIST, 150.0, 190.0),
            (kpt::LEFT_HIP, 105.0, 200.0),
            (kpt::RIGHT_HIP, 135.0, 200.0),
            (kpt::LEFT_KNEE, 105.0, 260.0),
            (kpt::RIGHT_KNEE, 135.0, 260.0),
            (kpt::LEFT_ANKLE, 105.0, 320.0),
            (kpt::RIGHT_ANKLE, 135.0, 320.0),
        ];
        for (k, x, y) in layout {
            keypoints[[person, k, 0]] = x + offset;
            keypoints[[person, k, 1]] = y;
            keypoints[[person, k, 2]] = 0.9;
        }
    }
    keypoints[[0, kpt::LEFT_WRIST, 1]] = 50.0;
    keypoints[[0, kpt::RIGHT_WRIST, 1]] = 50.0;

    let poses = PersonPose::from_arrays(&keypoints, &boxes);

    let classifier = PoseClassifier::new(ClassifierConfig::new().with_sensitivity(Sensitivity::Medium));
    let actions = classifier.classify_all(&poses);
    for action in &actions {
        println!("{action}");
    }

    let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(440, 360, Rgb([48, 52, 60])));
    let annotator = Annotator::load_default();
    let mut annotated = annotator.annotate(&frame, &poses, &actions);
    if let Some(primary) = actions.first() {
        annotated = annotator.warning_overlay(
            &annotated,
            primary.action_type,
            &primary.description,
            primary.severity,
        );
    }

    annotated.save("annotated.png")?;
    println!("Saved annotated frame to ./annotated.png");
    Ok(())
}
