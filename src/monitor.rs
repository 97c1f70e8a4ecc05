// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame-synchronous monitoring loop state.
//!
//! The classifier runs only on every `detect_every`-th frame of a source; in
//! between, the last results are reused so annotation stays on screen every
//! frame. Actions found on detection frames feed the [`AlertLog`].

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;

use crate::action::Action;
use crate::alerts::{Alert, AlertLog};
use crate::classifier::PoseClassifier;
use crate::config::{MonitorConfig, Sensitivity};
use crate::keypoints::PersonPose;

#[cfg(feature = "annotate")]
use crate::annotate::Annotator;
#[cfg(feature = "annotate")]
use image::DynamicImage;

/// Outcome of processing one frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameReport {
    /// One-based frame counter of the source.
    pub frame_number: usize,
    /// Whether the classifier ran on this frame.
    pub detected: bool,
    /// Number of people in the results in effect for this frame.
    pub people: usize,
    /// Actions in effect for this frame (possibly carried over).
    pub actions: Vec<Action>,
    /// Alerts raised on this frame.
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default)]
struct SourceState {
    frame_count: usize,
    poses: Vec<PersonPose>,
    actions: Vec<Action>,
}

/// Per-source classification, result reuse and alerting.
#[derive(Debug)]
pub struct Monitor {
    config: MonitorConfig,
    classifier: PoseClassifier,
    alerts: AlertLog,
    sources: HashMap<String, SourceState>,
    #[cfg(feature = "annotate")]
    annotator: Annotator,
}

impl Monitor {
    /// Create a monitor. Labels are not drawn until a font is set.
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            classifier: PoseClassifier::new(config.classifier),
            alerts: AlertLog::new(config.alert_cooldown, config.max_alerts),
            sources: HashMap::new(),
            #[cfg(feature = "annotate")]
            annotator: Annotator::new(),
            config,
        }
    }

    /// Replace the annotator, e.g. with one that has a font loaded.
    #[cfg(feature = "annotate")]
    #[must_use]
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// Get the monitor configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Change the sensitivity for subsequent detections.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.config.classifier.sensitivity = sensitivity;
        self.classifier.set_sensitivity(sensitivity);
    }

    /// Alert history.
    #[must_use]
    pub const fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    /// Process the poses of the next frame of `source`.
    pub fn process(&mut self, source: &str, poses: &[PersonPose]) -> FrameReport {
        self.process_at(source, poses, Instant::now())
    }

    /// Process the poses of the next frame of `source`, observed at `now`.
    pub fn process_at(&mut self, source: &str, poses: &[PersonPose], now: Instant) -> FrameReport {
        let state = self.sources.entry(source.to_string()).or_default();
        state.frame_count += 1;
        let frame_number = state.frame_count;
        let detected = frame_number % self.config.stride() == 0;

        let mut raised = Vec::new();
        if detected {
            state.poses = poses.to_vec();
            state.actions = self.classifier.classify_all(poses);
            for action in &state.actions {
                if let Some(alert) = self.alerts.record_at(source, action, frame_number, now) {
                    raised.push(alert.clone());
                }
            }
        }

        FrameReport {
            frame_number,
            detected,
            people: state.poses.len(),
            actions: state.actions.clone(),
            alerts: raised,
        }
    }

    /// Actions currently in effect for `source`.
    #[must_use]
    pub fn current_actions(&self, source: &str) -> &[Action] {
        self.sources.get(source).map_or(&[], |s| s.actions.as_slice())
    }

    /// Draw the results in effect for `source` onto a frame.
    ///
    /// Adds the warning panel for the first action when enabled.
    #[cfg(feature = "annotate")]
    #[must_use]
    pub fn render(&self, source: &str, frame: &DynamicImage) -> DynamicImage {
        let Some(state) = self.sources.get(source) else {
            return frame.clone();
        };
        let annotated = self.annotator.annotate(frame, &state.poses, &state.actions);

        match state.actions.first() {
            Some(primary) if self.config.warning_overlay => self.annotator.warning_overlay(
                &annotated,
                primary.action_type,
                &primary.description,
                primary.severity,
            ),
            _ => annotated,
        }
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}
