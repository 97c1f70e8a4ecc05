// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Classifier and monitor configuration.
//!
//! This module defines [`Sensitivity`], the user-facing knob that loosens or
//! tightens the geometric thresholds, together with [`ClassifierConfig`] and
//! [`MonitorConfig`], both built with the usual `with_*` builder pattern.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How eagerly suspicious actions are flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sensitivity {
    /// Stricter thresholds; single raised hands are ignored.
    Low,
    /// Default thresholds.
    #[default]
    Medium,
    /// Looser thresholds.
    High,
}

impl Sensitivity {
    /// Multiplier applied to the falling threshold.
    #[must_use]
    pub const fn multiplier(&self) -> f32 {
        match self {
            Self::Low => 1.2,
            Self::Medium => 1.0,
            Self::High => 0.8,
        }
    }

    /// Whether a single raised hand is reported.
    #[must_use]
    pub const fn flags_single_hand(&self) -> bool {
        matches!(self, Self::Medium | Self::High)
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl FromStr for Sensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "invalid sensitivity '{s}', expected one of: low, medium, high"
            )),
        }
    }
}

/// Configuration for the pose classifier.
///
/// # Example
///
/// ```rust
/// use pose_sentinel::{ClassifierConfig, Sensitivity};
///
/// let config = ClassifierConfig::new()
///     .with_sensitivity(Sensitivity::High)
///     .with_min_keypoints(5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Threshold scaling level.
    pub sensitivity: Sensitivity,
    /// Confidence a keypoint needs to count towards `min_keypoints`.
    pub keypoint_confidence: f32,
    /// Minimum number of confident keypoints before any rule runs.
    pub min_keypoints: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            keypoint_confidence: 0.3,
            min_keypoints: 5,
        }
    }
}

impl ClassifierConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sensitivity level.
    #[must_use]
    pub const fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Set the confidence floor used when counting usable keypoints.
    #[must_use]
    pub const fn with_keypoint_confidence(mut self, threshold: f32) -> Self {
        self.keypoint_confidence = threshold;
        self
    }

    /// Set the minimum number of confident keypoints.
    #[must_use]
    pub const fn with_min_keypoints(mut self, count: usize) -> Self {
        self.min_keypoints = count;
        self
    }
}

/// Configuration for the frame monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Classifier settings.
    pub classifier: ClassifierConfig,
    /// Run the classifier on every n-th frame; other frames reuse the last results.
    pub detect_every: usize,
    /// Minimum interval between two alerts with the same source and action.
    pub alert_cooldown: Duration,
    /// Maximum number of alerts kept in the log.
    pub max_alerts: usize,
    /// Draw the full-frame warning panel for the primary action.
    pub warning_overlay: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            detect_every: 3,
            alert_cooldown: Duration::from_secs(10),
            max_alerts: 100,
            warning_overlay: true,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the classifier configuration.
    #[must_use]
    pub const fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the detection stride. Values below 1 are treated as 1.
    #[must_use]
    pub const fn with_detect_every(mut self, frames: usize) -> Self {
        self.detect_every = if frames == 0 { 1 } else { frames };
        self
    }

    /// Set the alert cooldown.
    #[must_use]
    pub const fn with_alert_cooldown(mut self, cooldown: Duration) -> Self {
        self.alert_cooldown = cooldown;
        self
    }

    /// Set the maximum number of stored alerts.
    #[must_use]
    pub const fn with_max_alerts(mut self, max: usize) -> Self {
        self.max_alerts = max;
        self
    }

    /// Enable or disable the warning panel.
    #[must_use]
    pub const fn with_warning_overlay(mut self, enabled: bool) -> Self {
        self.warning_overlay = enabled;
        self
    }

    /// Effective detection stride, never below 1.
    #[must_use]
    pub const fn stride(&self) -> usize {
        if self.detect_every == 0 { 1 } else { self.detect_every }
    }
}
