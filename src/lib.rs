// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Pose Sentinel
//!
//! Suspicious-action detection on top of a pose estimator. Given the 17 COCO
//! keypoints of each person in a frame, a fixed chain of geometric rules flags
//! people who appear to be falling, holding their hands up, raising a hand,
//! crouching, or taking an aggressive stance. Flagged people are then drawn
//! onto the frame.
//!
//! The pose model and camera stay outside the crate: poses come in as
//! [`PersonPose`] values, as an `ndarray` keypoint tensor
//! ([`PersonPose::from_arrays`]) or as a JSON pose file ([`PoseSource`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use pose_sentinel::{ClassifierConfig, Keypoint, PersonPose, PoseClassifier, Sensitivity};
//!
//! let classifier = PoseClassifier::new(ClassifierConfig::new().with_sensitivity(Sensitivity::Medium));
//!
//! let keypoints = vec![Keypoint::new(100.0, 150.0, 0.9); 17];
//! let pose = PersonPose::new(keypoints, [50.0, 50.0, 150.0, 250.0], 0);
//!
//! if let Some(action) = classifier.classify(&pose) {
//!     println!("person {} flagged: {}", action.person_id, action.action_type);
//! }
//! ```
//!
//! ## Rules
//!
//! Rules run in priority order and the first match wins, so each person yields
//! at most one [`Action`] per frame:
//!
//! | Rule | Action | Severity |
//! |------|--------|----------|
//! | Nose dropped below the shoulder line | `falling` | high |
//! | Both wrists above shoulders or nose | `hands_up` | high |
//! | One wrist raised (medium/high sensitivity) | `hand_raised` | medium |
//! | Nose close to knee height | `crouching` | medium |
//! | Wrist raised and extended sideways | `aggressive_stance` | high |
//!
//! Poses with fewer than 5 keypoints above 0.3 confidence, or malformed
//! keypoint data, are never flagged.
//!
//! ## CLI Usage
//!
//! ```bash
//! pose-sentinel analyze --poses lobby.json
//! pose-sentinel analyze -p lobby.json --sensitivity high --save --report report.json
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoints`] | [`Keypoint`] and [`PersonPose`] |
//! | [`action`] | [`Action`], [`ActionType`], [`Severity`] |
//! | [`config`] | [`Sensitivity`], [`ClassifierConfig`], [`MonitorConfig`] |
//! | [`classifier`] | [`PoseClassifier`] rule chain |
//! | [`annotate`] | [`Annotator`] and the warning panel |
//! | [`alerts`] | [`AlertLog`] with cooldown |
//! | [`monitor`] | [`Monitor`]: detection stride, result reuse, alerting |
//! | [`source`] | [`PoseSource`] JSON pose files |
//! | [`error`] | [`SentinelError`], [`Result`] |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Frame annotation support (default) |
//! | `visualize` | Real-time window display (default) |

// Modules
pub mod action;
pub mod alerts;
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod keypoints;
pub mod monitor;
pub mod source;
pub mod visualizer;

// Re-export main types for convenience
pub use action::{Action, ActionType, Severity};
pub use alerts::{Alert, AlertLog};
#[cfg(feature = "annotate")]
pub use annotate::Annotator;
pub use classifier::PoseClassifier;
pub use config::{ClassifierConfig, MonitorConfig, Sensitivity};
pub use error::{Result, SentinelError};
pub use keypoints::{Keypoint, NUM_KEYPOINTS, PersonPose};
pub use monitor::{FrameReport, Monitor};
pub use source::{Frame, PoseSource, SourceMeta};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
