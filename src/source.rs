// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose file input.
//!
//! The pose estimator runs outside this crate; its per-frame output is read
//! from a JSON pose file that also references the frame images:
//!
//! ```json
//! {
//!   "source": "lobby-cam",
//!   "frames": [
//!     {"image": "frame_000.jpg",
//!      "persons": [{"bbox": [10, 20, 110, 300], "keypoints": [[50, 40, 0.9], ...]}]}
//!   ]
//! }
//! ```
//!
//! Relative image paths resolve against the pose file's directory. Person ids
//! are assigned from each person's position within its frame.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentinelError};
use crate::keypoints::{Keypoint, PersonPose};

/// One person as written by the pose estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Bounding box as `[x1, y1, x2, y2]`.
    pub bbox: [f32; 4],
    /// Keypoints as `[x, y, conf]` triples in COCO order.
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

/// One frame as written by the pose estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Path of the frame image.
    pub image: PathBuf,
    /// Detected persons; absent means nobody was detected.
    #[serde(default)]
    pub persons: Vec<PersonRecord>,
}

impl FrameRecord {
    /// Convert the records into poses with frame-local person ids.
    #[must_use]
    pub fn poses(&self) -> Vec<PersonPose> {
        self.persons
            .iter()
            .enumerate()
            .map(|(i, p)| PersonPose::new(p.keypoints.clone(), p.bbox, i))
            .collect()
    }
}

/// Contents of a pose file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFile {
    /// Camera or stream name used in alerts.
    #[serde(default)]
    pub source: Option<String>,
    /// Frames in playback order.
    pub frames: Vec<FrameRecord>,
}

/// Metadata for a frame yielded by [`FrameIterator`].
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Resolved image path.
    pub path: String,
    /// Zero-based frame index.
    pub frame_idx: usize,
    /// Total number of frames in the source.
    pub total_frames: usize,
}

/// A decoded frame together with its poses.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Decoded frame image.
    pub image: DynamicImage,
    /// Poses detected on this frame.
    pub poses: Vec<PersonPose>,
    /// Frame metadata.
    pub meta: SourceMeta,
}

/// A loaded pose file with image paths resolved.
#[derive(Debug, Clone)]
pub struct PoseSource {
    name: String,
    frames: Vec<FrameRecord>,
}

impl PoseSource {
    /// Read and parse a pose file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid pose JSON.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            SentinelError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let file: PoseFile = serde_json::from_str(&text)?;

        let default_name = path
            .file_stem()
            .map_or_else(|| "source".to_string(), |s| s.to_string_lossy().to_string());
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::from_pose_file(file, &default_name, base_dir))
    }

    /// Build a source from parsed contents.
    ///
    /// # Arguments
    ///
    /// * `file` - Parsed pose file.
    /// * `default_name` - Name used when the file does not set `source`.
    /// * `base_dir` - Directory that relative image paths are resolved against.
    #[must_use]
    pub fn from_pose_file(file: PoseFile, default_name: &str, base_dir: &Path) -> Self {
        let name = file
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_name.to_string());
        let frames = file
            .frames
            .into_iter()
            .map(|mut frame| {
                if frame.image.is_relative() {
                    frame.image = base_dir.join(&frame.image);
                }
                frame
            })
            .collect();
        Self { name, frames }
    }

    /// Source name used in alerts.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the source has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame records with resolved image paths.
    #[must_use]
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Iterate over decoded frames.
    #[must_use]
    pub fn iter(&self) -> FrameIterator<'_> {
        FrameIterator {
            frames: &self.frames,
            index: 0,
        }
    }
}

/// Iterator decoding frame images lazily.
pub struct FrameIterator<'a> {
    frames: &'a [FrameRecord],
    index: usize,
}

impl Iterator for FrameIterator<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.frames.get(self.index)?;
        let frame_idx = self.index;
        self.index += 1;

        let path = record.image.to_string_lossy().to_string();
        let frame = image::open(&record.image)
            .map_err(|e| SentinelError::ImageError(format!("Failed to load {path}: {e}")))
            .map(|image| Frame {
                image,
                poses: record.poses(),
                meta: SourceMeta {
                    path,
                    frame_idx,
                    total_frames: self.frames.len(),
                },
            });
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frames.len() - self.index;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const SAMPLE: &str = r#"{
        "source": "lobby",
        "frames": [
            {"image": "f0.png", "persons": [
                {"bbox": [0, 0, 10, 10], "keypoints": [[1, 2, 0.9], [3, 4, 0.8]]},
                {"bbox": [5, 5, 20, 20]}
            ]},
            {"image": "/abs/f1.png"}
        ]
    }"#;

    #[test]
    fn test_parse_pose_file() {
        let file: PoseFile = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(file.source.as_deref(), Some("lobby"));
        assert_eq!(file.frames.len(), 2);

        let poses = file.frames[0].poses();
        assert_eq!(poses.len(), 2);
        assert_eq!(poses[1].person_id, 1);
        assert!(poses[1].keypoints.is_empty());
        assert_eq!(poses[0].keypoints[1], Keypoint::new(3.0, 4.0, 0.8));
        assert!(file.frames[1].persons.is_empty());
    }

    #[test]
    fn test_relative_paths_resolved() {
        let file: PoseFile = serde_json::from_str(SAMPLE).unwrap();
        let source = PoseSource::from_pose_file(file, "fallback", Path::new("/data/run"));
        assert_eq!(source.name(), "lobby");
        assert_eq!(source.frames()[0].image, PathBuf::from("/data/run/f0.png"));
        assert_eq!(source.frames()[1].image, PathBuf::from("/abs/f1.png"));
    }

    #[test]
    fn test_default_name() {
        let file = PoseFile {
            source: Some("  ".to_string()),
            frames: Vec::new(),
        };
        let source = PoseSource::from_pose_file(file, "cam-7", Path::new("."));
        assert_eq!(source.name(), "cam-7");
        assert!(source.is_empty());
    }

    #[test]
    fn test_open_and_iterate() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(8, 6, Rgb([1, 2, 3]))
            .save(dir.path().join("f0.png"))
            .unwrap();
        let json = r#"{"frames": [
            {"image": "f0.png", "persons": [{"bbox": [0, 0, 4, 4], "keypoints": []}]},
            {"image": "missing.png"}
        ]}"#;
        let pose_path = dir.path().join("hallway.json");
        fs::write(&pose_path, json).unwrap();

        let source = PoseSource::open(&pose_path).unwrap();
        assert_eq!(source.name(), "hallway");
        assert_eq!(source.len(), 2);

        let mut iter = source.iter();
        assert_eq!(iter.size_hint(), (2, Some(2)));

        let first = iter.next().unwrap().unwrap();
        assert_eq!(first.image.width(), 8);
        assert_eq!(first.poses.len(), 1);
        assert_eq!(first.meta.frame_idx, 0);
        assert_eq!(first.meta.total_frames, 2);

        assert!(matches!(iter.next(), Some(Err(SentinelError::ImageError(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_open_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let pose_path = dir.path().join("bad.json");
        fs::write(&pose_path, "{\"frames\": 3}").unwrap();
        assert!(matches!(
            PoseSource::open(&pose_path),
            Err(SentinelError::PoseFileError(_))
        ));
        assert!(matches!(
            PoseSource::open(dir.path().join("nope.json")),
            Err(SentinelError::IoError(_))
        ));
    }
}
