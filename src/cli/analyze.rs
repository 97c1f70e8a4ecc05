// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

#[cfg(feature = "annotate")]
use crate::annotate::{Annotator, find_next_run_dir};
#[cfg(feature = "visualize")]
use crate::visualizer::Viewer;

use crate::action::{Action, ActionType};
use crate::alerts::Alert;
use crate::cli::args::AnalyzeArgs;
use crate::config::{ClassifierConfig, MonitorConfig, Sensitivity};
use crate::error::{Result, SentinelError};
use crate::monitor::{FrameReport, Monitor};
use crate::source::PoseSource;
use crate::{VERSION, alert, error, section, success, verbose, warn};

/// Per-frame entry of the JSON report.
#[derive(Debug, Serialize)]
pub struct FrameEntry {
    /// Image path of the frame.
    pub path: String,
    /// Monitor outcome for the frame.
    #[serde(flatten)]
    pub report: FrameReport,
}

/// JSON report written by `--report`.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Source name used in alerts.
    pub source: String,
    /// Sensitivity the run used.
    pub sensitivity: Sensitivity,
    /// Detection stride.
    pub detect_every: usize,
    /// Frames in processing order.
    pub frames: Vec<FrameEntry>,
    /// Every alert raised during the run.
    pub alerts: Vec<Alert>,
}

/// Count actions per type and format as a summary (e.g., "1 falling, 2 hands_up").
pub fn format_action_summary(actions: &[Action]) -> String {
    let mut counts: BTreeMap<usize, (ActionType, usize)> = BTreeMap::new();
    for action in actions {
        let order = ActionType::ALL
            .iter()
            .position(|t| *t == action.action_type)
            .unwrap_or(usize::MAX);
        counts.entry(order).or_insert((action.action_type, 0)).1 += 1;
    }

    counts
        .values()
        .map(|(action_type, count)| format!("{count} {action_type}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn people_label(count: usize) -> String {
    if count == 1 {
        "1 person".to_string()
    } else {
        format!("{count} people")
    }
}

/// Run the analyze command.
///
/// # Errors
///
/// Returns an error if the pose file cannot be loaded, an output cannot be
/// written, or the requested feature is not compiled in. Unreadable frames are
/// reported and skipped.
#[allow(clippy::too_many_lines, clippy::cast_possible_truncation)]
pub fn run_analysis(args: &AnalyzeArgs) -> Result<AnalysisReport> {
    let cooldown = Duration::try_from_secs_f64(args.cooldown).map_err(|e| {
        SentinelError::ConfigError(format!("invalid cooldown {}: {e}", args.cooldown))
    })?;

    crate::cli::logging::set_verbose(args.verbose);

    let pose_source = PoseSource::open(&args.poses)?;
    let source_name = args
        .name
        .clone()
        .unwrap_or_else(|| pose_source.name().to_string());

    let config = MonitorConfig::new()
        .with_classifier(ClassifierConfig::new().with_sensitivity(args.sensitivity))
        .with_detect_every(args.detect_every as usize)
        .with_alert_cooldown(cooldown)
        .with_warning_overlay(!args.no_overlay);

    #[cfg(not(feature = "annotate"))]
    if args.save {
        warn!(
            "--save requires the 'annotate' feature. Compile with --features annotate to enable saving."
        );
    }
    #[cfg(not(feature = "visualize"))]
    if args.show {
        warn!(
            "--show requires the 'visualize' feature. Compile with --features visualize to enable it."
        );
    }

    #[cfg(feature = "annotate")]
    let monitor = {
        let needs_drawing = args.save || (cfg!(feature = "visualize") && args.show);
        let annotator = match &args.font {
            Some(path) => Annotator::from_font_file(path)?,
            None if needs_drawing => Annotator::load_default(),
            None => Annotator::new(),
        };
        if needs_drawing && !annotator.has_font() {
            warn!("No font available, labels will not be drawn.");
        }
        Monitor::new(config.clone()).with_annotator(annotator)
    };
    #[cfg(not(feature = "annotate"))]
    let monitor = Monitor::new(config.clone());
    let mut monitor = monitor;

    #[cfg(feature = "annotate")]
    let save_dir = if args.save {
        let dir = find_next_run_dir("runs/sentinel", "analyze");
        fs::create_dir_all(&dir)?;
        Some(dir)
    } else {
        None
    };

    #[cfg(feature = "visualize")]
    let mut viewer: Option<Viewer> = None;

    println!("Pose Sentinel {VERSION} 🚨 {source_name}");
    verbose!(
        "{} frames, sensitivity={}, detect every {} frames, cooldown {:.1}s",
        pose_source.len(),
        args.sensitivity,
        config.stride(),
        args.cooldown
    );
    verbose!("");

    let mut frames = Vec::with_capacity(pose_source.len());

    for item in pose_source.iter() {
        let frame = match item {
            Ok(frame) => frame,
            Err(e) => {
                error!("{e}");
                continue;
            }
        };
        let meta = &frame.meta;

        let report = monitor.process(&source_name, &frame.poses);
        let summary = format_action_summary(&report.actions);
        verbose!(
            "frame {}/{} {}: {}x{} {}{}{}",
            meta.frame_idx + 1,
            meta.total_frames,
            meta.path,
            frame.image.width(),
            frame.image.height(),
            people_label(report.people),
            if summary.is_empty() { "" } else { ", " },
            summary
        );
        for raised in &report.alerts {
            alert!(raised.severity, "{}", raised.message);
        }

        #[cfg(feature = "annotate")]
        if let Some(dir) = &save_dir {
            let rendered = monitor.render(&source_name, &frame.image);
            let file_name = Path::new(&meta.path).file_name().map_or_else(
                || format!("frame_{}.png", meta.frame_idx),
                |n| n.to_string_lossy().to_string(),
            );
            rendered.save(dir.join(file_name))?;
        }

        #[cfg(feature = "visualize")]
        if args.show {
            let (w, h) = (frame.image.width() as usize, frame.image.height() as usize);
            if viewer.as_ref().is_some_and(|v| !v.fits(w, h)) {
                viewer = None;
            }
            if viewer.is_none() {
                viewer = Some(Viewer::new(&format!("Pose Sentinel - {source_name}"), w, h)?);
            }
            if let Some(v) = viewer.as_mut() {
                let status = monitor
                    .alerts()
                    .recent(1)
                    .map(|a| a.message.clone())
                    .next()
                    .unwrap_or_default();
                let rendered = monitor.render(&source_name, &frame.image);
                if !v.show(&rendered, &status)? || !v.hold(Duration::from_millis(33))? {
                    warn!("Viewer closed, stopping.");
                    frames.push(FrameEntry {
                        path: meta.path.clone(),
                        report,
                    });
                    break;
                }
            }
        }

        frames.push(FrameEntry {
            path: meta.path.clone(),
            report,
        });
    }

    let all_alerts: Vec<Alert> = monitor.alerts().alerts().cloned().collect();
    let flagged: Vec<Action> = frames
        .iter()
        .filter(|f| f.report.detected)
        .flat_map(|f| f.report.actions.iter().cloned())
        .collect();

    section!("Summary");
    let detections = format_action_summary(&flagged);
    verbose!(
        "{} frames, {} detections{}{}",
        frames.len(),
        flagged.len(),
        if detections.is_empty() { "" } else { ": " },
        detections
    );
    verbose!("{} alerts raised", all_alerts.len());

    let report = AnalysisReport {
        source: source_name,
        sensitivity: args.sensitivity,
        detect_every: config.stride(),
        frames,
        alerts: all_alerts,
    };

    if let Some(path) = &args.report {
        write_report(path, &report)?;
        success!("Report written to {}", path.display());
    }

    #[cfg(feature = "annotate")]
    if let Some(dir) = &save_dir {
        success!("Results saved to {}", dir.display());
    }

    Ok(report)
}

/// Write the JSON report, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialized.
pub fn write_report(path: &Path, report: &AnalysisReport) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
