// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Sensitivity;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Analyze Options:
    --poses, -p <POSES>        Pose file (JSON) produced by the pose estimator
    --sensitivity <LEVEL>      low, medium or high [default: medium]
    --detect-every <N>         Classify every N-th frame [default: 3]
    --cooldown <SECONDS>       Alert cooldown per source and action [default: 10]
    --name <NAME>              Source name used in alerts
    --save                     Save annotated frames to runs/sentinel/analyze
    --report <PATH>            Write a JSON report of actions and alerts
    --show                     Display annotated frames in a window
    --font <PATH>              Font for labels (downloaded if omitted)
    --no-overlay               Skip the full-frame warning panel
    --verbose                  Show per-frame output

Examples:
    pose-sentinel analyze --poses lobby.json
    pose-sentinel analyze -p lobby.json --sensitivity high --save
    pose-sentinel analyze -p lobby.json --detect-every 1 --report report.json
    pose-sentinel analyze -p lobby.json --show --cooldown 30"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flag suspicious actions in a sequence of poses and annotate the frames
    Analyze(AnalyzeArgs),
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs {
    /// Pose file (JSON) produced by the pose estimator
    #[arg(short, long)]
    pub poses: PathBuf,

    /// Threshold sensitivity: low, medium or high
    #[arg(long, default_value = "medium")]
    pub sensitivity: Sensitivity,

    /// Run the classifier on every N-th frame
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    pub detect_every: u64,

    /// Alert cooldown in seconds
    #[arg(long, default_value_t = 10.0)]
    pub cooldown: f64,

    /// Source name used in alerts (defaults to the pose file's `source` or stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Save annotated frames to runs/sentinel/analyze
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Write a JSON report of actions and alerts
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Display annotated frames in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Font file for labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Skip the full-frame warning panel
    #[arg(long, default_value_t = false)]
    pub no_overlay: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_args_defaults() {
        let args = Cli::parse_from(["app", "analyze", "--poses", "lobby.json"]);
        match args.command {
            Commands::Analyze(a) => {
                assert_eq!(a.poses, PathBuf::from("lobby.json"));
                assert_eq!(a.sensitivity, Sensitivity::Medium);
                assert_eq!(a.detect_every, 3);
                assert!((a.cooldown - 10.0).abs() < f64::EPSILON);
                assert!(!a.save);
                assert!(!a.show);
                assert!(!a.no_overlay);
                assert!(a.verbose);
                assert!(a.name.is_none());
                assert!(a.report.is_none());
            }
        }
    }

    #[test]
    fn test_analyze_args_custom() {
        let args = Cli::parse_from([
            "app",
            "analyze",
            "-p",
            "cam.json",
            "--sensitivity",
            "HIGH",
            "--detect-every",
            "1",
            "--name",
            "door",
            "--report",
            "out.json",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Analyze(a) => {
                assert_eq!(a.sensitivity, Sensitivity::High);
                assert_eq!(a.detect_every, 1);
                assert_eq!(a.name.as_deref(), Some("door"));
                assert_eq!(a.report, Some(PathBuf::from("out.json")));
                assert!(!a.verbose);
            }
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_sensitivity = ["app", "analyze", "-p", "x.json", "--sensitivity", "max"];
        assert!(Cli::try_parse_from(bad_sensitivity).is_err());
        let bad_stride = ["app", "analyze", "-p", "x.json", "--detect-every", "0"];
        assert!(Cli::try_parse_from(bad_stride).is_err());
        assert!(Cli::try_parse_from(["app", "analyze"]).is_err());
    }
}
