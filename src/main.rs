// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;
use pose_sentinel::cli::analyze::run_analysis;
use pose_sentinel::cli::args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            if let Err(e) = run_analysis(&args) {
                pose_sentinel::error!("{e}");
                process::exit(1);
            }
        }
    }
}
