// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for analyzing pose files.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! console output macros and the `analyze` command implementation.

/// CLI arguments.
pub mod args;

/// Console output macros and verbosity control.
pub mod logging;

/// Analysis logic.
pub mod analyze;
