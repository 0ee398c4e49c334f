//! CLI command implementations.

pub mod inspect;
pub mod merge;
pub mod preview;

use std::path::Path;

use colored::Colorize;
use amalgam::{Amalgam, AmalgamConfig, LoadReport};

/// Load `dir` into a fresh engine, printing any files that were skipped.
pub fn load(dir: &Path, config: AmalgamConfig) -> Result<(Amalgam, LoadReport), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }

    let mut amalgam = Amalgam::with_config(config);
    let report = amalgam.load_directory(dir)?;

    if report.loaded.is_empty() {
        return Err(format!("No tables found in {}", dir.display()).into());
    }
    Ok((amalgam, report))
}

/// Print files that could not be loaded.
pub fn print_failures(report: &LoadReport) {
    if !report.has_failures() {
        return;
    }
    println!("{}", "Skipped files:".yellow().bold());
    for failure in &report.failures {
        println!("  {} {}", failure.path.display().to_string().white(), failure.message.red());
    }
    println!();
}
