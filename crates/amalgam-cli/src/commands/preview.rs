//! Preview command - print the first rows of a table.

use std::path::PathBuf;

use amalgam::AmalgamConfig;
use colored::Colorize;

use super::load;

/// Widest a column is printed before truncation.
const MAX_WIDTH: usize = 24;

pub fn run(dir: PathBuf, table: String, rows: usize, config: AmalgamConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (amalgam, _) = load(&dir, config)?;
    let full_rows = amalgam.table(&table).map(|t| t.row_count()).unwrap_or(0);
    let head = amalgam.preview(&table, rows)?;

    let cells: Vec<Vec<String>> = head
        .rows
        .iter()
        .map(|row| row.iter().map(|v| truncate(&v.to_string())).collect())
        .collect();
    let widths: Vec<usize> = head
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(truncate(name).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    println!(
        "{} {} ({} of {} rows)",
        "Preview of".cyan().bold(),
        head.name.white().bold(),
        head.row_count(),
        full_rows
    );
    println!();

    let header: Vec<String> = head
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &w)| format!("{:w$}", truncate(name)))
        .collect();
    println!("{}", header.join("  ").yellow().bold());

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:w$}", cell))
            .collect();
        println!("{}", line.join("  "));
    }

    Ok(())
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_WIDTH {
        return text.to_string();
    }
    let kept: String = text.chars().take(MAX_WIDTH - 1).collect();
    format!("{kept}…")
}
