//! Inspect command - show tables, keys and relationships.

use std::path::PathBuf;

use amalgam::{AmalgamConfig, RelationshipOrigin};
use colored::Colorize;

use super::{load, print_failures};

pub fn run(dir: PathBuf, json_output: bool, config: AmalgamConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (mut amalgam, report) = load(&dir, config)?;
    let keys = amalgam.detect_primary_keys();
    amalgam.detect_relationships();

    if json_output {
        let info = serde_json::json!({
            "directory": dir.display().to_string(),
            "tables": amalgam.table_summaries(),
            "primary_keys": amalgam.primary_keys(),
            "relationships": amalgam.relationships(),
            "sources": report.sources,
            "failures": report.failures,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Tables in".cyan().bold(),
        dir.display().to_string().white()
    );
    println!();
    print_failures(&report);

    for summary in amalgam.table_summaries() {
        let key = match amalgam.primary_key(&summary.name) {
            Some(column) => {
                let reason = keys
                    .get(&summary.name)
                    .map(|k| format!(" ({})", k.reason))
                    .unwrap_or_default();
                format!("{}{}", column.green(), reason.dimmed())
            }
            None => "none".red().to_string(),
        };
        println!(
            "  {:24} {:>8} rows {:>4} cols  key: {}",
            summary.name.white().bold(),
            summary.row_count,
            summary.column_count,
            key
        );
    }
    println!();

    let relationships = amalgam.relationships();
    if relationships.is_empty() {
        println!("{}", "No relationships detected.".yellow());
        println!("Add them with: amalgam merge <DIR> --relate TABLE.COLUMN=TABLE.COLUMN");
        return Ok(());
    }

    println!("{}", "Relationships:".yellow().bold());
    for (index, rel) in relationships.iter().enumerate() {
        let origin = match rel.origin {
            RelationshipOrigin::Detected => "",
            RelationshipOrigin::Manual => " (manual)",
        };
        println!("  [{}] {}{}", index.to_string().cyan(), rel, origin.dimmed());
    }

    let graph = amalgam.relationship_graph();
    if let Some(root) = graph.root() {
        println!();
        println!(
            "Merge would start from {} ({} edges)",
            root.green().bold(),
            graph.degree(root)
        );
    }

    Ok(())
}
