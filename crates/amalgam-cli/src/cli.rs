//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use amalgam::{AmalgamConfig, MergeOptions, ParserConfig};

/// Amalgam: infer keys and relationships across tables and merge them
#[derive(Parser)]
#[command(name = "amalgam")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Field delimiter for text files: a single character or "tab" (default: detect)
    #[arg(short, long, global = true)]
    pub delimiter: Option<String>,

    /// Trim whitespace around column names
    #[arg(long, global = true)]
    pub trim_headers: bool,

    /// Remove special characters from column names
    #[arg(long, global = true)]
    pub strip_special: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show tables, detected keys and relationships in a directory
    Inspect {
        /// Directory holding the tables
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the first rows of one table
    Preview {
        /// Directory holding the tables
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Table name (file name without extension)
        #[arg(value_name = "TABLE")]
        table: String,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },

    /// Merge every related table into one
    Merge(MergeArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Directory holding the tables
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Write the merged table here (.csv, .tsv or .xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Set a primary key, e.g. --key customers=id
    #[arg(long = "key", value_name = "TABLE=COLUMN")]
    pub keys: Vec<String>,

    /// Add a relationship, e.g. --relate orders.customer_id=customers.id
    #[arg(long = "relate", value_name = "T1.C1=T2.C2")]
    pub relate: Vec<String>,

    /// Drop a detected relationship by index, counted after `--key` overrides
    /// (same as `inspect` output when no `--key` is given)
    #[arg(long = "drop-relationship", value_name = "INDEX")]
    pub drop: Vec<usize>,

    /// Skip key and relationship detection
    #[arg(long)]
    pub no_detect: bool,

    /// Join a table once per matching relationship instead of once overall
    #[arg(long)]
    pub repeat_joins: bool,

    /// Output the merge report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Engine configuration from the global flags.
    pub fn config(&self) -> Result<AmalgamConfig, String> {
        let delimiter = self.delimiter.as_deref().map(parse_delimiter).transpose()?;
        Ok(AmalgamConfig {
            parser: ParserConfig {
                delimiter,
                trim_headers: self.trim_headers,
                strip_special_chars: self.strip_special,
                ..ParserConfig::default()
            },
            merge: MergeOptions::default(),
        })
    }
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if value.len() == 1 && value.is_ascii() => Ok(value.as_bytes()[0]),
        _ => Err(format!("Invalid delimiter '{value}'. Use a single character or \"tab\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("::").is_err());
    }

    #[test]
    fn test_merge_args() {
        let cli = Cli::parse_from([
            "amalgam",
            "merge",
            "data",
            "--key",
            "customers=id",
            "--relate",
            "orders.customer_id=customers.id",
            "--drop-relationship",
            "1",
            "--trim-headers",
        ]);
        let Commands::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.keys, vec!["customers=id"]);
        assert_eq!(args.drop, vec![1]);
        assert!(cli.trim_headers);
    }
}
