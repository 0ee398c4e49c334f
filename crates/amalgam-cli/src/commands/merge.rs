//! Merge command - join related tables and optionally write the result.

use amalgam::{Amalgam, AmalgamConfig, FileSink, MergeResult, MergeStatus, TabularSink};
use colored::Colorize;

use super::{load, print_failures};
use crate::cli::MergeArgs;

pub fn run(args: MergeArgs, mut config: AmalgamConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.merge.repeat_joins = args.repeat_joins;
    let (mut amalgam, report) = load(&args.dir, config)?;
    prepare(&mut amalgam, &args)?;

    let result = amalgam.merge()?;

    if let Some(ref path) = args.output {
        FileSink::new().write(&result.table, path)?;
    }

    if args.json {
        let summary = serde_json::json!({
            "root": result.root,
            "status": result.status,
            "rows": result.table.row_count(),
            "columns": result.table.columns,
            "rounds": result.rounds,
            "steps": result.steps,
            "unmerged": result.unmerged,
            "failures": report.failures,
            "output": args.output.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_failures(&report);
    println!(
        "{} {} tables starting from {}",
        "Merged".cyan().bold(),
        merged_table_count(&amalgam, &result).to_string().white().bold(),
        result.root.green().bold()
    );
    for step in &result.steps {
        println!(
            "  round {}: {} via {}.{} = {} ({} rows)",
            step.round,
            step.table.white(),
            step.from_table,
            step.left_column,
            step.right_column,
            step.rows_after
        );
    }
    println!();
    println!(
        "Result: {} rows, {} columns",
        result.table.row_count().to_string().white().bold(),
        result.table.column_count().to_string().white().bold()
    );

    if result.status == MergeStatus::PartiallyCompleted {
        println!(
            "{} {}",
            "Not merged (no relationship path):".yellow().bold(),
            result.unmerged.join(", ")
        );
    }

    match args.output {
        Some(path) => println!("Wrote {}", path.display().to_string().green()),
        None => println!("{}", "Use --output to save the merged table.".dimmed()),
    }

    Ok(())
}

/// Detect keys, apply `--key`, detect relationships, then apply
/// `--drop-relationship` and `--relate`.
///
/// Key overrides go in before relationship detection so targets resolve
/// through them.
fn prepare(amalgam: &mut Amalgam, args: &MergeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.no_detect {
        amalgam.detect_primary_keys();
    }
    apply_keys(amalgam, args)?;
    if !args.no_detect {
        amalgam.detect_relationships();
    }
    apply_relationship_edits(amalgam, args)
}

fn apply_keys(amalgam: &mut Amalgam, args: &MergeArgs) -> Result<(), Box<dyn std::error::Error>> {
    for entry in &args.keys {
        let (table, column) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid --key '{entry}'. Expected TABLE=COLUMN"))?;
        amalgam.set_primary_key(table.trim(), column.trim())?;
    }
    Ok(())
}

fn apply_relationship_edits(amalgam: &mut Amalgam, args: &MergeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Highest index first so earlier indexes stay valid
    let mut drops = args.drop.clone();
    drops.sort_unstable();
    drops.dedup();
    for index in drops.into_iter().rev() {
        amalgam.remove_relationship(index)?;
    }

    for entry in &args.relate {
        let (source, target) = parse_relation(entry)
            .ok_or_else(|| format!("Invalid --relate '{entry}'. Expected TABLE.COLUMN=TABLE.COLUMN"))?;
        amalgam.add_relationship(source.0, target.0, source.1, target.1)?;
    }

    Ok(())
}

/// Distinct tables in the result. Repeated joins count once.
fn merged_table_count(amalgam: &Amalgam, result: &MergeResult) -> usize {
    amalgam.tables().len() - result.unmerged.len()
}

/// Split `t1.c1=t2.c2` into `((t1, c1), (t2, c2))`.
fn parse_relation(value: &str) -> Option<((&str, &str), (&str, &str))> {
    let (left, right) = value.split_once('=')?;
    let source = left.trim().split_once('.')?;
    let target = right.trim().split_once('.')?;
    Some((source, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amalgam::{Table, Value};

    fn args(keys: &[&str]) -> MergeArgs {
        MergeArgs {
            dir: "data".into(),
            output: None,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            relate: Vec::new(),
            drop: Vec::new(),
            no_detect: false,
            repeat_joins: false,
            json: false,
        }
    }

    /// Both `id` and `cust_no` are unique, detection picks `id`.
    fn shop(config: AmalgamConfig) -> Amalgam {
        let mut amalgam = Amalgam::with_config(config);
        amalgam.add_table(Table::new(
            "customers",
            vec!["id".into(), "cust_no".into(), "name".into()],
            vec![
                vec![Value::Integer(1), Value::Integer(101), Value::from("A")],
                vec![Value::Integer(2), Value::Integer(102), Value::from("B")],
            ],
        ));
        amalgam.add_table(Table::new(
            "orders",
            vec!["order_id".into(), "customer_id".into()],
            vec![
                vec![Value::Integer(10), Value::Integer(101)],
                vec![Value::Integer(11), Value::Integer(102)],
            ],
        ));
        amalgam
    }

    #[test]
    fn test_key_override_redirects_detected_relationships() {
        let mut amalgam = shop(AmalgamConfig::default());
        prepare(&mut amalgam, &args(&["customers=cust_no"])).unwrap();

        assert_eq!(amalgam.primary_key("customers"), Some("cust_no"));
        let relationships = amalgam.relationships();
        assert!(!relationships.is_empty());
        assert!(relationships
            .iter()
            .all(|r| r.links("orders", "customers", "customer_id", "cust_no")));

        let result = amalgam.merge().unwrap();
        assert_eq!(result.table.row_count(), 2);
    }

    #[test]
    fn test_drop_indexes_follow_key_overrides() {
        let mut amalgam = shop(AmalgamConfig::default());
        let mut merge_args = args(&["customers=cust_no"]);
        merge_args.drop = vec![0];
        merge_args.relate = vec!["orders.order_id=customers.id".to_string()];
        prepare(&mut amalgam, &merge_args).unwrap();

        let relationships = amalgam.relationships();
        assert!(relationships[0].links("orders", "customers", "customer_id", "cust_no"));
        assert!(relationships
            .last()
            .unwrap()
            .links("orders", "customers", "order_id", "id"));
    }

    #[test]
    fn test_merged_count_ignores_repeated_joins() {
        let mut config = AmalgamConfig::default();
        config.merge.repeat_joins = true;
        let mut amalgam = shop(config);
        prepare(&mut amalgam, &args(&["customers=cust_no"])).unwrap();

        let result = amalgam.merge().unwrap();
        assert!(result.steps.len() > 1);
        assert_eq!(merged_table_count(&amalgam, &result), 2);
    }

    #[test]
    fn test_parse_relation() {
        assert_eq!(
            parse_relation("orders.customer_id=customers.id"),
            Some((("orders", "customer_id"), ("customers", "id")))
        );
        assert_eq!(parse_relation("orders.customer_id"), None);
        assert_eq!(parse_relation("orders=customers.id"), None);
    }
}
