//! Graph-guided merge of all tables into one.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::graph::RelationshipGraph;
use super::join::left_outer_join;
use crate::error::{PreconditionError, Result};
use crate::inference::Relationship;
use crate::table::{Table, TableRegistry};

/// Merge tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Rounds allowed per loaded table before giving up.
    pub max_rounds_factor: usize,
    /// Join a table once per qualifying edge found in the same round instead
    /// of once overall. Reproduces the legacy duplicate-join behavior.
    pub repeat_joins: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            max_rounds_factor: 2,
            repeat_joins: false,
        }
    }
}

/// Progress of a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    NotStarted,
    RootSelected,
    Merging,
    Completed,
    PartiallyCompleted,
}

/// How a merge ended. Both outcomes are successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// Every table was reached from the root.
    Completed,
    /// Some tables had no path from the root.
    PartiallyCompleted,
}

/// One executed join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStep {
    /// Round the join ran in, starting at 1.
    pub round: usize,
    /// Table brought in by this join.
    pub table: String,
    /// Already merged table whose edge was followed.
    pub from_table: String,
    /// Join column in the merged result.
    pub left_column: String,
    /// Join column in `table`.
    pub right_column: String,
    /// Rows in the result after the join.
    pub rows_after: usize,
}

/// Output of [`merge`].
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The denormalized table.
    pub table: Table,
    /// Table the merge started from.
    pub root: String,
    /// Tables with no path from the root, in load order.
    pub unmerged: Vec<String>,
    pub steps: Vec<JoinStep>,
    pub rounds: usize,
    pub status: MergeStatus,
}

impl MergeResult {
    pub fn is_complete(&self) -> bool {
        self.status == MergeStatus::Completed
    }
}

/// Join every table reachable from the best-connected table into one result.
///
/// Fails only when there are no tables or no relationships. Tables that cannot
/// be reached are reported in [`MergeResult::unmerged`].
pub fn merge(tables: &TableRegistry, relationships: &[Relationship], options: &MergeOptions) -> Result<MergeResult> {
    if tables.is_empty() {
        return Err(PreconditionError::NoTables.into());
    }
    if relationships.is_empty() {
        return Err(PreconditionError::NoRelationships.into());
    }
    MergeExecutor::new(tables, relationships, options).run()
}

struct MergeExecutor<'a> {
    tables: &'a TableRegistry,
    options: &'a MergeOptions,
    graph: RelationshipGraph,
    state: MergeState,
    /// (table, column) → column name in the merged result
    provenance: HashMap<(String, String), String>,
}

impl<'a> MergeExecutor<'a> {
    fn new(tables: &'a TableRegistry, relationships: &[Relationship], options: &'a MergeOptions) -> Self {
        Self {
            tables,
            options,
            graph: RelationshipGraph::build(tables.names(), relationships),
            state: MergeState::NotStarted,
            provenance: HashMap::new(),
        }
    }

    fn transition(&mut self, next: MergeState) {
        debug!(from = ?self.state, to = ?next, "merge state");
        self.state = next;
    }

    fn run(mut self) -> Result<MergeResult> {
        let tables = self.tables;
        let root = self.graph.root().ok_or(PreconditionError::NoTables)?.to_string();
        let Some(root_table) = tables.get(&root) else {
            return Err(PreconditionError::NoTables.into());
        };
        info!(root = %root, edges = self.graph.degree(&root), "selected merge root");
        self.transition(MergeState::RootSelected);

        let mut result = root_table.clone();
        for column in &root_table.columns {
            self.provenance
                .insert((root.clone(), column.clone()), column.clone());
        }

        let mut merged: Vec<String> = vec![root.clone()];
        let mut remaining: IndexSet<String> = tables
            .names()
            .filter(|t| *t != root)
            .map(str::to_string)
            .collect();
        let mut steps = Vec::new();
        let max_rounds = self.options.max_rounds_factor * tables.len();
        let mut rounds = 0;

        self.transition(MergeState::Merging);
        while !remaining.is_empty() && rounds < max_rounds {
            rounds += 1;
            let snapshot = merged.clone();
            let round_start: HashSet<String> = remaining.iter().cloned().collect();
            let mut joined_any = false;

            for table in &snapshot {
                for edge in self.graph.edges(table) {
                    let eligible = if self.options.repeat_joins {
                        round_start.contains(&edge.neighbor)
                    } else {
                        remaining.contains(&edge.neighbor)
                    };
                    if !eligible {
                        continue;
                    }

                    let Some(left_column) = self
                        .provenance
                        .get(&(table.clone(), edge.local_column.clone()))
                        .cloned()
                    else {
                        warn!(
                            table = %table,
                            column = %edge.local_column,
                            "join column missing from merged result, skipping edge"
                        );
                        continue;
                    };
                    let Some(right) = tables.get(&edge.neighbor) else {
                        continue;
                    };

                    info!(
                        table = %edge.neighbor,
                        from = %table,
                        on = %format!("{}={}", left_column, edge.remote_column),
                        "merging table"
                    );
                    let output = match left_outer_join(&result, right, &left_column, &edge.remote_column) {
                        Ok(output) => output,
                        Err(e) => {
                            warn!(table = %edge.neighbor, error = %e, "join failed, skipping edge");
                            continue;
                        }
                    };

                    for (column, renamed) in right.columns.iter().zip(output.right_columns) {
                        self.provenance
                            .insert((right.name.clone(), column.clone()), renamed);
                    }
                    result = output.table;
                    steps.push(JoinStep {
                        round: rounds,
                        table: edge.neighbor.clone(),
                        from_table: table.clone(),
                        left_column,
                        right_column: edge.remote_column.clone(),
                        rows_after: result.row_count(),
                    });

                    if remaining.shift_remove(&edge.neighbor) {
                        merged.push(edge.neighbor.clone());
                    }
                    joined_any = true;
                }
            }

            if !joined_any {
                break;
            }
        }

        let unmerged: Vec<String> = remaining.into_iter().collect();
        let status = if unmerged.is_empty() {
            self.transition(MergeState::Completed);
            MergeStatus::Completed
        } else {
            self.transition(MergeState::PartiallyCompleted);
            warn!(
                tables = %unmerged.join(", "),
                "could not find relationships to merge these tables"
            );
            MergeStatus::PartiallyCompleted
        };

        info!(
            rows = result.row_count(),
            columns = result.column_count(),
            joins = steps.len(),
            rounds,
            "merge finished"
        );

        Ok(MergeResult {
            table: result,
            root,
            unmerged,
            steps,
            rounds,
            status,
        })
    }
}
