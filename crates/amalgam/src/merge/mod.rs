//! Relationship graph and the merge that walks it.

mod graph;
mod join;
mod planner;

pub use graph::{Edge, RelationshipGraph};
pub use join::{JoinOutput, disambiguate, left_outer_join};
pub use planner::{JoinStep, MergeOptions, MergeResult, MergeState, MergeStatus, merge};
