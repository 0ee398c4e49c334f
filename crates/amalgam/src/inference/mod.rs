//! Key and relationship inference.

pub mod naming;
mod primary_key;
mod relationship;

pub use primary_key::{KeyReason, PrimaryKey, detect_primary_key};
pub use relationship::{
    KeyPromotion, Relationship, RelationshipDetection, RelationshipOrigin, detect_relationships,
};
