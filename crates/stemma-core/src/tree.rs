//! Tree — the tenant boundary.
//!
//! Every other entity carries a `tree_id` and is invisible outside its tree.
//! A lookup with an id from another tree behaves exactly like a lookup with
//! an id that never existed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A family tree: the top-level container all records are scoped to.
///
/// `is_default` marks the tree selected on first load. At most one tree
/// should be default at a time, but no write path enforces this; the
/// invariant is observed (and reported by the audit module), not maintained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
  pub tree_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub name:       String,
  pub is_default: bool,
}

/// Partial update for a tree. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TreeUpdate {
  pub name:       Option<String>,
  pub is_default: Option<bool>,
}
