//! Place — a node in the self-referential place hierarchy.
//!
//! A place does not own its children: deleting a parent nulls the children's
//! `parent_id` (and any event's `place_id` pointing at it) instead of
//! deleting them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
  pub place_id:   Uuid,
  pub tree_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub name:       String,
  pub type_id:    Option<Uuid>,
  pub parent_id:  Option<Uuid>,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub gedcom_id:  i64,
}

/// Input to create/update a place.
#[derive(Debug, Clone)]
pub struct PlaceDraft {
  pub name:      String,
  pub type_id:   Option<Uuid>,
  pub parent_id: Option<Uuid>,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Which slice of the hierarchy a place listing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
  /// Places with no parent.
  Root,
  /// Direct children of the given place.
  Of(Uuid),
}

/// Repository-level filter for place listings; results are always ordered
/// by name ascending.
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
  pub ids:    Option<Vec<Uuid>>,
  pub parent: Option<ParentFilter>,
}
