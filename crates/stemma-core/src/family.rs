//! Family and FamilyChild — the marriage/union aggregate.
//!
//! Spouse links are weak references: deleting an individual nulls the
//! family's `husband_id`/`wife_id` rather than deleting the family. The
//! child rows are owned by the family and cascade with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── FamilyKind ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyKind {
  Married,
  CivilUnion,
  Unmarried,
  Unknown,
}

impl FamilyKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Married => "married",
      Self::CivilUnion => "civil union",
      Self::Unmarried => "unmarried",
      Self::Unknown => "unknown",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "married" => Ok(Self::Married),
      "civil union" => Ok(Self::CivilUnion),
      "unmarried" => Ok(Self::Unmarried),
      "unknown" => Ok(Self::Unknown),
      other => Err(Error::UnknownFamilyKind(other.to_owned())),
    }
  }
}

// ─── Family ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
  pub family_id:  Uuid,
  pub tree_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub husband_id: Option<Uuid>,
  pub wife_id:    Option<Uuid>,
  pub kind:       FamilyKind,
  pub gedcom_id:  i64,
}

/// The scalar fields of a family write. Children travel separately as a
/// full-replacement list.
#[derive(Debug, Clone)]
pub struct FamilyWrite {
  pub husband_id: Option<Uuid>,
  pub wife_id:    Option<Uuid>,
  pub kind:       FamilyKind,
}

// ─── FamilyChild ─────────────────────────────────────────────────────────────

/// Join row linking a family to one of its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyChild {
  pub family_child_id: Uuid,
  pub tree_id:         Uuid,
  pub family_id:       Uuid,
  pub individual_id:   Uuid,
  pub created_at:      DateTime<Utc>,
}

/// A child entry as submitted by the caller. Form rows with no individual
/// selected arrive as `None` and are filtered out before the write — they
/// are not a validation error.
#[derive(Debug, Clone)]
pub struct ChildRef {
  pub individual_id: Option<Uuid>,
}

/// Input to create/update a family. The child set is always a full
/// replacement: every update deletes all existing child rows and re-inserts
/// the submitted list, so surviving children get fresh row ids.
#[derive(Debug, Clone)]
pub struct FamilyDraft {
  pub husband_id: Option<Uuid>,
  pub wife_id:    Option<Uuid>,
  pub kind:       FamilyKind,
  pub children:   Vec<ChildRef>,
}

impl FamilyDraft {
  pub fn write(&self) -> FamilyWrite {
    FamilyWrite {
      husband_id: self.husband_id,
      wife_id:    self.wife_id,
      kind:       self.kind,
    }
  }

  /// The child ids that survive the permissive filter.
  pub fn child_ids(&self) -> Vec<Uuid> {
    self.children.iter().filter_map(|c| c.individual_id).collect()
  }
}
