//! Individual and Name — the person aggregate.
//!
//! An individual owns its names (deleting the individual cascades them).
//! Which name is primary is decided positionally at write time: the first
//! name of a submitted list is primary, all others are not. Bulk rewrites
//! re-derive primacy every time, so the flag is a convention, not a stored
//! invariant the schema could guarantee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Unknown,
}

impl Gender {
  /// The text stored in the `gender` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Male => "male",
      Self::Female => "female",
      Self::Unknown => "unknown",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "male" => Ok(Self::Male),
      "female" => Ok(Self::Female),
      "unknown" => Ok(Self::Unknown),
      other => Err(Error::UnknownGender(other.to_owned())),
    }
  }
}

// ─── Individual ──────────────────────────────────────────────────────────────

/// A person record. Thin on purpose: everything displayable about a person
/// lives in their names and the events they are attached to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
  pub individual_id: Uuid,
  pub tree_id:       Uuid,
  pub created_at:    DateTime<Utc>,
  pub gender:        Gender,
  /// Per-tree numeric sequence used for the human-readable GEDCOM id.
  pub gedcom_id:     i64,
}

// ─── Name ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
  Birth,
  Marriage,
  Nickname,
  Unknown,
}

impl NameKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Birth => "birth",
      Self::Marriage => "marriage",
      Self::Nickname => "nickname",
      Self::Unknown => "unknown",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "birth" => Ok(Self::Birth),
      "marriage" => Ok(Self::Marriage),
      "nickname" => Ok(Self::Nickname),
      "unknown" => Ok(Self::Unknown),
      other => Err(Error::UnknownNameKind(other.to_owned())),
    }
  }
}

/// A stored name row. `is_primary` holds for at most one row per individual
/// under the positional write convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Name {
  pub name_id:       Uuid,
  pub tree_id:       Uuid,
  pub individual_id: Uuid,
  pub created_at:    DateTime<Utc>,
  pub kind:          NameKind,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub surname:       Option<String>,
  pub is_primary:    bool,
}

/// A name as submitted by the caller. Position in the submitted list decides
/// primacy; the draft itself carries no flag.
#[derive(Debug, Clone)]
pub struct NameDraft {
  pub kind:       NameKind,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub surname:    Option<String>,
}

/// A name row ready for insertion — primacy already decided by the caller.
#[derive(Debug, Clone)]
pub struct NameWrite {
  pub kind:       NameKind,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub surname:    Option<String>,
  pub is_primary: bool,
}

/// Input to create/update an individual. The name set is always a full
/// replacement, never a merge.
#[derive(Debug, Clone)]
pub struct IndividualDraft {
  pub gender: Gender,
  pub names:  Vec<NameDraft>,
}
