//! Declared deletion policies between entities.
//!
//! The relational schema encodes these as foreign-key clauses; this table is
//! the same information as data, so the consistency engine can assert what
//! the backend is expected to do instead of each call site re-deriving it
//! from schema text.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── EntityKind ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Tree,
  Individual,
  Name,
  Family,
  FamilyChild,
  Event,
  EventSubject,
  EventParticipant,
  EventType,
  EventRole,
  Place,
  PlaceType,
}

impl EntityKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Tree => "tree",
      Self::Individual => "individual",
      Self::Name => "name",
      Self::Family => "family",
      Self::FamilyChild => "family child",
      Self::Event => "event",
      Self::EventSubject => "event subject",
      Self::EventParticipant => "event participant",
      Self::EventType => "event type",
      Self::EventRole => "event role",
      Self::Place => "place",
      Self::PlaceType => "place type",
    }
  }

  /// GEDCOM display-id letter for the four user-facing aggregates; empty for
  /// everything else.
  pub fn gedcom_prefix(self) -> &'static str {
    match self {
      Self::Individual => "I",
      Self::Family => "F",
      Self::Event => "E",
      Self::Place => "P",
      _ => "",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Policies ────────────────────────────────────────────────────────────────

/// What happens to a dependent row when its referenced parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
  /// Dependent rows are deleted too.
  Cascade,
  /// The dependent's reference is nulled; the row survives.
  SetNull,
  /// The deletion is forbidden while references exist.
  Restrict,
}

/// One declared edge: deleting `parent` affects `dependent` per `on_delete`.
#[derive(Debug, Clone, Copy)]
pub struct RelationPolicy {
  pub parent:    EntityKind,
  pub dependent: EntityKind,
  pub on_delete: OnDelete,
}

/// Every cross-entity deletion edge in the schema.
pub const DELETE_POLICIES: &[RelationPolicy] = &[
  // A tree deletion wipes the whole tenant.
  RelationPolicy { parent: EntityKind::Tree, dependent: EntityKind::Individual, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Tree, dependent: EntityKind::Family, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Tree, dependent: EntityKind::Event, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Tree, dependent: EntityKind::Place, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Tree, dependent: EntityKind::EventType, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Tree, dependent: EntityKind::EventRole, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Tree, dependent: EntityKind::PlaceType, on_delete: OnDelete::Cascade },
  // Aggregate ownership.
  RelationPolicy { parent: EntityKind::Individual, dependent: EntityKind::Name, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Individual, dependent: EntityKind::FamilyChild, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Individual, dependent: EntityKind::EventSubject, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Individual, dependent: EntityKind::EventParticipant, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Family, dependent: EntityKind::FamilyChild, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Event, dependent: EntityKind::EventSubject, on_delete: OnDelete::Cascade },
  RelationPolicy { parent: EntityKind::Event, dependent: EntityKind::EventParticipant, on_delete: OnDelete::Cascade },
  // Weak references.
  RelationPolicy { parent: EntityKind::Individual, dependent: EntityKind::Family, on_delete: OnDelete::SetNull },
  RelationPolicy { parent: EntityKind::Place, dependent: EntityKind::Place, on_delete: OnDelete::SetNull },
  RelationPolicy { parent: EntityKind::Place, dependent: EntityKind::Event, on_delete: OnDelete::SetNull },
  // Reference data is authoritative.
  RelationPolicy { parent: EntityKind::EventType, dependent: EntityKind::Event, on_delete: OnDelete::Restrict },
  RelationPolicy { parent: EntityKind::EventRole, dependent: EntityKind::EventParticipant, on_delete: OnDelete::Restrict },
  RelationPolicy { parent: EntityKind::PlaceType, dependent: EntityKind::Place, on_delete: OnDelete::Restrict },
];

/// The declared policy between `parent` and `dependent`, if any edge exists.
pub fn on_delete(parent: EntityKind, dependent: EntityKind) -> Option<OnDelete> {
  DELETE_POLICIES
    .iter()
    .find(|p| p.parent == parent && p.dependent == dependent)
    .map(|p| p.on_delete)
}

/// All dependents affected by deleting an entity of kind `parent`.
pub fn dependents_of(
  parent: EntityKind,
) -> impl Iterator<Item = &'static RelationPolicy> {
  DELETE_POLICIES.iter().filter(move |p| p.parent == parent)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn family_owns_its_child_rows() {
    assert_eq!(
      on_delete(EntityKind::Family, EntityKind::FamilyChild),
      Some(OnDelete::Cascade)
    );
  }

  #[test]
  fn spouse_links_are_weak() {
    assert_eq!(
      on_delete(EntityKind::Individual, EntityKind::Family),
      Some(OnDelete::SetNull)
    );
  }

  #[test]
  fn lookups_are_never_cascaded_into() {
    for kind in [EntityKind::EventType, EntityKind::EventRole, EntityKind::PlaceType] {
      assert!(dependents_of(kind).all(|p| p.on_delete == OnDelete::Restrict));
    }
  }
}
