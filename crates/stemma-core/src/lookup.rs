//! Lookup entities: EventType, EventRole, PlaceType.
//!
//! Long-lived reference data, scoped per tree and seeded at tree creation.
//! Rows referenced by events, participants, or places are delete-restricted;
//! nothing ever cascades into a lookup table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventType {
  pub event_type_id: Uuid,
  pub tree_id:       Uuid,
  pub created_at:    DateTime<Utc>,
  pub name:          String,
  /// Stable machine key ("birth", "death", …) for seeded rows; user-created
  /// rows may have none.
  pub key:           Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRole {
  pub event_role_id: Uuid,
  pub tree_id:       Uuid,
  pub created_at:    DateTime<Utc>,
  pub name:          String,
  pub key:           Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceType {
  pub place_type_id: Uuid,
  pub tree_id:       Uuid,
  pub created_at:    DateTime<Utc>,
  pub name:          String,
  pub key:           Option<String>,
}

/// Input to create or rename a lookup row.
#[derive(Debug, Clone)]
pub struct LookupDraft {
  pub name: String,
  pub key:  Option<String>,
}

impl LookupDraft {
  pub fn seeded(name: &str, key: &str) -> Self {
    Self { name: name.to_owned(), key: Some(key.to_owned()) }
  }
}

// ─── Seed data ───────────────────────────────────────────────────────────────

/// `(name, key)` pairs inserted into every new tree.
pub const DEFAULT_EVENT_TYPES: &[(&str, &str)] = &[
  ("Birth", "birth"),
  ("Death", "death"),
  ("Marriage", "marriage"),
  ("Baptism", "baptism"),
  ("Burial", "burial"),
  ("Immigration", "immigration"),
  ("Census", "census"),
  ("Engagement", "engagement"),
  ("Separation", "separation"),
  ("Retirement", "retirement"),
  ("Other", "other"),
];

pub const DEFAULT_EVENT_ROLES: &[(&str, &str)] = &[
  ("Subject", "subject"),
  ("Husband", "husband"),
  ("Wife", "wife"),
  ("Mother", "mother"),
  ("Father", "father"),
  ("Witness", "witness"),
  ("Godfather", "godfather"),
  ("Godmother", "godmother"),
  ("Officiant", "officiant"),
  ("Father of Husband", "father_of_husband"),
  ("Mother of Husband", "mother_of_husband"),
  ("Father of Wife", "father_of_wife"),
  ("Mother of Wife", "mother_of_wife"),
  ("Other", "other"),
];

pub const DEFAULT_PLACE_TYPES: &[(&str, &str)] = &[
  ("Country", "country"),
  ("State", "state"),
  ("City", "city"),
  ("County", "county"),
  ("Province", "province"),
  ("Region", "region"),
  ("District", "district"),
  ("Village", "village"),
  ("Town", "town"),
  ("Address", "address"),
];
