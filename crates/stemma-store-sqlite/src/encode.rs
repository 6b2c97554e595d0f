//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enums are stored as their
//! canonical lowercase discriminants. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use stemma_core::{
  event::{Event, EventParticipant, EventSubject},
  family::{Family, FamilyChild, FamilyKind},
  individual::{Gender, Individual, Name, NameKind},
  lookup::{EventRole, EventType, PlaceType},
  place::Place,
  tree::Tree,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `trees` row.
pub struct RawTree {
  pub tree_id:    String,
  pub created_at: String,
  pub name:       String,
  pub is_default: bool,
}

impl RawTree {
  pub fn into_tree(self) -> Result<Tree> {
    Ok(Tree {
      tree_id:    decode_uuid(&self.tree_id)?,
      created_at: decode_dt(&self.created_at)?,
      name:       self.name,
      is_default: self.is_default,
    })
  }
}

pub struct RawIndividual {
  pub individual_id: String,
  pub tree_id:       String,
  pub created_at:    String,
  pub gender:        String,
  pub gedcom_id:     i64,
}

impl RawIndividual {
  pub fn into_individual(self) -> Result<Individual> {
    Ok(Individual {
      individual_id: decode_uuid(&self.individual_id)?,
      tree_id:       decode_uuid(&self.tree_id)?,
      created_at:    decode_dt(&self.created_at)?,
      gender:        Gender::parse(&self.gender)?,
      gedcom_id:     self.gedcom_id,
    })
  }
}

pub struct RawName {
  pub name_id:       String,
  pub tree_id:       String,
  pub individual_id: String,
  pub created_at:    String,
  pub kind:          String,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub surname:       Option<String>,
  pub is_primary:    bool,
}

impl RawName {
  pub fn into_name(self) -> Result<Name> {
    Ok(Name {
      name_id:       decode_uuid(&self.name_id)?,
      tree_id:       decode_uuid(&self.tree_id)?,
      individual_id: decode_uuid(&self.individual_id)?,
      created_at:    decode_dt(&self.created_at)?,
      kind:          NameKind::parse(&self.kind)?,
      first_name:    self.first_name,
      last_name:     self.last_name,
      surname:       self.surname,
      is_primary:    self.is_primary,
    })
  }
}

pub struct RawFamily {
  pub family_id:  String,
  pub tree_id:    String,
  pub created_at: String,
  pub husband_id: Option<String>,
  pub wife_id:    Option<String>,
  pub kind:       String,
  pub gedcom_id:  i64,
}

impl RawFamily {
  pub fn into_family(self) -> Result<Family> {
    Ok(Family {
      family_id:  decode_uuid(&self.family_id)?,
      tree_id:    decode_uuid(&self.tree_id)?,
      created_at: decode_dt(&self.created_at)?,
      husband_id: decode_opt_uuid(self.husband_id.as_deref())?,
      wife_id:    decode_opt_uuid(self.wife_id.as_deref())?,
      kind:       FamilyKind::parse(&self.kind)?,
      gedcom_id:  self.gedcom_id,
    })
  }
}

pub struct RawFamilyChild {
  pub family_child_id: String,
  pub tree_id:         String,
  pub family_id:       String,
  pub individual_id:   String,
  pub created_at:      String,
}

impl RawFamilyChild {
  pub fn into_family_child(self) -> Result<FamilyChild> {
    Ok(FamilyChild {
      family_child_id: decode_uuid(&self.family_child_id)?,
      tree_id:         decode_uuid(&self.tree_id)?,
      family_id:       decode_uuid(&self.family_id)?,
      individual_id:   decode_uuid(&self.individual_id)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawEvent {
  pub event_id:    String,
  pub tree_id:     String,
  pub created_at:  String,
  pub type_id:     String,
  pub date:        Option<String>,
  pub description: Option<String>,
  pub place_id:    Option<String>,
  pub gedcom_id:   i64,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:    decode_uuid(&self.event_id)?,
      tree_id:     decode_uuid(&self.tree_id)?,
      created_at:  decode_dt(&self.created_at)?,
      type_id:     decode_uuid(&self.type_id)?,
      date:        self.date,
      description: self.description,
      place_id:    decode_opt_uuid(self.place_id.as_deref())?,
      gedcom_id:   self.gedcom_id,
    })
  }
}

pub struct RawEventSubject {
  pub event_subject_id: String,
  pub tree_id:          String,
  pub event_id:         String,
  pub individual_id:    String,
  pub created_at:       String,
}

impl RawEventSubject {
  pub fn into_event_subject(self) -> Result<EventSubject> {
    Ok(EventSubject {
      event_subject_id: decode_uuid(&self.event_subject_id)?,
      tree_id:          decode_uuid(&self.tree_id)?,
      event_id:         decode_uuid(&self.event_id)?,
      individual_id:    decode_uuid(&self.individual_id)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawEventParticipant {
  pub event_participant_id: String,
  pub tree_id:              String,
  pub event_id:             String,
  pub individual_id:        String,
  pub role_id:              String,
  pub created_at:           String,
}

impl RawEventParticipant {
  pub fn into_event_participant(self) -> Result<EventParticipant> {
    Ok(EventParticipant {
      event_participant_id: decode_uuid(&self.event_participant_id)?,
      tree_id:              decode_uuid(&self.tree_id)?,
      event_id:             decode_uuid(&self.event_id)?,
      individual_id:        decode_uuid(&self.individual_id)?,
      role_id:              decode_uuid(&self.role_id)?,
      created_at:           decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from any of the three lookup tables — they share a
/// column shape and differ only in which domain type they decode into.
pub struct RawLookup {
  pub id:         String,
  pub tree_id:    String,
  pub created_at: String,
  pub name:       String,
  pub key:        Option<String>,
}

impl RawLookup {
  pub fn into_event_type(self) -> Result<EventType> {
    Ok(EventType {
      event_type_id: decode_uuid(&self.id)?,
      tree_id:       decode_uuid(&self.tree_id)?,
      created_at:    decode_dt(&self.created_at)?,
      name:          self.name,
      key:           self.key,
    })
  }

  pub fn into_event_role(self) -> Result<EventRole> {
    Ok(EventRole {
      event_role_id: decode_uuid(&self.id)?,
      tree_id:       decode_uuid(&self.tree_id)?,
      created_at:    decode_dt(&self.created_at)?,
      name:          self.name,
      key:           self.key,
    })
  }

  pub fn into_place_type(self) -> Result<PlaceType> {
    Ok(PlaceType {
      place_type_id: decode_uuid(&self.id)?,
      tree_id:       decode_uuid(&self.tree_id)?,
      created_at:    decode_dt(&self.created_at)?,
      name:          self.name,
      key:           self.key,
    })
  }
}

pub struct RawPlace {
  pub place_id:   String,
  pub tree_id:    String,
  pub created_at: String,
  pub name:       String,
  pub type_id:    Option<String>,
  pub parent_id:  Option<String>,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub gedcom_id:  i64,
}

impl RawPlace {
  pub fn into_place(self) -> Result<Place> {
    Ok(Place {
      place_id:   decode_uuid(&self.place_id)?,
      tree_id:    decode_uuid(&self.tree_id)?,
      created_at: decode_dt(&self.created_at)?,
      name:       self.name,
      type_id:    decode_opt_uuid(self.type_id.as_deref())?,
      parent_id:  decode_opt_uuid(self.parent_id.as_deref())?,
      latitude:   self.latitude,
      longitude:  self.longitude,
      gedcom_id:  self.gedcom_id,
    })
  }
}
