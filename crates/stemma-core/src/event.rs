//! Event, EventSubject, EventParticipant — the event aggregate.
//!
//! A subject is who the event is fundamentally about (the person born, the
//! couple married); a participant is a secondary attendee with a named role.
//! Subjects decide the event's fate: an event whose last subject is removed
//! is deleted outright, while an event may lose every participant and live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event row. `date` is free text — genealogy dates are routinely fuzzy
/// ("abt 1850", "bef 1912") and are never parsed by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:    Uuid,
  pub tree_id:     Uuid,
  pub created_at:  DateTime<Utc>,
  pub type_id:     Uuid,
  pub date:        Option<String>,
  pub description: Option<String>,
  pub place_id:    Option<Uuid>,
  pub gedcom_id:   i64,
}

/// The scalar fields of an event write.
#[derive(Debug, Clone)]
pub struct EventWrite {
  pub type_id:     Uuid,
  pub date:        Option<String>,
  pub description: Option<String>,
  pub place_id:    Option<Uuid>,
}

// ─── Relationship rows ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSubject {
  pub event_subject_id: Uuid,
  pub tree_id:          Uuid,
  pub event_id:         Uuid,
  pub individual_id:    Uuid,
  pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventParticipant {
  pub event_participant_id: Uuid,
  pub tree_id:              Uuid,
  pub event_id:             Uuid,
  pub individual_id:        Uuid,
  pub role_id:              Uuid,
  pub created_at:           DateTime<Utc>,
}

/// A participant entry as submitted by the caller.
#[derive(Debug, Clone)]
pub struct ParticipantDraft {
  pub individual_id: Uuid,
  pub role_id:       Uuid,
}

/// Input to create/update an event. Subject and participant sets are full
/// replacements, same as names and family children.
#[derive(Debug, Clone)]
pub struct EventDraft {
  pub type_id:      Uuid,
  pub date:         Option<String>,
  pub description:  Option<String>,
  pub place_id:     Option<Uuid>,
  pub subject_ids:  Vec<Uuid>,
  pub participants: Vec<ParticipantDraft>,
}

impl EventDraft {
  pub fn write(&self) -> EventWrite {
    EventWrite {
      type_id:     self.type_id,
      date:        self.date.clone(),
      description: self.description.clone(),
      place_id:    self.place_id,
    }
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Repository-level filter for event listings. `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
  pub ids:       Option<Vec<Uuid>>,
  pub type_ids:  Option<Vec<Uuid>>,
  pub place_ids: Option<Vec<Uuid>>,
}
