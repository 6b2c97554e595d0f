//! Event use cases: writes with full-replace subject/participant sets, the
//! events table projection, and the subject/participant partition.

use stemma_core::{
  display::NamePart,
  event::{Event, EventDraft, EventFilter},
  lookup::EventType,
  place::Place,
  policy::{self, EntityKind, OnDelete},
  query::{EventSortField, Paged, SortDirection, TableQuery},
  store::TreeStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{Key, Written},
  individuals::{IndividualView, fetch_individuals},
};

// ─── View models ─────────────────────────────────────────────────────────────

/// One person attached to an event, flattened across the subject and
/// participant tables. `is_subject` is authoritative per row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventPerson {
  pub individual: IndividualView,
  /// Present for participants; subjects carry no role.
  pub role_id:    Option<Uuid>,
  pub is_subject: bool,
}

/// The event detail view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventView {
  pub event:      Event,
  pub event_type: EventType,
  pub place:      Option<Place>,
  /// Subjects first, then participants, each in stored order.
  pub people:     Vec<EventPerson>,
}

/// One row of the events table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventRow {
  pub event:           Event,
  pub event_type_name: String,
  pub place_name:      Option<String>,
  pub subjects:        Vec<IndividualView>,
}

/// Partition a flattened people list into subject ids and participant ids
/// by the per-row `is_subject` flag. Well-formed data never has the same
/// individual on both sides, but malformed rows pass through unchanged
/// rather than crashing.
pub fn partition_people(people: &[EventPerson]) -> (Vec<Uuid>, Vec<Uuid>) {
  let mut subjects = Vec::new();
  let mut participants = Vec::new();
  for person in people {
    let id = person.individual.individual.individual_id;
    if person.is_subject {
      subjects.push(id);
    } else {
      participants.push(id);
    }
  }
  (subjects, participants)
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Insert an event with its subject and participant rows.
pub async fn create_event<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  draft: EventDraft,
) -> Result<Written<Event>> {
  let event = store
    .add_event(tree_id, draft.write())
    .await
    .map_err(Error::store)?;

  store
    .insert_event_subjects(tree_id, event.event_id, draft.subject_ids)
    .await
    .map_err(Error::store)?;

  store
    .insert_event_participants(tree_id, event.event_id, draft.participants)
    .await
    .map_err(Error::store)?;

  Ok(Written::new(event, vec![Key::Events]))
}

/// Update an event's scalar fields and full-replace its subject and
/// participant sets — the same delete-then-reinsert shape as names and
/// family children.
pub async fn update_event<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  event_id: Uuid,
  draft: EventDraft,
) -> Result<Written<()>> {
  store
    .update_event(tree_id, event_id, draft.write())
    .await
    .map_err(Error::store)?;

  store
    .delete_event_subjects_for_event(tree_id, event_id)
    .await
    .map_err(Error::store)?;
  store
    .insert_event_subjects(tree_id, event_id, draft.subject_ids)
    .await
    .map_err(Error::store)?;

  store
    .delete_event_participants_for_event(tree_id, event_id)
    .await
    .map_err(Error::store)?;
  store
    .insert_event_participants(tree_id, event_id, draft.participants)
    .await
    .map_err(Error::store)?;

  Ok(Written::new((), vec![Key::Events, Key::Event(event_id)]))
}

/// Delete an event. Subject and participant rows cascade; event types and
/// roles are restrict-protected and untouched.
pub async fn delete_event<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  event_id: Uuid,
) -> Result<Written<()>> {
  debug_assert_eq!(
    policy::on_delete(EntityKind::Event, EntityKind::EventSubject),
    Some(OnDelete::Cascade)
  );
  debug_assert_eq!(
    policy::on_delete(EntityKind::Event, EntityKind::EventParticipant),
    Some(OnDelete::Cascade)
  );

  store
    .delete_event(tree_id, event_id)
    .await
    .map_err(Error::store)?;

  Ok(Written::new((), vec![Key::Events, Key::Event(event_id)]))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Fetch one event with its type, place, and people resolved. Raises
/// `NotFound` when missing.
pub async fn fetch_event<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  event_id: Uuid,
) -> Result<EventView> {
  let (event, subject_rows, participant_rows) = tokio::try_join!(
    async { store.get_event(tree_id, event_id).await.map_err(Error::store) },
    async {
      store
        .list_event_subjects(tree_id, Some(vec![event_id]))
        .await
        .map_err(Error::store)
    },
    async {
      store
        .list_event_participants(tree_id, Some(vec![event_id]))
        .await
        .map_err(Error::store)
    },
  )?;

  let event =
    event.ok_or_else(|| Error::not_found(EntityKind::Event, event_id))?;

  let mut involved: Vec<Uuid> = subject_rows
    .iter()
    .map(|s| s.individual_id)
    .chain(participant_rows.iter().map(|p| p.individual_id))
    .collect();
  involved.sort_unstable();
  involved.dedup();

  let individuals = fetch_individuals(store, tree_id, Some(involved)).await?;
  let find =
    |id: Uuid| individuals.iter().find(|v| v.individual.individual_id == id);

  let event_type = store
    .get_event_type(tree_id, event.type_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found(EntityKind::EventType, event.type_id))?;

  let place = match event.place_id {
    Some(place_id) => store
      .get_place(tree_id, place_id)
      .await
      .map_err(Error::store)?,
    None => None,
  };

  // Subjects first, then participants; rows without a fetched individual
  // are dropped.
  let people = subject_rows
    .iter()
    .filter_map(|row| {
      find(row.individual_id).map(|individual| EventPerson {
        individual: individual.clone(),
        role_id:    None,
        is_subject: true,
      })
    })
    .chain(participant_rows.iter().filter_map(|row| {
      find(row.individual_id).map(|individual| EventPerson {
        individual: individual.clone(),
        role_id:    Some(row.role_id),
        is_subject: false,
      })
    }))
    .collect();

  Ok(EventView { event, event_type, place, people })
}

fn sort_key(row: &EventRow, field: EventSortField) -> String {
  match field {
    EventSortField::Date => row.event.date.clone().unwrap_or_default(),
    EventSortField::Place => {
      row.place_name.clone().unwrap_or_default().to_lowercase()
    }
  }
}

/// The events table: events with type names, place names, and subject
/// individuals resolved via fan-out queries joined in memory; filtered by a
/// case-insensitive search over descriptions and subject names, sorted
/// (date descending by default), and sliced to one page.
pub async fn fetch_events_for_table<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  query: TableQuery<EventSortField>,
) -> Result<Paged<EventRow>> {
  let (events, subject_rows, individuals, event_types, places) = tokio::try_join!(
    async {
      store
        .list_events(tree_id, EventFilter::default())
        .await
        .map_err(Error::store)
    },
    async {
      store
        .list_event_subjects(tree_id, None)
        .await
        .map_err(Error::store)
    },
    async { fetch_individuals(store, tree_id, None).await },
    async { store.list_event_types(tree_id).await.map_err(Error::store) },
    async {
      store
        .list_places(tree_id, Default::default())
        .await
        .map_err(Error::store)
    },
  )?;

  let mut rows: Vec<EventRow> = events
    .into_iter()
    .map(|event| {
      let event_type_name = event_types
        .iter()
        .find(|t| t.event_type_id == event.type_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "unknown".to_owned());
      let place_name = event
        .place_id
        .and_then(|pid| places.iter().find(|p| p.place_id == pid))
        .map(|p| p.name.clone());
      let subjects = subject_rows
        .iter()
        .filter(|s| s.event_id == event.event_id)
        .filter_map(|s| {
          individuals
            .iter()
            .find(|v| v.individual.individual_id == s.individual_id)
        })
        .cloned()
        .collect();
      EventRow { event, event_type_name, place_name, subjects }
    })
    .collect();

  if let Some(search) = query.search.as_deref().map(str::to_lowercase)
    && !search.is_empty()
  {
    rows.retain(|row| {
      row
        .event
        .description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(&search))
        || row.subjects.iter().any(|subject| {
          subject
            .display_name(NamePart::Full)
            .to_lowercase()
            .contains(&search)
        })
    });
  }

  let (field, direction) = match query.sort {
    Some(sort) => (sort.field, sort.direction),
    None => (EventSortField::Date, SortDirection::Desc),
  };
  rows.sort_by(|a, b| {
    direction.apply(sort_key(a, field).cmp(&sort_key(b, field)))
  });

  Ok(Paged::slice(rows, query.page))
}
