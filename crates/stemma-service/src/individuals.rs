//! Individual use cases: create/update/delete with full-replace name sets,
//! and the individuals table projection.

use stemma_core::{
  display::{NamePart, display_name},
  individual::{Individual, IndividualDraft, Name, NameDraft, NameWrite},
  policy::{self, EntityKind, OnDelete},
  query::{IndividualSortField, Paged, SortDirection, TableQuery},
  store::TreeStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{Key, Written},
};

// ─── View models ─────────────────────────────────────────────────────────────

/// An individual joined with their names — the shape display surfaces use.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndividualView {
  pub individual: Individual,
  /// Ordered by `created_at` ascending, so the first element is a stable
  /// fallback when no name is flagged primary.
  pub names:      Vec<Name>,
}

impl IndividualView {
  pub fn display_name(&self, part: NamePart) -> String {
    display_name(&self.names, part)
  }
}

/// Birth or death summary shown in the individuals table.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LifeEventSummary {
  pub date:       Option<String>,
  pub place_name: Option<String>,
}

/// One row of the individuals table: the individual, their names, and their
/// birth/death events resolved to date + place name.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndividualRow {
  pub individual: Individual,
  pub names:      Vec<Name>,
  pub birth:      LifeEventSummary,
  pub death:      LifeEventSummary,
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// The positional primacy rule: index 0 of the submitted list is primary,
/// everything else is not.
fn name_writes(names: Vec<NameDraft>) -> Vec<NameWrite> {
  names
    .into_iter()
    .enumerate()
    .map(|(index, draft)| NameWrite {
      kind:       draft.kind,
      first_name: draft.first_name,
      last_name:  draft.last_name,
      surname:    draft.surname,
      is_primary: index == 0,
    })
    .collect()
}

/// Insert an individual and their names. An empty name list inserts no
/// names.
pub async fn create_individual<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  draft: IndividualDraft,
) -> Result<Written<Individual>> {
  let individual = store
    .add_individual(tree_id, draft.gender)
    .await
    .map_err(Error::store)?;

  store
    .insert_names(tree_id, individual.individual_id, name_writes(draft.names))
    .await
    .map_err(Error::store)?;

  Ok(Written::new(individual, vec![Key::Individuals]))
}

/// Update an individual's gender and full-replace their name set: every
/// existing name row is deleted and the submitted list re-inserted, with
/// primacy re-derived from position.
pub async fn update_individual<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  individual_id: Uuid,
  draft: IndividualDraft,
) -> Result<Written<()>> {
  store
    .update_individual(tree_id, individual_id, draft.gender)
    .await
    .map_err(Error::store)?;

  store
    .delete_names_for(tree_id, individual_id)
    .await
    .map_err(Error::store)?;

  store
    .insert_names(tree_id, individual_id, name_writes(draft.names))
    .await
    .map_err(Error::store)?;

  Ok(Written::new(
    (),
    vec![Key::Individuals, Key::Individual(individual_id)],
  ))
}

/// Delete an individual with event-relationship management.
///
/// For every event where the individual is a subject: if they are the *only*
/// subject, the whole event is deleted (participants first, then subjects,
/// then the event row); otherwise only their subject row is removed and the
/// event survives. All of the individual's participant rows are then removed
/// unconditionally — an event survives losing every participant. Finally the
/// individual row itself is deleted; names and family-child rows cascade,
/// and spouse references in families are nulled by the backend.
///
/// The steps run strictly in this order so no step touches rows of an
/// already-deleted event. The sequence is not atomic; a failure aborts the
/// remainder and leaves the completed steps visible.
pub async fn delete_individual<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  individual_id: Uuid,
) -> Result<Written<()>> {
  debug_assert_eq!(
    policy::on_delete(EntityKind::Individual, EntityKind::Name),
    Some(OnDelete::Cascade)
  );
  debug_assert_eq!(
    policy::on_delete(EntityKind::Individual, EntityKind::Family),
    Some(OnDelete::SetNull)
  );

  let subject_rows = store
    .list_subject_rows_for_individual(tree_id, individual_id)
    .await
    .map_err(Error::store)?;

  let mut stale =
    vec![Key::Individuals, Key::Individual(individual_id), Key::Events, Key::Families];

  for row in subject_rows {
    let subject_count = store
      .count_event_subjects(tree_id, row.event_id)
      .await
      .map_err(Error::store)?;

    if subject_count == 1 {
      tracing::debug!(
        event = %row.event_id,
        individual = %individual_id,
        "individual is the only subject; deleting event",
      );
      store
        .delete_event_participants_for_event(tree_id, row.event_id)
        .await
        .map_err(Error::store)?;
      store
        .delete_event_subjects_for_event(tree_id, row.event_id)
        .await
        .map_err(Error::store)?;
      store
        .delete_event(tree_id, row.event_id)
        .await
        .map_err(Error::store)?;
    } else {
      store
        .delete_event_subject_row(tree_id, row.event_id, individual_id)
        .await
        .map_err(Error::store)?;
    }
    stale.push(Key::Event(row.event_id));
  }

  store
    .delete_event_participants_for_individual(tree_id, individual_id)
    .await
    .map_err(Error::store)?;

  store
    .delete_individual(tree_id, individual_id)
    .await
    .map_err(Error::store)?;

  Ok(Written::new((), stale))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

fn assemble(individuals: Vec<Individual>, names: Vec<Name>) -> Vec<IndividualView> {
  individuals
    .into_iter()
    .map(|individual| {
      let names = names
        .iter()
        .filter(|n| n.individual_id == individual.individual_id)
        .cloned()
        .collect();
      IndividualView { individual, names }
    })
    .collect()
}

/// Fetch one individual with their names. Raises `NotFound` — the detail
/// page requires existence.
pub async fn fetch_individual<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  individual_id: Uuid,
) -> Result<IndividualView> {
  let (individual, names) = tokio::try_join!(
    async {
      store
        .get_individual(tree_id, individual_id)
        .await
        .map_err(Error::store)
    },
    async {
      store
        .list_names(tree_id, Some(vec![individual_id]))
        .await
        .map_err(Error::store)
    },
  )?;

  let individual = individual
    .ok_or_else(|| Error::not_found(EntityKind::Individual, individual_id))?;

  Ok(IndividualView { individual, names })
}

/// Fetch individuals with their names, optionally restricted to a set of
/// ids. Two independent queries joined in memory.
pub async fn fetch_individuals<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  ids: Option<Vec<Uuid>>,
) -> Result<Vec<IndividualView>> {
  let ids_for_names = ids.clone();
  let (individuals, names) = tokio::try_join!(
    async {
      store
        .list_individuals(tree_id, ids)
        .await
        .map_err(Error::store)
    },
    async {
      store
        .list_names(tree_id, ids_for_names)
        .await
        .map_err(Error::store)
    },
  )?;

  Ok(assemble(individuals, names))
}

/// The sort key used by the table projection: the primary name only, with
/// missing parts as empty strings. No first-element fallback here — an
/// individual without a flagged primary sorts as blank.
fn sort_key(names: &[Name], field: IndividualSortField) -> String {
  let primary = names.iter().find(|n| n.is_primary);
  let part = match field {
    IndividualSortField::FirstName => {
      primary.and_then(|n| n.first_name.as_deref())
    }
    IndividualSortField::LastName => {
      primary.and_then(|n| n.last_name.as_deref())
    }
  };
  part.unwrap_or("").to_lowercase()
}

/// The individuals table: names plus birth/death decorations, filtered by a
/// case-insensitive name search, sorted (last name ascending by default),
/// and sliced to one page.
pub async fn fetch_individuals_for_table<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  query: TableQuery<IndividualSortField>,
) -> Result<Paged<IndividualRow>> {
  let (views, events, subject_rows, event_types, places) = tokio::try_join!(
    async { fetch_individuals(store, tree_id, None).await },
    async {
      store
        .list_events(tree_id, Default::default())
        .await
        .map_err(Error::store)
    },
    async {
      store
        .list_event_subjects(tree_id, None)
        .await
        .map_err(Error::store)
    },
    async { store.list_event_types(tree_id).await.map_err(Error::store) },
    async {
      store
        .list_places(tree_id, Default::default())
        .await
        .map_err(Error::store)
    },
  )?;

  let type_keys: std::collections::HashMap<Uuid, String> = event_types
    .iter()
    .filter_map(|t| t.key.clone().map(|key| (t.event_type_id, key)))
    .collect();

  let summary_for = |individual_id: Uuid, key: &str| -> LifeEventSummary {
    let event = subject_rows
      .iter()
      .filter(|s| s.individual_id == individual_id)
      .filter_map(|s| events.iter().find(|e| e.event_id == s.event_id))
      .find(|e| type_keys.get(&e.type_id).map(String::as_str) == Some(key));

    match event {
      Some(event) => LifeEventSummary {
        date:       event.date.clone(),
        place_name: event
          .place_id
          .and_then(|pid| places.iter().find(|p| p.place_id == pid))
          .map(|p| p.name.clone()),
      },
      None => LifeEventSummary::default(),
    }
  };

  let mut rows: Vec<IndividualRow> = views
    .into_iter()
    .map(|view| {
      let birth = summary_for(view.individual.individual_id, "birth");
      let death = summary_for(view.individual.individual_id, "death");
      IndividualRow { individual: view.individual, names: view.names, birth, death }
    })
    .collect();

  if let Some(search) = query.search.as_deref().map(str::to_lowercase)
    && !search.is_empty()
  {
    rows.retain(|row| {
      row.names.iter().any(|n| {
        n.first_name
          .as_deref()
          .is_some_and(|f| f.to_lowercase().contains(&search))
          || n
            .last_name
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains(&search))
      })
    });
  }

  let (field, direction) = match query.sort {
    Some(sort) => (sort.field, sort.direction),
    None => (IndividualSortField::LastName, SortDirection::Asc),
  };
  rows.sort_by(|a, b| {
    direction.apply(sort_key(&a.names, field).cmp(&sort_key(&b.names, field)))
  });

  Ok(Paged::slice(rows, query.page))
}
