//! Consistency audit and repair.
//!
//! The write sequences in this crate are not atomic: a failure between steps
//! can leave a torn state (an event with no subjects, an individual whose
//! name set lost its primary flag). This module is the compensating check —
//! it detects those states and repairs the repairable ones.

use stemma_core::{
  individual::NameWrite,
  store::TreeStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{Key, Written},
};

/// One detected inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
  /// An event with zero subject rows — only reachable through a torn
  /// individual deletion.
  EventWithoutSubjects { event_id: Uuid },
  /// More than one of an individual's names is flagged primary.
  MultiplePrimaryNames { individual_id: Uuid },
  /// An individual has names but none is flagged primary.
  NoPrimaryName { individual_id: Uuid },
  /// A family-child row whose individual no longer exists. Unreachable
  /// while the backend enforces the cascade; reported in case it does not.
  OrphanedFamilyChild { family_child_id: Uuid, individual_id: Uuid },
  /// More than one tree is flagged default. Reported, never repaired —
  /// nothing in the write paths enforces this invariant, and repairing it
  /// would mean guessing which default the user meant.
  MultipleDefaultTrees { tree_ids: Vec<Uuid> },
}

/// Fan out reads over a tree and report every detectable inconsistency.
pub async fn audit_tree<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
) -> Result<Vec<Finding>> {
  let (events, subject_rows, individuals, names, child_rows, trees) = tokio::try_join!(
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
    async {
      store
        .list_individuals(tree_id, None)
        .await
        .map_err(Error::store)
    },
    async { store.list_names(tree_id, None).await.map_err(Error::store) },
    async {
      store
        .list_family_children(tree_id, None)
        .await
        .map_err(Error::store)
    },
    async { store.list_trees().await.map_err(Error::store) },
  )?;

  let mut findings = Vec::new();

  for event in &events {
    let has_subject =
      subject_rows.iter().any(|s| s.event_id == event.event_id);
    if !has_subject {
      findings.push(Finding::EventWithoutSubjects { event_id: event.event_id });
    }
  }

  for individual in &individuals {
    let own: Vec<_> = names
      .iter()
      .filter(|n| n.individual_id == individual.individual_id)
      .collect();
    let primaries = own.iter().filter(|n| n.is_primary).count();
    if primaries > 1 {
      findings.push(Finding::MultiplePrimaryNames {
        individual_id: individual.individual_id,
      });
    } else if primaries == 0 && !own.is_empty() {
      findings.push(Finding::NoPrimaryName {
        individual_id: individual.individual_id,
      });
    }
  }

  for child in &child_rows {
    let exists = individuals
      .iter()
      .any(|i| i.individual_id == child.individual_id);
    if !exists {
      findings.push(Finding::OrphanedFamilyChild {
        family_child_id: child.family_child_id,
        individual_id:   child.individual_id,
      });
    }
  }

  let default_ids: Vec<Uuid> = trees
    .iter()
    .filter(|t| t.is_default)
    .map(|t| t.tree_id)
    .collect();
  if default_ids.len() > 1 {
    findings.push(Finding::MultipleDefaultTrees { tree_ids: default_ids });
  }

  for finding in &findings {
    tracing::warn!(?finding, "consistency audit finding");
  }

  Ok(findings)
}

/// Audit a tree and repair what can be repaired without guessing intent:
/// orphaned events are deleted (participants first), and broken primacy is
/// re-derived by re-writing the name set with the earliest-created name
/// primary. Orphaned child rows and duplicate default trees are reported
/// but left alone.
pub async fn repair_tree<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
) -> Result<Written<Vec<Finding>>> {
  let findings = audit_tree(store, tree_id).await?;
  let mut stale = Vec::new();

  for finding in &findings {
    match finding {
      Finding::EventWithoutSubjects { event_id } => {
        tracing::debug!(event = %event_id, "repair: deleting orphaned event");
        store
          .delete_event_participants_for_event(tree_id, *event_id)
          .await
          .map_err(Error::store)?;
        store
          .delete_event(tree_id, *event_id)
          .await
          .map_err(Error::store)?;
        stale.push(Key::Events);
        stale.push(Key::Event(*event_id));
      }

      Finding::MultiplePrimaryNames { individual_id }
      | Finding::NoPrimaryName { individual_id } => {
        tracing::debug!(individual = %individual_id, "repair: re-deriving primacy");
        let names = store
          .list_names(tree_id, Some(vec![*individual_id]))
          .await
          .map_err(Error::store)?;
        // Earliest-created name becomes primary; the list is already
        // ordered by created_at ascending. Row ids change, same as any
        // full replace.
        let writes: Vec<NameWrite> = names
          .into_iter()
          .enumerate()
          .map(|(index, n)| NameWrite {
            kind:       n.kind,
            first_name: n.first_name,
            last_name:  n.last_name,
            surname:    n.surname,
            is_primary: index == 0,
          })
          .collect();
        store
          .delete_names_for(tree_id, *individual_id)
          .await
          .map_err(Error::store)?;
        store
          .insert_names(tree_id, *individual_id, writes)
          .await
          .map_err(Error::store)?;
        stale.push(Key::Individuals);
        stale.push(Key::Individual(*individual_id));
      }

      Finding::OrphanedFamilyChild { .. }
      | Finding::MultipleDefaultTrees { .. } => {}
    }
  }

  stale.dedup();
  Ok(Written::new(findings, stale))
}
