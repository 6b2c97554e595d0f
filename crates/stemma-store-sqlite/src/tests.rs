//! Integration tests for `SqliteStore` against an in-memory database.

use stemma_core::{
  event::{EventFilter, EventWrite, ParticipantDraft},
  family::{FamilyKind, FamilyWrite},
  individual::{Gender, NameKind, NameWrite},
  lookup::LookupDraft,
  place::{ParentFilter, PlaceDraft, PlaceFilter},
  store::{FamilyFilter, TreeStore},
  tree::TreeUpdate,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn tree(s: &SqliteStore) -> Uuid {
  s.add_tree("test".into(), false).await.unwrap().tree_id
}

fn name_write(first: &str, last: &str, is_primary: bool) -> NameWrite {
  NameWrite {
    kind:       NameKind::Birth,
    first_name: Some(first.into()),
    last_name:  Some(last.into()),
    surname:    None,
    is_primary,
  }
}

fn place_draft(name: &str, parent_id: Option<Uuid>) -> PlaceDraft {
  PlaceDraft {
    name: name.into(),
    type_id: None,
    parent_id,
    latitude: None,
    longitude: None,
  }
}

// ─── Trees ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_tree() {
  let s = store().await;

  let tree = s.add_tree("smith".into(), true).await.unwrap();
  assert!(tree.is_default);

  let fetched = s.get_tree(tree.tree_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "smith");
  assert!(fetched.is_default);
}

#[tokio::test]
async fn get_tree_missing_returns_none() {
  let s = store().await;
  assert!(s.get_tree(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_trees_ordered_by_name() {
  let s = store().await;
  s.add_tree("zeta".into(), false).await.unwrap();
  s.add_tree("alpha".into(), false).await.unwrap();

  let trees = s.list_trees().await.unwrap();
  let names: Vec<_> = trees.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, ["alpha", "zeta"]);
}

#[tokio::test]
async fn update_tree_partial_fields() {
  let s = store().await;
  let tree = s.add_tree("old".into(), false).await.unwrap();

  s.update_tree(
    tree.tree_id,
    TreeUpdate { name: Some("new".into()), is_default: None },
  )
  .await
  .unwrap();

  let fetched = s.get_tree(tree.tree_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "new");
  assert!(!fetched.is_default);
}

#[tokio::test]
async fn update_missing_tree_errors() {
  let s = store().await;
  let err = s
    .update_tree(Uuid::new_v4(), TreeUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RowNotFound { .. }));
}

#[tokio::test]
async fn delete_tree_wipes_only_its_own_records() {
  let s = store().await;
  let doomed = tree(&s).await;
  let kept = tree(&s).await;

  s.add_individual(doomed, Gender::Female).await.unwrap();
  let survivor = s.add_individual(kept, Gender::Male).await.unwrap();

  s.delete_tree(doomed).await.unwrap();

  assert!(s.get_tree(doomed).await.unwrap().is_none());
  assert!(s.list_individuals(doomed, None).await.unwrap().is_empty());
  let kept_rows = s.list_individuals(kept, None).await.unwrap();
  assert_eq!(kept_rows.len(), 1);
  assert_eq!(kept_rows[0].individual_id, survivor.individual_id);
}

// ─── Tenant isolation ────────────────────────────────────────────────────────

#[tokio::test]
async fn get_individual_from_other_tree_is_not_found() {
  let s = store().await;
  let home = tree(&s).await;
  let other = tree(&s).await;

  let individual = s.add_individual(home, Gender::Male).await.unwrap();

  assert!(
    s.get_individual(other, individual.individual_id)
      .await
      .unwrap()
      .is_none()
  );
  assert!(
    s.get_individual(home, individual.individual_id)
      .await
      .unwrap()
      .is_some()
  );
}

#[tokio::test]
async fn update_individual_from_other_tree_is_not_found() {
  let s = store().await;
  let home = tree(&s).await;
  let other = tree(&s).await;

  let individual = s.add_individual(home, Gender::Male).await.unwrap();

  let err = s
    .update_individual(other, individual.individual_id, Gender::Female)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RowNotFound { .. }));

  // The row is untouched.
  let fetched = s
    .get_individual(home, individual.individual_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.gender, Gender::Male);
}

#[tokio::test]
async fn delete_individual_from_other_tree_is_not_found() {
  let s = store().await;
  let home = tree(&s).await;
  let other = tree(&s).await;

  let individual = s.add_individual(home, Gender::Male).await.unwrap();

  let err = s
    .delete_individual(other, individual.individual_id)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RowNotFound { .. }));
  assert_eq!(s.list_individuals(home, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn lists_are_scoped_to_their_tree() {
  let s = store().await;
  let a = tree(&s).await;
  let b = tree(&s).await;

  s.add_individual(a, Gender::Male).await.unwrap();
  s.add_individual(a, Gender::Female).await.unwrap();
  s.add_individual(b, Gender::Unknown).await.unwrap();

  assert_eq!(s.list_individuals(a, None).await.unwrap().len(), 2);
  assert_eq!(s.list_individuals(b, None).await.unwrap().len(), 1);
}

// ─── GEDCOM sequences ────────────────────────────────────────────────────────

#[tokio::test]
async fn gedcom_ids_count_up_per_tree() {
  let s = store().await;
  let a = tree(&s).await;
  let b = tree(&s).await;

  let first = s.add_individual(a, Gender::Male).await.unwrap();
  let second = s.add_individual(a, Gender::Female).await.unwrap();
  let other_tree = s.add_individual(b, Gender::Male).await.unwrap();

  assert_eq!(first.gedcom_id, 1);
  assert_eq!(second.gedcom_id, 2);
  // Each tree has its own sequence.
  assert_eq!(other_tree.gedcom_id, 1);
}

// ─── Names ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_list_names_keeps_insertion_order() {
  let s = store().await;
  let t = tree(&s).await;
  let individual = s.add_individual(t, Gender::Female).await.unwrap();

  s.insert_names(
    t,
    individual.individual_id,
    vec![
      name_write("Jane", "Doe", true),
      name_write("Janie", "D", false),
    ],
  )
  .await
  .unwrap();

  let names = s.list_names(t, None).await.unwrap();
  assert_eq!(names.len(), 2);
  assert_eq!(names[0].first_name.as_deref(), Some("Jane"));
  assert!(names[0].is_primary);
  assert!(!names[1].is_primary);
}

#[tokio::test]
async fn delete_names_for_tolerates_zero_rows() {
  let s = store().await;
  let t = tree(&s).await;
  let individual = s.add_individual(t, Gender::Male).await.unwrap();

  // No names exist yet; this must not error.
  s.delete_names_for(t, individual.individual_id).await.unwrap();
}

#[tokio::test]
async fn deleting_individual_cascades_names_and_child_rows() {
  let s = store().await;
  let t = tree(&s).await;
  let individual = s.add_individual(t, Gender::Male).await.unwrap();
  s.insert_names(t, individual.individual_id, vec![name_write("A", "B", true)])
    .await
    .unwrap();

  let family = s
    .add_family(
      t,
      FamilyWrite { husband_id: None, wife_id: None, kind: FamilyKind::Married },
    )
    .await
    .unwrap();
  s.insert_family_children(t, family.family_id, vec![individual.individual_id])
    .await
    .unwrap();

  s.delete_individual(t, individual.individual_id).await.unwrap();

  assert!(s.list_names(t, None).await.unwrap().is_empty());
  assert!(s.list_family_children(t, None).await.unwrap().is_empty());
  // The family itself survives.
  assert!(s.get_family(t, family.family_id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_individual_nulls_spouse_references() {
  let s = store().await;
  let t = tree(&s).await;
  let husband = s.add_individual(t, Gender::Male).await.unwrap();
  let wife = s.add_individual(t, Gender::Female).await.unwrap();

  let family = s
    .add_family(
      t,
      FamilyWrite {
        husband_id: Some(husband.individual_id),
        wife_id:    Some(wife.individual_id),
        kind:       FamilyKind::Married,
      },
    )
    .await
    .unwrap();

  s.delete_individual(t, husband.individual_id).await.unwrap();

  let fetched = s.get_family(t, family.family_id).await.unwrap().unwrap();
  assert_eq!(fetched.husband_id, None);
  assert_eq!(fetched.wife_id, Some(wife.individual_id));
}

// ─── Families ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_families_by_spouse() {
  let s = store().await;
  let t = tree(&s).await;
  let spouse = s.add_individual(t, Gender::Female).await.unwrap();

  s.add_family(
    t,
    FamilyWrite {
      husband_id: None,
      wife_id:    Some(spouse.individual_id),
      kind:       FamilyKind::Married,
    },
  )
  .await
  .unwrap();
  s.add_family(
    t,
    FamilyWrite { husband_id: None, wife_id: None, kind: FamilyKind::Unknown },
  )
  .await
  .unwrap();

  let found = s
    .list_families(
      t,
      FamilyFilter { ids: None, spouse_id: Some(spouse.individual_id) },
    )
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].wife_id, Some(spouse.individual_id));
}

#[tokio::test]
async fn deleting_family_cascades_child_rows_and_keeps_individuals() {
  let s = store().await;
  let t = tree(&s).await;
  let child = s.add_individual(t, Gender::Male).await.unwrap();

  let family = s
    .add_family(
      t,
      FamilyWrite { husband_id: None, wife_id: None, kind: FamilyKind::Married },
    )
    .await
    .unwrap();
  s.insert_family_children(t, family.family_id, vec![child.individual_id])
    .await
    .unwrap();

  s.delete_family(t, family.family_id).await.unwrap();

  assert!(s.list_family_children(t, None).await.unwrap().is_empty());
  assert!(
    s.get_individual(t, child.individual_id)
      .await
      .unwrap()
      .is_some()
  );
}

// ─── Events ──────────────────────────────────────────────────────────────────

async fn event_fixture(
  s: &SqliteStore,
  t: Uuid,
) -> (Uuid, Uuid, Uuid, Uuid, Uuid) {
  let event_type = s
    .add_event_type(t, LookupDraft::seeded("Marriage", "marriage"))
    .await
    .unwrap();
  let role = s
    .add_event_role(t, LookupDraft::seeded("Witness", "witness"))
    .await
    .unwrap();
  let subject = s.add_individual(t, Gender::Male).await.unwrap();
  let witness = s.add_individual(t, Gender::Female).await.unwrap();

  let event = s
    .add_event(
      t,
      EventWrite {
        type_id:     event_type.event_type_id,
        date:        Some("1902-06-14".into()),
        description: None,
        place_id:    None,
      },
    )
    .await
    .unwrap();

  s.insert_event_subjects(t, event.event_id, vec![subject.individual_id])
    .await
    .unwrap();
  s.insert_event_participants(
    t,
    event.event_id,
    vec![ParticipantDraft {
      individual_id: witness.individual_id,
      role_id:       role.event_role_id,
    }],
  )
  .await
  .unwrap();

  (
    event.event_id,
    event_type.event_type_id,
    role.event_role_id,
    subject.individual_id,
    witness.individual_id,
  )
}

#[tokio::test]
async fn count_event_subjects_counts_per_event() {
  let s = store().await;
  let t = tree(&s).await;
  let (event_id, ..) = event_fixture(&s, t).await;

  assert_eq!(s.count_event_subjects(t, event_id).await.unwrap(), 1);
  assert_eq!(s.count_event_subjects(t, Uuid::new_v4()).await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_event_cascades_relationship_rows() {
  let s = store().await;
  let t = tree(&s).await;
  let (event_id, type_id, role_id, ..) = event_fixture(&s, t).await;

  s.delete_event(t, event_id).await.unwrap();

  assert!(s.list_event_subjects(t, None).await.unwrap().is_empty());
  assert!(s.list_event_participants(t, None).await.unwrap().is_empty());
  // Lookup rows are untouched.
  assert!(s.get_event_type(t, type_id).await.unwrap().is_some());
  assert!(s.get_event_role(t, role_id).await.unwrap().is_some());
}

#[tokio::test]
async fn restrict_protects_referenced_event_type() {
  let s = store().await;
  let t = tree(&s).await;
  let (_, type_id, ..) = event_fixture(&s, t).await;

  let err = s.delete_event_type(t, type_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
  assert!(s.get_event_type(t, type_id).await.unwrap().is_some());
}

#[tokio::test]
async fn list_events_filtered_by_place() {
  let s = store().await;
  let t = tree(&s).await;
  let event_type = s
    .add_event_type(t, LookupDraft::seeded("Birth", "birth"))
    .await
    .unwrap();
  let place = s.add_place(t, place_draft("Springfield", None)).await.unwrap();

  let located = s
    .add_event(
      t,
      EventWrite {
        type_id:     event_type.event_type_id,
        date:        None,
        description: None,
        place_id:    Some(place.place_id),
      },
    )
    .await
    .unwrap();
  s.add_event(
    t,
    EventWrite {
      type_id:     event_type.event_type_id,
      date:        None,
      description: None,
      place_id:    None,
    },
  )
  .await
  .unwrap();

  let found = s
    .list_events(
      t,
      EventFilter {
        ids:       None,
        type_ids:  None,
        place_ids: Some(vec![place.place_id]),
      },
    )
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].event_id, located.event_id);
}

// ─── Places ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_places_orders_by_name_and_filters_by_parent() {
  let s = store().await;
  let t = tree(&s).await;
  let root = s.add_place(t, place_draft("Root", None)).await.unwrap();
  s.add_place(t, place_draft("Zion", Some(root.place_id)))
    .await
    .unwrap();
  s.add_place(t, place_draft("Antwerp", Some(root.place_id)))
    .await
    .unwrap();

  let children = s
    .list_places(
      t,
      PlaceFilter { ids: None, parent: Some(ParentFilter::Of(root.place_id)) },
    )
    .await
    .unwrap();
  let names: Vec<_> = children.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Antwerp", "Zion"]);

  let roots = s
    .list_places(t, PlaceFilter { ids: None, parent: Some(ParentFilter::Root) })
    .await
    .unwrap();
  assert_eq!(roots.len(), 1);
  assert_eq!(roots[0].place_id, root.place_id);
}

#[tokio::test]
async fn deleting_place_nulls_children_and_event_references() {
  let s = store().await;
  let t = tree(&s).await;
  let parent = s.add_place(t, place_draft("Parent", None)).await.unwrap();
  let child = s
    .add_place(t, place_draft("Child", Some(parent.place_id)))
    .await
    .unwrap();

  let event_type = s
    .add_event_type(t, LookupDraft::seeded("Census", "census"))
    .await
    .unwrap();
  let event = s
    .add_event(
      t,
      EventWrite {
        type_id:     event_type.event_type_id,
        date:        None,
        description: None,
        place_id:    Some(parent.place_id),
      },
    )
    .await
    .unwrap();

  s.delete_place(t, parent.place_id).await.unwrap();

  let child = s.get_place(t, child.place_id).await.unwrap().unwrap();
  assert_eq!(child.parent_id, None);
  let event = s.get_event(t, event.event_id).await.unwrap().unwrap();
  assert_eq!(event.place_id, None);
}

#[tokio::test]
async fn restrict_protects_referenced_place_type() {
  let s = store().await;
  let t = tree(&s).await;
  let place_type = s
    .add_place_type(t, LookupDraft::seeded("City", "city"))
    .await
    .unwrap();
  s.add_place(
    t,
    PlaceDraft {
      name:      "Lisbon".into(),
      type_id:   Some(place_type.place_type_id),
      parent_id: None,
      latitude:  Some(38.72),
      longitude: Some(-9.14),
    },
  )
  .await
  .unwrap();

  let err = s
    .delete_place_type(t, place_type.place_type_id)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_round_trip() {
  let s = store().await;
  let t = tree(&s).await;

  let role = s
    .add_event_role(t, LookupDraft { name: "Officiant".into(), key: None })
    .await
    .unwrap();
  assert_eq!(role.key, None);

  s.update_event_role(
    t,
    role.event_role_id,
    LookupDraft { name: "Celebrant".into(), key: Some("celebrant".into()) },
  )
  .await
  .unwrap();

  let fetched = s
    .get_event_role(t, role.event_role_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.name, "Celebrant");
  assert_eq!(fetched.key.as_deref(), Some("celebrant"));

  s.delete_event_role(t, role.event_role_id).await.unwrap();
  assert!(
    s.get_event_role(t, role.event_role_id)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn lookups_from_other_tree_are_invisible() {
  let s = store().await;
  let a = tree(&s).await;
  let b = tree(&s).await;

  let event_type = s
    .add_event_type(a, LookupDraft::seeded("Birth", "birth"))
    .await
    .unwrap();

  assert!(
    s.get_event_type(b, event_type.event_type_id)
      .await
      .unwrap()
      .is_none()
  );
  assert!(s.list_event_types(b).await.unwrap().is_empty());
}
