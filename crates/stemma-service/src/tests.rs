//! Integration tests for the use-case layer against the SQLite backend.

use stemma_core::{
  event::{EventDraft, ParticipantDraft},
  family::{ChildRef, FamilyDraft, FamilyKind},
  individual::{Gender, Individual, IndividualDraft, NameDraft, NameKind},
  place::PlaceDraft,
  query::{IndividualSortField, SortConfig, SortDirection, TableQuery},
  store::TreeStore,
};
use stemma_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{
  Error, Key,
  audit::{self, Finding},
  events, families, individuals, lookups, places, trees,
};

async fn setup() -> (SqliteStore, Uuid) {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  let tree = trees::create_tree(&store, "test".into(), true)
    .await
    .unwrap()
    .value;
  (store, tree.tree_id)
}

fn name(first: &str, last: &str) -> NameDraft {
  NameDraft {
    kind:       NameKind::Birth,
    first_name: Some(first.into()),
    last_name:  Some(last.into()),
    surname:    None,
  }
}

async fn add_person(
  store: &SqliteStore,
  tree_id: Uuid,
  first: &str,
  last: &str,
) -> Individual {
  individuals::create_individual(
    store,
    tree_id,
    IndividualDraft { gender: Gender::Female, names: vec![name(first, last)] },
  )
  .await
  .unwrap()
  .value
}

async fn event_type_id(store: &SqliteStore, tree_id: Uuid, key: &str) -> Uuid {
  lookups::list_event_types(store, tree_id)
    .await
    .unwrap()
    .into_iter()
    .find(|t| t.key.as_deref() == Some(key))
    .expect("seeded event type")
    .event_type_id
}

async fn event_role_id(store: &SqliteStore, tree_id: Uuid, key: &str) -> Uuid {
  lookups::list_event_roles(store, tree_id)
    .await
    .unwrap()
    .into_iter()
    .find(|r| r.key.as_deref() == Some(key))
    .expect("seeded event role")
    .event_role_id
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

// ─── Tree seeding and selection ──────────────────────────────────────────────

#[tokio::test]
async fn create_tree_seeds_reference_data() {
  let (store, tree_id) = setup().await;

  assert_eq!(lookups::list_event_types(&store, tree_id).await.unwrap().len(), 11);
  assert_eq!(lookups::list_event_roles(&store, tree_id).await.unwrap().len(), 14);
  assert_eq!(lookups::list_place_types(&store, tree_id).await.unwrap().len(), 10);
}

#[tokio::test]
async fn default_tree_prefers_the_flagged_one() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  trees::create_tree(&store, "aaa".into(), false).await.unwrap();
  let flagged = trees::create_tree(&store, "zzz".into(), true)
    .await
    .unwrap()
    .value;

  let picked = trees::default_tree(&store).await.unwrap().unwrap();
  assert_eq!(picked.tree_id, flagged.tree_id);
}

#[tokio::test]
async fn default_tree_falls_back_to_first_by_name() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let first = trees::create_tree(&store, "alpha".into(), false)
    .await
    .unwrap()
    .value;
  trees::create_tree(&store, "beta".into(), false).await.unwrap();

  let picked = trees::default_tree(&store).await.unwrap().unwrap();
  assert_eq!(picked.tree_id, first.tree_id);
}

// ─── Primary-name invariant ──────────────────────────────────────────────────

#[tokio::test]
async fn first_submitted_name_is_primary() {
  let (store, tree_id) = setup().await;

  let individual = individuals::create_individual(
    &store,
    tree_id,
    IndividualDraft {
      gender: Gender::Female,
      names:  vec![name("Jane", "Doe"), name("Janie", "D")],
    },
  )
  .await
  .unwrap()
  .value;

  let view = individuals::fetch_individual(&store, tree_id, individual.individual_id)
    .await
    .unwrap();
  assert_eq!(view.names.len(), 2);
  assert_eq!(view.names.iter().filter(|n| n.is_primary).count(), 1);
  assert!(view.names[0].is_primary);
  assert_eq!(view.names[0].first_name.as_deref(), Some("Jane"));
}

#[tokio::test]
async fn update_rederives_primacy_from_position() {
  let (store, tree_id) = setup().await;
  let individual = individuals::create_individual(
    &store,
    tree_id,
    IndividualDraft {
      gender: Gender::Female,
      names:  vec![name("Jane", "Doe"), name("Janie", "D")],
    },
  )
  .await
  .unwrap()
  .value;

  // Reverse the list: the former second name is now primary.
  individuals::update_individual(
    &store,
    tree_id,
    individual.individual_id,
    IndividualDraft {
      gender: Gender::Female,
      names:  vec![name("Janie", "D"), name("Jane", "Doe")],
    },
  )
  .await
  .unwrap();

  let view = individuals::fetch_individual(&store, tree_id, individual.individual_id)
    .await
    .unwrap();
  assert_eq!(view.names.iter().filter(|n| n.is_primary).count(), 1);
  let primary = view.names.iter().find(|n| n.is_primary).unwrap();
  assert_eq!(primary.first_name.as_deref(), Some("Janie"));
}

#[tokio::test]
async fn empty_name_list_leaves_zero_names() {
  let (store, tree_id) = setup().await;

  let individual = individuals::create_individual(
    &store,
    tree_id,
    IndividualDraft { gender: Gender::Male, names: vec![] },
  )
  .await
  .unwrap()
  .value;

  let view = individuals::fetch_individual(&store, tree_id, individual.individual_id)
    .await
    .unwrap();
  assert!(view.names.is_empty());
  assert_eq!(view.display_name(Default::default()), "");
}

// ─── Family-child replace ────────────────────────────────────────────────────

#[tokio::test]
async fn family_child_update_is_a_clean_replacement() {
  let (store, tree_id) = setup().await;
  let a = add_person(&store, tree_id, "A", "One").await;
  let b = add_person(&store, tree_id, "B", "Two").await;
  let c = add_person(&store, tree_id, "C", "Three").await;

  let family = families::create_family(
    &store,
    tree_id,
    FamilyDraft {
      husband_id: None,
      wife_id:    None,
      kind:       FamilyKind::Married,
      children:   vec![
        ChildRef { individual_id: Some(a.individual_id) },
        ChildRef { individual_id: Some(b.individual_id) },
      ],
    },
  )
  .await
  .unwrap()
  .value;

  let before = store
    .list_family_children(tree_id, Some(vec![family.family_id]))
    .await
    .unwrap();
  let b_row_before = before
    .iter()
    .find(|r| r.individual_id == b.individual_id)
    .unwrap()
    .family_child_id;

  families::update_family(
    &store,
    tree_id,
    family.family_id,
    FamilyDraft {
      husband_id: None,
      wife_id:    None,
      kind:       FamilyKind::Married,
      children:   vec![
        ChildRef { individual_id: Some(b.individual_id) },
        ChildRef { individual_id: Some(c.individual_id) },
        // A form row with no individual selected is filtered, not rejected.
        ChildRef { individual_id: None },
      ],
    },
  )
  .await
  .unwrap();

  let after = store
    .list_family_children(tree_id, Some(vec![family.family_id]))
    .await
    .unwrap();
  let mut members: Vec<Uuid> = after.iter().map(|r| r.individual_id).collect();
  members.sort_unstable();
  let mut expected = vec![b.individual_id, c.individual_id];
  expected.sort_unstable();
  assert_eq!(members, expected);

  // B survived the update but its row was deleted and re-inserted.
  let b_row_after = after
    .iter()
    .find(|r| r.individual_id == b.individual_id)
    .unwrap()
    .family_child_id;
  assert_ne!(b_row_before, b_row_after);
}

#[tokio::test]
async fn create_family_filters_empty_child_entries() {
  let (store, tree_id) = setup().await;

  let family = families::create_family(
    &store,
    tree_id,
    FamilyDraft {
      husband_id: None,
      wife_id:    None,
      kind:       FamilyKind::Unknown,
      children:   vec![ChildRef { individual_id: None }],
    },
  )
  .await
  .unwrap()
  .value;

  let rows = store
    .list_family_children(tree_id, Some(vec![family.family_id]))
    .await
    .unwrap();
  assert!(rows.is_empty());
}

// ─── Spouse resolution ───────────────────────────────────────────────────────

#[tokio::test]
async fn spouse_is_resolved_relative_to_the_reference() {
  let (store, tree_id) = setup().await;
  let husband = add_person(&store, tree_id, "John", "Smith").await;
  let wife = add_person(&store, tree_id, "Mary", "Jones").await;

  let family = families::create_family(
    &store,
    tree_id,
    FamilyDraft {
      husband_id: Some(husband.individual_id),
      wife_id:    Some(wife.individual_id),
      kind:       FamilyKind::Married,
      children:   vec![],
    },
  )
  .await
  .unwrap()
  .value;

  let view = families::fetch_family(&store, tree_id, family.family_id)
    .await
    .unwrap();

  let spouse = view.spouse_of(husband.individual_id).unwrap();
  assert_eq!(spouse.individual.individual_id, wife.individual_id);

  // A reference matching neither side resolves to no spouse, not an error.
  assert!(view.spouse_of(Uuid::new_v4()).is_none());
}

#[tokio::test]
async fn fetch_family_raises_not_found() {
  let (store, tree_id) = setup().await;
  let err = families::fetch_family(&store, tree_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

// ─── Individual deletion and event survival ──────────────────────────────────

#[tokio::test]
async fn event_survives_while_other_subjects_remain() {
  let (store, tree_id) = setup().await;
  let x = add_person(&store, tree_id, "X", "Subject").await;
  let y = add_person(&store, tree_id, "Y", "Subject").await;
  let z = add_person(&store, tree_id, "Z", "Witness").await;

  let marriage = event_type_id(&store, tree_id, "marriage").await;
  let witness = event_role_id(&store, tree_id, "witness").await;

  let event = events::create_event(
    &store,
    tree_id,
    EventDraft {
      type_id:      marriage,
      date:         Some("1902-06-14".into()),
      description:  None,
      place_id:     None,
      subject_ids:  vec![x.individual_id, y.individual_id],
      participants: vec![ParticipantDraft {
        individual_id: z.individual_id,
        role_id:       witness,
      }],
    },
  )
  .await
  .unwrap()
  .value;

  // Deleting X: Y is still a subject, so the event survives with one
  // subject row less.
  individuals::delete_individual(&store, tree_id, x.individual_id)
    .await
    .unwrap();

  let view = events::fetch_event(&store, tree_id, event.event_id)
    .await
    .unwrap();
  let (subjects, participants) = events::partition_people(&view.people);
  assert_eq!(subjects, vec![y.individual_id]);
  assert_eq!(participants, vec![z.individual_id]);

  // Deleting Y: now the only subject, so the event disappears entirely,
  // including Z's participant row.
  individuals::delete_individual(&store, tree_id, y.individual_id)
    .await
    .unwrap();

  let err = events::fetch_event(&store, tree_id, event.event_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
  assert!(
    store
      .list_event_participants(tree_id, None)
      .await
      .unwrap()
      .is_empty()
  );
  // Z was only a participant and is untouched.
  assert!(
    store
      .get_individual(tree_id, z.individual_id)
      .await
      .unwrap()
      .is_some()
  );
}

#[tokio::test]
async fn event_survives_losing_all_participants() {
  let (store, tree_id) = setup().await;
  let subject = add_person(&store, tree_id, "S", "Subject").await;
  let witness = add_person(&store, tree_id, "W", "Witness").await;

  let birth = event_type_id(&store, tree_id, "birth").await;
  let role = event_role_id(&store, tree_id, "witness").await;

  let event = events::create_event(
    &store,
    tree_id,
    EventDraft {
      type_id:      birth,
      date:         None,
      description:  None,
      place_id:     None,
      subject_ids:  vec![subject.individual_id],
      participants: vec![ParticipantDraft {
        individual_id: witness.individual_id,
        role_id:       role,
      }],
    },
  )
  .await
  .unwrap()
  .value;

  individuals::delete_individual(&store, tree_id, witness.individual_id)
    .await
    .unwrap();

  let view = events::fetch_event(&store, tree_id, event.event_id)
    .await
    .unwrap();
  let (subjects, participants) = events::partition_people(&view.people);
  assert_eq!(subjects, vec![subject.individual_id]);
  assert!(participants.is_empty());
}

// ─── Tenant isolation at the use-case layer ──────────────────────────────────

#[tokio::test]
async fn fetching_across_trees_is_not_found() {
  let (store, tree_id) = setup().await;
  let other = trees::create_tree(&store, "other".into(), false)
    .await
    .unwrap()
    .value;

  let individual = add_person(&store, tree_id, "Jane", "Doe").await;

  let err = individuals::fetch_individual(
    &store,
    other.tree_id,
    individual.individual_id,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

// ─── Recursive places ────────────────────────────────────────────────────────

#[tokio::test]
async fn flatten_preserves_preorder_and_depth() {
  let (store, tree_id) = setup().await;

  let root = places::create_place(&store, tree_id, place_draft("Root", None))
    .await
    .unwrap()
    .value;
  let a = places::create_place(
    &store,
    tree_id,
    place_draft("Alpha", Some(root.place_id)),
  )
  .await
  .unwrap()
  .value;
  places::create_place(&store, tree_id, place_draft("Beta", Some(root.place_id)))
    .await
    .unwrap();
  places::create_place(
    &store,
    tree_id,
    place_draft("Alpha One", Some(a.place_id)),
  )
  .await
  .unwrap();

  let nodes = places::fetch_places_recursively(&store, tree_id, root.place_id)
    .await
    .unwrap();
  let flat = places::flatten_places(nodes);

  let sequence: Vec<(&str, usize)> = flat
    .iter()
    .map(|n| (n.place.name.as_str(), n.level))
    .collect();
  assert_eq!(
    sequence,
    [("Alpha", 0), ("Alpha One", 1), ("Beta", 0)]
  );
}

#[tokio::test]
async fn leaf_places_have_empty_children() {
  let (store, tree_id) = setup().await;
  let lone = places::create_place(&store, tree_id, place_draft("Lone", None))
    .await
    .unwrap()
    .value;

  let nodes = places::fetch_places_recursively(&store, tree_id, lone.place_id)
    .await
    .unwrap();
  assert!(nodes.is_empty());
}

#[tokio::test]
async fn place_cycles_error_instead_of_looping() {
  let (store, tree_id) = setup().await;
  let root = places::create_place(&store, tree_id, place_draft("Root", None))
    .await
    .unwrap()
    .value;
  let child = places::create_place(
    &store,
    tree_id,
    place_draft("Child", Some(root.place_id)),
  )
  .await
  .unwrap()
  .value;

  // Corrupt the hierarchy: the root becomes its own grandchild.
  places::update_place(
    &store,
    tree_id,
    root.place_id,
    place_draft("Root", Some(child.place_id)),
  )
  .await
  .unwrap();

  let err = places::fetch_places_recursively(&store, tree_id, root.place_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PlaceCycle(_)));
}

#[tokio::test]
async fn untyped_places_show_the_unknown_type() {
  let (store, tree_id) = setup().await;
  let root = places::create_place(&store, tree_id, place_draft("Root", None))
    .await
    .unwrap()
    .value;
  places::create_place(&store, tree_id, place_draft("Kid", Some(root.place_id)))
    .await
    .unwrap();

  let rows = places::fetch_child_places(&store, tree_id, root.place_id)
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].type_name, "unknown");
}

// ─── Table queries ───────────────────────────────────────────────────────────

#[tokio::test]
async fn individuals_table_pages_with_full_total() {
  let (store, tree_id) = setup().await;
  for i in 0..12 {
    add_person(&store, tree_id, "Person", &format!("Surname{i:02}")).await;
  }

  let page1 = individuals::fetch_individuals_for_table(
    &store,
    tree_id,
    TableQuery::default(),
  )
  .await
  .unwrap();
  assert_eq!(page1.data.len(), 10);
  assert_eq!(page1.total, 12);

  let page2 = individuals::fetch_individuals_for_table(
    &store,
    tree_id,
    TableQuery { page: 2, ..Default::default() },
  )
  .await
  .unwrap();
  assert_eq!(page2.data.len(), 2);
  assert_eq!(page2.total, 12);
}

#[tokio::test]
async fn individuals_table_search_is_case_insensitive() {
  let (store, tree_id) = setup().await;
  add_person(&store, tree_id, "Alice", "Zephyr").await;
  add_person(&store, tree_id, "Bob", "Quartz").await;

  let found = individuals::fetch_individuals_for_table(
    &store,
    tree_id,
    TableQuery { search: Some("ZEPH".into()), ..Default::default() },
  )
  .await
  .unwrap();
  assert_eq!(found.total, 1);
  assert_eq!(
    found.data[0].names[0].last_name.as_deref(),
    Some("Zephyr")
  );
}

#[tokio::test]
async fn individuals_table_decorates_birth_and_death() {
  let (store, tree_id) = setup().await;
  let person = add_person(&store, tree_id, "Ada", "Lovelace").await;
  let place = places::create_place(&store, tree_id, place_draft("London", None))
    .await
    .unwrap()
    .value;

  let birth = event_type_id(&store, tree_id, "birth").await;
  events::create_event(
    &store,
    tree_id,
    EventDraft {
      type_id:      birth,
      date:         Some("1815-12-10".into()),
      description:  None,
      place_id:     Some(place.place_id),
      subject_ids:  vec![person.individual_id],
      participants: vec![],
    },
  )
  .await
  .unwrap();

  let table = individuals::fetch_individuals_for_table(
    &store,
    tree_id,
    TableQuery::default(),
  )
  .await
  .unwrap();
  let row = &table.data[0];
  assert_eq!(row.birth.date.as_deref(), Some("1815-12-10"));
  assert_eq!(row.birth.place_name.as_deref(), Some("London"));
  assert!(row.death.date.is_none());
}

#[tokio::test]
async fn individuals_table_honours_an_explicit_sort() {
  let (store, tree_id) = setup().await;
  add_person(&store, tree_id, "Ada", "Zephyr").await;
  add_person(&store, tree_id, "Zoe", "Abbott").await;

  let table = individuals::fetch_individuals_for_table(
    &store,
    tree_id,
    TableQuery {
      sort: Some(SortConfig {
        field:     IndividualSortField::FirstName,
        direction: SortDirection::Desc,
      }),
      ..Default::default()
    },
  )
  .await
  .unwrap();

  let firsts: Vec<_> = table
    .data
    .iter()
    .map(|r| r.names[0].first_name.as_deref().unwrap())
    .collect();
  assert_eq!(firsts, ["Zoe", "Ada"]);
}

#[tokio::test]
async fn families_resolve_from_either_side_of_the_relationship() {
  let (store, tree_id) = setup().await;
  let father = add_person(&store, tree_id, "John", "Smith").await;
  let child = add_person(&store, tree_id, "Jane", "Smith").await;

  let family = families::create_family(
    &store,
    tree_id,
    FamilyDraft {
      husband_id: Some(father.individual_id),
      wife_id:    None,
      kind:       FamilyKind::Married,
      children:   vec![ChildRef { individual_id: Some(child.individual_id) }],
    },
  )
  .await
  .unwrap()
  .value;

  let as_spouse =
    families::fetch_families_as_spouse(&store, tree_id, father.individual_id)
      .await
      .unwrap();
  assert_eq!(as_spouse.len(), 1);
  assert_eq!(as_spouse[0].family.family_id, family.family_id);

  let as_child =
    families::fetch_families_as_child(&store, tree_id, child.individual_id)
      .await
      .unwrap();
  assert_eq!(as_child.len(), 1);
  assert_eq!(as_child[0].children.len(), 1);
  assert_eq!(
    as_child[0].children[0].individual.individual_id,
    child.individual_id
  );

  // The child is in no family as a spouse.
  assert!(
    families::fetch_families_as_spouse(&store, tree_id, child.individual_id)
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn update_event_replaces_subjects_and_participants() {
  let (store, tree_id) = setup().await;
  let old_subject = add_person(&store, tree_id, "Old", "Subject").await;
  let new_subject = add_person(&store, tree_id, "New", "Subject").await;
  let witness = add_person(&store, tree_id, "W", "Witness").await;

  let birth = event_type_id(&store, tree_id, "birth").await;
  let role = event_role_id(&store, tree_id, "witness").await;

  let event = events::create_event(
    &store,
    tree_id,
    EventDraft {
      type_id:      birth,
      date:         Some("1900".into()),
      description:  None,
      place_id:     None,
      subject_ids:  vec![old_subject.individual_id],
      participants: vec![],
    },
  )
  .await
  .unwrap()
  .value;

  events::update_event(
    &store,
    tree_id,
    event.event_id,
    EventDraft {
      type_id:      birth,
      date:         Some("1901".into()),
      description:  Some("corrected".into()),
      place_id:     None,
      subject_ids:  vec![new_subject.individual_id],
      participants: vec![ParticipantDraft {
        individual_id: witness.individual_id,
        role_id:       role,
      }],
    },
  )
  .await
  .unwrap();

  let view = events::fetch_event(&store, tree_id, event.event_id)
    .await
    .unwrap();
  assert_eq!(view.event.date.as_deref(), Some("1901"));
  let (subjects, participants) = events::partition_people(&view.people);
  assert_eq!(subjects, vec![new_subject.individual_id]);
  assert_eq!(participants, vec![witness.individual_id]);
}

#[tokio::test]
async fn events_table_defaults_to_date_descending() {
  let (store, tree_id) = setup().await;
  let birth = event_type_id(&store, tree_id, "birth").await;
  let subject = add_person(&store, tree_id, "S", "Subject").await;

  for date in ["1900", "2000", "1950"] {
    events::create_event(
      &store,
      tree_id,
      EventDraft {
        type_id:      birth,
        date:         Some(date.into()),
        description:  None,
        place_id:     None,
        subject_ids:  vec![subject.individual_id],
        participants: vec![],
      },
    )
    .await
    .unwrap();
  }

  let table =
    events::fetch_events_for_table(&store, tree_id, TableQuery::default())
      .await
      .unwrap();
  let dates: Vec<_> = table
    .data
    .iter()
    .map(|r| r.event.date.as_deref().unwrap())
    .collect();
  assert_eq!(dates, ["2000", "1950", "1900"]);
}

// ─── Cache keys ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_report_their_stale_cache_keys() {
  let (store, tree_id) = setup().await;

  let family = families::create_family(
    &store,
    tree_id,
    FamilyDraft {
      husband_id: None,
      wife_id:    None,
      kind:       FamilyKind::Married,
      children:   vec![],
    },
  )
  .await
  .unwrap();
  assert!(family.stale.contains(&Key::Families));

  let updated = families::update_family(
    &store,
    tree_id,
    family.value.family_id,
    FamilyDraft {
      husband_id: None,
      wife_id:    None,
      kind:       FamilyKind::Unmarried,
      children:   vec![],
    },
  )
  .await
  .unwrap();
  assert!(updated.stale.contains(&Key::Families));
  assert!(updated.stale.contains(&Key::Family(family.value.family_id)));
}

// ─── Audit and repair ────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_detects_and_repair_removes_orphaned_events() {
  let (store, tree_id) = setup().await;
  let subject = add_person(&store, tree_id, "S", "Subject").await;
  let birth = event_type_id(&store, tree_id, "birth").await;

  let event = events::create_event(
    &store,
    tree_id,
    EventDraft {
      type_id:      birth,
      date:         None,
      description:  None,
      place_id:     None,
      subject_ids:  vec![subject.individual_id],
      participants: vec![],
    },
  )
  .await
  .unwrap()
  .value;

  // Simulate a torn individual deletion: the subject rows are gone but the
  // event row survived.
  store
    .delete_event_subjects_for_event(tree_id, event.event_id)
    .await
    .unwrap();

  let findings = audit::audit_tree(&store, tree_id).await.unwrap();
  assert_eq!(
    findings,
    vec![Finding::EventWithoutSubjects { event_id: event.event_id }]
  );

  audit::repair_tree(&store, tree_id).await.unwrap();

  assert!(store.get_event(tree_id, event.event_id).await.unwrap().is_none());
  assert!(audit::audit_tree(&store, tree_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn repair_restores_a_single_primary_name() {
  let (store, tree_id) = setup().await;
  let individual = individuals::create_individual(
    &store,
    tree_id,
    IndividualDraft { gender: Gender::Female, names: vec![] },
  )
  .await
  .unwrap()
  .value;

  // Simulate a torn name rewrite: rows exist but none is primary.
  store
    .insert_names(
      tree_id,
      individual.individual_id,
      vec![
        stemma_core::individual::NameWrite {
          kind:       NameKind::Birth,
          first_name: Some("Ada".into()),
          last_name:  Some("Lovelace".into()),
          surname:    None,
          is_primary: false,
        },
        stemma_core::individual::NameWrite {
          kind:       NameKind::Nickname,
          first_name: Some("A".into()),
          last_name:  Some("L".into()),
          surname:    None,
          is_primary: false,
        },
      ],
    )
    .await
    .unwrap();

  let findings = audit::audit_tree(&store, tree_id).await.unwrap();
  assert_eq!(
    findings,
    vec![Finding::NoPrimaryName { individual_id: individual.individual_id }]
  );

  audit::repair_tree(&store, tree_id).await.unwrap();

  let names = store
    .list_names(tree_id, Some(vec![individual.individual_id]))
    .await
    .unwrap();
  assert_eq!(names.iter().filter(|n| n.is_primary).count(), 1);
  // The earliest-created name won.
  assert_eq!(names[0].first_name.as_deref(), Some("Ada"));
  assert!(names[0].is_primary);
}

#[tokio::test]
async fn audit_reports_but_never_repairs_duplicate_default_trees() {
  let (store, tree_id) = setup().await;
  // setup() already created one default tree; nothing stops a second.
  trees::create_tree(&store, "second".into(), true).await.unwrap();

  let findings = audit::audit_tree(&store, tree_id).await.unwrap();
  assert!(
    findings
      .iter()
      .any(|f| matches!(f, Finding::MultipleDefaultTrees { tree_ids } if tree_ids.len() == 2))
  );

  audit::repair_tree(&store, tree_id).await.unwrap();

  let still_default = trees::list_trees(&store)
    .await
    .unwrap()
    .into_iter()
    .filter(|t| t.is_default)
    .count();
  assert_eq!(still_default, 2);
}
