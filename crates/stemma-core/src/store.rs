//! The `TreeStore` trait — the per-table repository contract.
//!
//! The trait is implemented by storage backends (e.g. `stemma-store-sqlite`).
//! Higher layers (`stemma-service`) depend on this abstraction, not on any
//! concrete backend.
//!
//! Every operation is scoped by `tree_id` equality in addition to any
//! primary key, so an id belonging to a different tree behaves as
//! not-found/no-op. Single-row fetches return `Ok(None)` when missing;
//! aggregate-row deletes fail on a missing row; dependent-row bulk deletes
//! legitimately targeting zero rows succeed.
//!
//! These are deliberately thin single-table operations. Multi-step
//! consistency sequences (full-replace child sets, subject-count-driven
//! event deletion) live in `stemma-service` and are **not atomic** across
//! calls — each step is awaited and a failure aborts the remainder.

use std::future::Future;

use uuid::Uuid;

use crate::{
  event::{
    Event, EventFilter, EventParticipant, EventSubject, EventWrite,
    ParticipantDraft,
  },
  family::{Family, FamilyChild, FamilyWrite},
  individual::{Gender, Individual, Name, NameWrite},
  lookup::{EventRole, EventType, LookupDraft, PlaceType},
  place::{Place, PlaceDraft, PlaceFilter},
  tree::{Tree, TreeUpdate},
};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Repository-level filter for family listings.
#[derive(Debug, Clone, Default)]
pub struct FamilyFilter {
  pub ids:       Option<Vec<Uuid>>,
  /// Families where this individual is husband or wife.
  pub spouse_id: Option<Uuid>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Stemma genealogy store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait TreeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Trees ─────────────────────────────────────────────────────────────

  /// Create and persist a new tree.
  fn add_tree(
    &self,
    name: String,
    is_default: bool,
  ) -> impl Future<Output = Result<Tree, Self::Error>> + Send + '_;

  /// Retrieve a tree by id. Returns `None` if not found.
  fn get_tree(
    &self,
    tree_id: Uuid,
  ) -> impl Future<Output = Result<Option<Tree>, Self::Error>> + Send + '_;

  /// List all trees, ordered by name.
  fn list_trees(
    &self,
  ) -> impl Future<Output = Result<Vec<Tree>, Self::Error>> + Send + '_;

  /// Apply a partial update. Fails on a missing row.
  fn update_tree(
    &self,
    tree_id: Uuid,
    update: TreeUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a tree and, by cascade, every record scoped to it.
  fn delete_tree(
    &self,
    tree_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Individuals ───────────────────────────────────────────────────────

  fn add_individual(
    &self,
    tree_id: Uuid,
    gender: Gender,
  ) -> impl Future<Output = Result<Individual, Self::Error>> + Send + '_;

  fn get_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> impl Future<Output = Result<Option<Individual>, Self::Error>> + Send + '_;

  /// List individuals, optionally restricted to a set of ids.
  fn list_individuals(
    &self,
    tree_id: Uuid,
    ids: Option<Vec<Uuid>>,
  ) -> impl Future<Output = Result<Vec<Individual>, Self::Error>> + Send + '_;

  fn update_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
    gender: Gender,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the individual row. Names and family-child rows cascade; spouse
  /// references in families are nulled by the backend, not by explicit code.
  fn delete_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Names ─────────────────────────────────────────────────────────────

  /// Bulk-insert name rows for an individual. Primacy is taken from each
  /// row as given; deriving it from list position is the caller's job.
  fn insert_names(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
    names: Vec<NameWrite>,
  ) -> impl Future<Output = Result<Vec<Name>, Self::Error>> + Send + '_;

  /// List names, optionally restricted to a set of individuals, ordered by
  /// `created_at` ascending so the "first element" fallback is stable.
  fn list_names(
    &self,
    tree_id: Uuid,
    individual_ids: Option<Vec<Uuid>>,
  ) -> impl Future<Output = Result<Vec<Name>, Self::Error>> + Send + '_;

  /// Delete all names for an individual. Zero affected rows is not an error.
  fn delete_names_for(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Families ──────────────────────────────────────────────────────────

  fn add_family(
    &self,
    tree_id: Uuid,
    write: FamilyWrite,
  ) -> impl Future<Output = Result<Family, Self::Error>> + Send + '_;

  fn get_family(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
  ) -> impl Future<Output = Result<Option<Family>, Self::Error>> + Send + '_;

  fn list_families(
    &self,
    tree_id: Uuid,
    filter: FamilyFilter,
  ) -> impl Future<Output = Result<Vec<Family>, Self::Error>> + Send + '_;

  fn update_family(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
    write: FamilyWrite,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the family row; its child rows cascade. Individuals referenced
  /// as spouses or children are preserved.
  fn delete_family(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Family children ───────────────────────────────────────────────────

  fn insert_family_children(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
    individual_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List child rows, optionally restricted to a set of families.
  fn list_family_children(
    &self,
    tree_id: Uuid,
    family_ids: Option<Vec<Uuid>>,
  ) -> impl Future<Output = Result<Vec<FamilyChild>, Self::Error>> + Send + '_;

  /// The child rows where this individual is the child — the families they
  /// grew up in.
  fn list_child_memberships(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FamilyChild>, Self::Error>> + Send + '_;

  /// Delete all child rows of a family. Zero affected rows is not an error.
  fn delete_family_children(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn add_event(
    &self,
    tree_id: Uuid,
    write: EventWrite,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  fn list_events(
    &self,
    tree_id: Uuid,
    filter: EventFilter,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  fn update_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    write: EventWrite,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the event row; subject and participant rows cascade. Event
  /// types and roles are restrict-protected and untouched.
  fn delete_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Event subjects ────────────────────────────────────────────────────

  fn insert_event_subjects(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    individual_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List subject rows, optionally restricted to a set of events.
  fn list_event_subjects(
    &self,
    tree_id: Uuid,
    event_ids: Option<Vec<Uuid>>,
  ) -> impl Future<Output = Result<Vec<EventSubject>, Self::Error>> + Send + '_;

  /// The subject rows naming this individual — the events that are about
  /// them.
  fn list_subject_rows_for_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EventSubject>, Self::Error>> + Send + '_;

  /// How many subjects an event currently has.
  fn count_event_subjects(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete every subject row of an event. Zero rows is not an error.
  fn delete_event_subjects_for_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete one individual's subject row on one event.
  fn delete_event_subject_row(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    individual_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Event participants ────────────────────────────────────────────────

  fn insert_event_participants(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    entries: Vec<ParticipantDraft>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List participant rows, optionally restricted to a set of events.
  fn list_event_participants(
    &self,
    tree_id: Uuid,
    event_ids: Option<Vec<Uuid>>,
  ) -> impl Future<Output = Result<Vec<EventParticipant>, Self::Error>> + Send + '_;

  /// Delete every participant row of an event. Zero rows is not an error.
  fn delete_event_participants_for_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every participant row naming this individual, across all
  /// events. Events survive losing all their participants.
  fn delete_event_participants_for_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Event types ───────────────────────────────────────────────────────

  fn add_event_type(
    &self,
    tree_id: Uuid,
    draft: LookupDraft,
  ) -> impl Future<Output = Result<EventType, Self::Error>> + Send + '_;

  fn get_event_type(
    &self,
    tree_id: Uuid,
    event_type_id: Uuid,
  ) -> impl Future<Output = Result<Option<EventType>, Self::Error>> + Send + '_;

  /// List event types, ordered by name.
  fn list_event_types(
    &self,
    tree_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EventType>, Self::Error>> + Send + '_;

  fn update_event_type(
    &self,
    tree_id: Uuid,
    event_type_id: Uuid,
    draft: LookupDraft,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete an event type. The backend rejects the deletion while events
  /// reference it.
  fn delete_event_type(
    &self,
    tree_id: Uuid,
    event_type_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Event roles ───────────────────────────────────────────────────────

  fn add_event_role(
    &self,
    tree_id: Uuid,
    draft: LookupDraft,
  ) -> impl Future<Output = Result<EventRole, Self::Error>> + Send + '_;

  fn get_event_role(
    &self,
    tree_id: Uuid,
    event_role_id: Uuid,
  ) -> impl Future<Output = Result<Option<EventRole>, Self::Error>> + Send + '_;

  /// List event roles, ordered by name.
  fn list_event_roles(
    &self,
    tree_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EventRole>, Self::Error>> + Send + '_;

  fn update_event_role(
    &self,
    tree_id: Uuid,
    event_role_id: Uuid,
    draft: LookupDraft,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_event_role(
    &self,
    tree_id: Uuid,
    event_role_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Places ────────────────────────────────────────────────────────────

  fn add_place(
    &self,
    tree_id: Uuid,
    draft: PlaceDraft,
  ) -> impl Future<Output = Result<Place, Self::Error>> + Send + '_;

  fn get_place(
    &self,
    tree_id: Uuid,
    place_id: Uuid,
  ) -> impl Future<Output = Result<Option<Place>, Self::Error>> + Send + '_;

  /// List places, ordered by name ascending.
  fn list_places(
    &self,
    tree_id: Uuid,
    filter: PlaceFilter,
  ) -> impl Future<Output = Result<Vec<Place>, Self::Error>> + Send + '_;

  fn update_place(
    &self,
    tree_id: Uuid,
    place_id: Uuid,
    draft: PlaceDraft,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the place row. Children's `parent_id` and events' `place_id`
  /// are nulled by the backend constraints.
  fn delete_place(
    &self,
    tree_id: Uuid,
    place_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Place types ───────────────────────────────────────────────────────

  fn add_place_type(
    &self,
    tree_id: Uuid,
    draft: LookupDraft,
  ) -> impl Future<Output = Result<PlaceType, Self::Error>> + Send + '_;

  fn get_place_type(
    &self,
    tree_id: Uuid,
    place_type_id: Uuid,
  ) -> impl Future<Output = Result<Option<PlaceType>, Self::Error>> + Send + '_;

  /// List place types, ordered by name.
  fn list_place_types(
    &self,
    tree_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PlaceType>, Self::Error>> + Send + '_;

  fn update_place_type(
    &self,
    tree_id: Uuid,
    place_type_id: Uuid,
    draft: LookupDraft,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_place_type(
    &self,
    tree_id: Uuid,
    place_type_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
