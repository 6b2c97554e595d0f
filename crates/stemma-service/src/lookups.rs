//! Reference-data management: event types, event roles, place types.
//!
//! Deleting a lookup row that is still referenced fails at the backend
//! (restrict); the error propagates unchanged.

use stemma_core::{
  lookup::{EventRole, EventType, LookupDraft, PlaceType},
  store::TreeStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{Key, Written},
};

// ─── Event types ─────────────────────────────────────────────────────────────

pub async fn list_event_types<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
) -> Result<Vec<EventType>> {
  store.list_event_types(tree_id).await.map_err(Error::store)
}

pub async fn create_event_type<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  draft: LookupDraft,
) -> Result<Written<EventType>> {
  let event_type = store
    .add_event_type(tree_id, draft)
    .await
    .map_err(Error::store)?;
  Ok(Written::new(event_type, vec![Key::EventTypes]))
}

pub async fn update_event_type<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  event_type_id: Uuid,
  draft: LookupDraft,
) -> Result<Written<()>> {
  store
    .update_event_type(tree_id, event_type_id, draft)
    .await
    .map_err(Error::store)?;
  Ok(Written::new((), vec![Key::EventTypes]))
}

pub async fn delete_event_type<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  event_type_id: Uuid,
) -> Result<Written<()>> {
  store
    .delete_event_type(tree_id, event_type_id)
    .await
    .map_err(Error::store)?;
  Ok(Written::new((), vec![Key::EventTypes]))
}

// ─── Event roles ─────────────────────────────────────────────────────────────

pub async fn list_event_roles<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
) -> Result<Vec<EventRole>> {
  store.list_event_roles(tree_id).await.map_err(Error::store)
}

pub async fn create_event_role<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  draft: LookupDraft,
) -> Result<Written<EventRole>> {
  let event_role = store
    .add_event_role(tree_id, draft)
    .await
    .map_err(Error::store)?;
  Ok(Written::new(event_role, vec![Key::EventRoles]))
}

pub async fn update_event_role<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  event_role_id: Uuid,
  draft: LookupDraft,
) -> Result<Written<()>> {
  store
    .update_event_role(tree_id, event_role_id, draft)
    .await
    .map_err(Error::store)?;
  Ok(Written::new((), vec![Key::EventRoles]))
}

pub async fn delete_event_role<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  event_role_id: Uuid,
) -> Result<Written<()>> {
  store
    .delete_event_role(tree_id, event_role_id)
    .await
    .map_err(Error::store)?;
  Ok(Written::new((), vec![Key::EventRoles]))
}

// ─── Place types ─────────────────────────────────────────────────────────────

pub async fn list_place_types<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
) -> Result<Vec<PlaceType>> {
  store.list_place_types(tree_id).await.map_err(Error::store)
}

pub async fn create_place_type<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  draft: LookupDraft,
) -> Result<Written<PlaceType>> {
  let place_type = store
    .add_place_type(tree_id, draft)
    .await
    .map_err(Error::store)?;
  Ok(Written::new(place_type, vec![Key::PlaceTypes]))
}

pub async fn update_place_type<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  place_type_id: Uuid,
  draft: LookupDraft,
) -> Result<Written<()>> {
  store
    .update_place_type(tree_id, place_type_id, draft)
    .await
    .map_err(Error::store)?;
  Ok(Written::new((), vec![Key::PlaceTypes]))
}

pub async fn delete_place_type<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  place_type_id: Uuid,
) -> Result<Written<()>> {
  store
    .delete_place_type(tree_id, place_type_id)
    .await
    .map_err(Error::store)?;
  Ok(Written::new((), vec![Key::PlaceTypes]))
}
