//! Tree management: creation with reference-data seeding, selection of the
//! default tree, and tenant-wide deletion.

use stemma_core::{
  lookup::{
    DEFAULT_EVENT_ROLES, DEFAULT_EVENT_TYPES, DEFAULT_PLACE_TYPES, LookupDraft,
  },
  policy::EntityKind,
  store::TreeStore,
  tree::{Tree, TreeUpdate},
};
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{Key, Written},
};

/// Create a tree and seed its three lookup tables with the default
/// reference data, so a fresh tree is immediately usable.
pub async fn create_tree<S: TreeStore>(
  store: &S,
  name: String,
  is_default: bool,
) -> Result<Written<Tree>> {
  let tree = store
    .add_tree(name, is_default)
    .await
    .map_err(Error::store)?;

  tracing::debug!(tree = %tree.tree_id, "seeding reference data");
  for (name, key) in DEFAULT_EVENT_TYPES {
    store
      .add_event_type(tree.tree_id, LookupDraft::seeded(name, key))
      .await
      .map_err(Error::store)?;
  }
  for (name, key) in DEFAULT_EVENT_ROLES {
    store
      .add_event_role(tree.tree_id, LookupDraft::seeded(name, key))
      .await
      .map_err(Error::store)?;
  }
  for (name, key) in DEFAULT_PLACE_TYPES {
    store
      .add_place_type(tree.tree_id, LookupDraft::seeded(name, key))
      .await
      .map_err(Error::store)?;
  }

  Ok(Written::new(
    tree,
    vec![Key::Trees, Key::EventTypes, Key::EventRoles, Key::PlaceTypes],
  ))
}

pub async fn list_trees<S: TreeStore>(store: &S) -> Result<Vec<Tree>> {
  store.list_trees().await.map_err(Error::store)
}

/// Fetch one tree. Raises `NotFound` when missing.
pub async fn fetch_tree<S: TreeStore>(store: &S, tree_id: Uuid) -> Result<Tree> {
  store
    .get_tree(tree_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found(EntityKind::Tree, tree_id))
}

/// The tree selected on first load: the one flagged default, else the first
/// by name. More than one flagged default is possible — nothing enforces
/// uniqueness at write time — and the first flagged one wins.
pub async fn default_tree<S: TreeStore>(store: &S) -> Result<Option<Tree>> {
  let trees = store.list_trees().await.map_err(Error::store)?;
  Ok(
    trees
      .iter()
      .find(|t| t.is_default)
      .or_else(|| trees.first())
      .cloned(),
  )
}

pub async fn update_tree<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  update: TreeUpdate,
) -> Result<Written<()>> {
  store
    .update_tree(tree_id, update)
    .await
    .map_err(Error::store)?;

  Ok(Written::new((), vec![Key::Trees, Key::Tree(tree_id)]))
}

/// Delete a tree and every record scoped to it.
pub async fn delete_tree<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
) -> Result<Written<()>> {
  store.delete_tree(tree_id).await.map_err(Error::store)?;

  Ok(Written::new(
    (),
    vec![
      Key::Trees,
      Key::Tree(tree_id),
      Key::Individuals,
      Key::Families,
      Key::Events,
      Key::Places,
      Key::EventTypes,
      Key::EventRoles,
      Key::PlaceTypes,
    ],
  ))
}
