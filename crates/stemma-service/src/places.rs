//! Place use cases: plain row writes, the recursive hierarchy projection,
//! and the places table.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use stemma_core::{
  place::{ParentFilter, Place, PlaceDraft, PlaceFilter},
  policy::{self, EntityKind, OnDelete},
  query::{Paged, PlaceSortField, SortDirection, TableQuery},
  store::TreeStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{Key, Written},
};

/// Type name shown for places whose `type_id` is null or unresolvable.
const UNKNOWN_TYPE: &str = "unknown";

// ─── View models ─────────────────────────────────────────────────────────────

/// A place with its type name resolved — the flat row shape.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlaceRow {
  pub place:     Place,
  pub type_name: String,
}

/// The place detail view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlaceView {
  pub place:     Place,
  pub type_name: String,
  pub parent:    Option<Place>,
}

/// A node of the recursive hierarchy. `level` is 0 for the root's direct
/// children and grows by one per depth.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlaceNode {
  pub place:     Place,
  pub type_name: String,
  pub level:     usize,
  pub children:  Vec<PlaceNode>,
}

// ─── Writes ──────────────────────────────────────────────────────────────────

pub async fn create_place<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  draft: PlaceDraft,
) -> Result<Written<Place>> {
  let place = store
    .add_place(tree_id, draft)
    .await
    .map_err(Error::store)?;

  Ok(Written::new(place, vec![Key::Places]))
}

pub async fn update_place<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  place_id: Uuid,
  draft: PlaceDraft,
) -> Result<Written<()>> {
  store
    .update_place(tree_id, place_id, draft)
    .await
    .map_err(Error::store)?;

  Ok(Written::new((), vec![Key::Places, Key::Place(place_id)]))
}

/// Delete a place. Children keep living with their `parent_id` nulled, and
/// events referencing it keep living with their `place_id` nulled — both by
/// backend constraint, not explicit code.
pub async fn delete_place<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  place_id: Uuid,
) -> Result<Written<()>> {
  debug_assert_eq!(
    policy::on_delete(EntityKind::Place, EntityKind::Place),
    Some(OnDelete::SetNull)
  );
  debug_assert_eq!(
    policy::on_delete(EntityKind::Place, EntityKind::Event),
    Some(OnDelete::SetNull)
  );

  store
    .delete_place(tree_id, place_id)
    .await
    .map_err(Error::store)?;

  Ok(Written::new(
    (),
    vec![Key::Places, Key::Place(place_id), Key::Events],
  ))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

async fn type_names<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
) -> Result<HashMap<Uuid, String>> {
  let types = store
    .list_place_types(tree_id)
    .await
    .map_err(Error::store)?;
  Ok(
    types
      .into_iter()
      .map(|t| (t.place_type_id, t.name))
      .collect(),
  )
}

fn resolve_type(names: &HashMap<Uuid, String>, type_id: Option<Uuid>) -> String {
  type_id
    .and_then(|id| names.get(&id))
    .cloned()
    .unwrap_or_else(|| UNKNOWN_TYPE.to_owned())
}

/// Fetch one place with its type name and parent resolved. Raises
/// `NotFound` when missing and `MultipleFound` on an ambiguous id.
pub async fn fetch_place<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  place_id: Uuid,
) -> Result<PlaceView> {
  let (mut places, names) = tokio::try_join!(
    async {
      store
        .list_places(
          tree_id,
          PlaceFilter { ids: Some(vec![place_id]), parent: None },
        )
        .await
        .map_err(Error::store)
    },
    async { type_names(store, tree_id).await },
  )?;

  if places.len() > 1 {
    return Err(Error::MultipleFound { kind: EntityKind::Place, id: place_id });
  }
  let place = places
    .pop()
    .ok_or_else(|| Error::not_found(EntityKind::Place, place_id))?;

  let parent = match place.parent_id {
    Some(parent_id) => store
      .get_place(tree_id, parent_id)
      .await
      .map_err(Error::store)?,
    None => None,
  };

  let type_name = resolve_type(&names, place.type_id);
  Ok(PlaceView { place, type_name, parent })
}

/// The direct children of a place, ordered by name, with type names
/// resolved ("unknown" when untyped).
pub async fn fetch_child_places<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  parent_id: Uuid,
) -> Result<Vec<PlaceRow>> {
  let (places, names) = tokio::try_join!(
    async {
      store
        .list_places(
          tree_id,
          PlaceFilter { ids: None, parent: Some(ParentFilter::Of(parent_id)) },
        )
        .await
        .map_err(Error::store)
    },
    async { type_names(store, tree_id).await },
  )?;

  Ok(
    places
      .into_iter()
      .map(|place| {
        let type_name = resolve_type(&names, place.type_id);
        PlaceRow { place, type_name }
      })
      .collect(),
  )
}

fn descend<'a, S: TreeStore>(
  store: &'a S,
  tree_id: Uuid,
  parent_id: Uuid,
  level: usize,
  names: &'a HashMap<Uuid, String>,
  visited: &'a mut HashSet<Uuid>,
) -> Pin<Box<dyn Future<Output = Result<Vec<PlaceNode>>> + Send + 'a>> {
  Box::pin(async move {
    let places = store
      .list_places(
        tree_id,
        PlaceFilter { ids: None, parent: Some(ParentFilter::Of(parent_id)) },
      )
      .await
      .map_err(Error::store)?;

    let mut nodes = Vec::with_capacity(places.len());
    for place in places {
      // Impossible under the schema's constraints; checked so a corrupt
      // hierarchy surfaces as an error instead of unbounded recursion.
      if !visited.insert(place.place_id) {
        return Err(Error::PlaceCycle(place.place_id));
      }

      let children =
        descend(store, tree_id, place.place_id, level + 1, names, visited)
          .await?;
      let type_name = resolve_type(names, place.type_id);
      nodes.push(PlaceNode { place, type_name, level, children });
    }
    Ok(nodes)
  })
}

/// Fetch the subtree under `parent_id`: direct children ordered by name,
/// each annotated with its depth (0 for direct children) and carrying its
/// own recursively-fetched children. A place with no children is a leaf
/// with an empty list, not an error.
pub async fn fetch_places_recursively<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  parent_id: Uuid,
) -> Result<Vec<PlaceNode>> {
  let names = type_names(store, tree_id).await?;
  let mut visited = HashSet::from([parent_id]);
  descend(store, tree_id, parent_id, 0, &names, &mut visited).await
}

/// Flatten a recursive place structure into pre-order: each node
/// immediately followed by its entire subtree. Flattened nodes keep their
/// `level`; their child lists are emptied since the sequence itself carries
/// the structure.
pub fn flatten_places(nodes: Vec<PlaceNode>) -> Vec<PlaceNode> {
  let mut result = Vec::new();
  for mut node in nodes {
    let children = std::mem::take(&mut node.children);
    result.push(node);
    result.extend(flatten_places(children));
  }
  result
}

/// The places table: every place with its type name, filtered by a
/// case-insensitive name search, sorted (name ascending by default), and
/// sliced to one page.
pub async fn fetch_places_for_table<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  query: TableQuery<PlaceSortField>,
) -> Result<Paged<PlaceRow>> {
  let (places, names) = tokio::try_join!(
    async {
      store
        .list_places(tree_id, PlaceFilter::default())
        .await
        .map_err(Error::store)
    },
    async { type_names(store, tree_id).await },
  )?;

  let mut rows: Vec<PlaceRow> = places
    .into_iter()
    .map(|place| {
      let type_name = resolve_type(&names, place.type_id);
      PlaceRow { place, type_name }
    })
    .collect();

  if let Some(search) = query.search.as_deref().map(str::to_lowercase)
    && !search.is_empty()
  {
    rows.retain(|row| row.place.name.to_lowercase().contains(&search));
  }

  let (field, direction) = match query.sort {
    Some(sort) => (sort.field, sort.direction),
    None => (PlaceSortField::Name, SortDirection::Asc),
  };
  rows.sort_by(|a, b| {
    let key = |row: &PlaceRow| match field {
      PlaceSortField::Name => row.place.name.to_lowercase(),
      PlaceSortField::Kind => row.type_name.to_lowercase(),
    };
    direction.apply(key(a).cmp(&key(b)))
  });

  Ok(Paged::slice(rows, query.page))
}
