//! Family use cases: writes with full-replace child sets, and the family
//! projections (spouse resolution, family/child table assembly).

use stemma_core::{
  display::NamePart,
  family::{Family, FamilyDraft},
  policy::{self, EntityKind, OnDelete},
  query::{FamilySortField, Paged, SortDirection, TableQuery},
  store::{FamilyFilter, TreeStore},
};
use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{Key, Written},
  individuals::{IndividualView, fetch_individuals},
};

// ─── View model ──────────────────────────────────────────────────────────────

/// A family joined with its spouses and children. Either spouse side may be
/// absent — the link is nullable and display surfaces render an "add"
/// affordance instead of erroring.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FamilyView {
  pub family:   Family,
  pub husband:  Option<IndividualView>,
  pub wife:     Option<IndividualView>,
  pub children: Vec<IndividualView>,
}

impl FamilyView {
  /// The spouse relative to `reference`: whichever populated side does not
  /// match the reference id. A reference matching neither side (stale data)
  /// resolves to `None`, never an error.
  pub fn spouse_of(&self, reference: Uuid) -> Option<&IndividualView> {
    let id_of =
      |side: &Option<IndividualView>| side.as_ref().map(|v| v.individual.individual_id);

    if id_of(&self.husband) == Some(reference) {
      self.wife.as_ref()
    } else if id_of(&self.wife) == Some(reference) {
      self.husband.as_ref()
    } else {
      None
    }
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Insert a family and its child rows. Child entries without an individual
/// id are filtered out, not rejected; an empty filtered list inserts
/// nothing.
pub async fn create_family<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  draft: FamilyDraft,
) -> Result<Written<Family>> {
  let family = store
    .add_family(tree_id, draft.write())
    .await
    .map_err(Error::store)?;

  let child_ids = draft.child_ids();
  if !child_ids.is_empty() {
    store
      .insert_family_children(tree_id, family.family_id, child_ids)
      .await
      .map_err(Error::store)?;
  }

  Ok(Written::new(family, vec![Key::Families]))
}

/// Update a family's scalar fields, then full-replace its child set: all
/// existing child rows are deleted unconditionally and the filtered
/// submitted list re-inserted as brand-new rows. A child present before and
/// after still gets a new row id — this is a replacement, never a diff.
pub async fn update_family<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  family_id: Uuid,
  draft: FamilyDraft,
) -> Result<Written<()>> {
  store
    .update_family(tree_id, family_id, draft.write())
    .await
    .map_err(Error::store)?;

  store
    .delete_family_children(tree_id, family_id)
    .await
    .map_err(Error::store)?;

  let child_ids = draft.child_ids();
  if !child_ids.is_empty() {
    store
      .insert_family_children(tree_id, family_id, child_ids)
      .await
      .map_err(Error::store)?;
  }

  Ok(Written::new((), vec![Key::Families, Key::Family(family_id)]))
}

/// Delete a family. Child rows cascade with it; the individuals referenced
/// as spouses or children are preserved.
pub async fn delete_family<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  family_id: Uuid,
) -> Result<Written<()>> {
  debug_assert_eq!(
    policy::on_delete(EntityKind::Family, EntityKind::FamilyChild),
    Some(OnDelete::Cascade)
  );

  store
    .delete_family(tree_id, family_id)
    .await
    .map_err(Error::store)?;

  Ok(Written::new((), vec![Key::Families, Key::Family(family_id)]))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Fetch families with spouses and children resolved.
///
/// Families, child rows, and individuals come from separate queries joined
/// in memory by id equality. A child row whose individual was not fetched is
/// silently dropped — the projection tolerates partial backend
/// inconsistency rather than erroring.
pub async fn fetch_families<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  filter: FamilyFilter,
) -> Result<Vec<FamilyView>> {
  let families = store
    .list_families(tree_id, filter)
    .await
    .map_err(Error::store)?;

  let family_ids: Vec<Uuid> = families.iter().map(|f| f.family_id).collect();
  let child_rows = store
    .list_family_children(tree_id, Some(family_ids))
    .await
    .map_err(Error::store)?;

  let mut involved: Vec<Uuid> = families
    .iter()
    .flat_map(|f| [f.husband_id, f.wife_id])
    .flatten()
    .chain(child_rows.iter().map(|c| c.individual_id))
    .collect();
  involved.sort_unstable();
  involved.dedup();

  let individuals = fetch_individuals(store, tree_id, Some(involved)).await?;
  let find =
    |id: Uuid| individuals.iter().find(|v| v.individual.individual_id == id);

  Ok(
    families
      .into_iter()
      .map(|family| {
        let husband = family.husband_id.and_then(&find).cloned();
        let wife = family.wife_id.and_then(&find).cloned();
        let children = child_rows
          .iter()
          .filter(|c| c.family_id == family.family_id)
          .filter_map(|c| find(c.individual_id))
          .cloned()
          .collect();
        FamilyView { family, husband, wife, children }
      })
      .collect(),
  )
}

/// Fetch one family. Raises `NotFound` when missing and `MultipleFound`
/// when the id is somehow ambiguous — never silently the first row.
pub async fn fetch_family<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  family_id: Uuid,
) -> Result<FamilyView> {
  let mut families = fetch_families(
    store,
    tree_id,
    FamilyFilter { ids: Some(vec![family_id]), spouse_id: None },
  )
  .await?;

  if families.len() > 1 {
    return Err(Error::MultipleFound { kind: EntityKind::Family, id: family_id });
  }

  families
    .pop()
    .ok_or_else(|| Error::not_found(EntityKind::Family, family_id))
}

/// The families where an individual is husband or wife.
pub async fn fetch_families_as_spouse<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  individual_id: Uuid,
) -> Result<Vec<FamilyView>> {
  fetch_families(
    store,
    tree_id,
    FamilyFilter { ids: None, spouse_id: Some(individual_id) },
  )
  .await
}

/// The families where an individual is a child.
pub async fn fetch_families_as_child<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  individual_id: Uuid,
) -> Result<Vec<FamilyView>> {
  let memberships = store
    .list_child_memberships(tree_id, individual_id)
    .await
    .map_err(Error::store)?;

  let family_ids: Vec<Uuid> =
    memberships.into_iter().map(|m| m.family_id).collect();

  fetch_families(
    store,
    tree_id,
    FamilyFilter { ids: Some(family_ids), spouse_id: None },
  )
  .await
}

fn spouse_sort_key(view: &FamilyView, field: FamilySortField) -> String {
  let (side, part) = match field {
    FamilySortField::HusbandFirstName => (&view.husband, NamePart::First),
    FamilySortField::HusbandLastName => (&view.husband, NamePart::Last),
    FamilySortField::WifeFirstName => (&view.wife, NamePart::First),
    FamilySortField::WifeLastName => (&view.wife, NamePart::Last),
  };
  side
    .as_ref()
    .map(|v| v.display_name(part).to_lowercase())
    .unwrap_or_default()
}

/// The families table: assembled views filtered by a case-insensitive
/// member-name search, sorted (husband's last name ascending by default),
/// and sliced to one page.
pub async fn fetch_families_for_table<S: TreeStore>(
  store: &S,
  tree_id: Uuid,
  query: TableQuery<FamilySortField>,
) -> Result<Paged<FamilyView>> {
  let mut views = fetch_families(store, tree_id, FamilyFilter::default()).await?;

  if let Some(search) = query.search.as_deref().map(str::to_lowercase)
    && !search.is_empty()
  {
    views.retain(|view| {
      view
        .husband
        .iter()
        .chain(view.wife.iter())
        .chain(view.children.iter())
        .any(|member| {
          member
            .display_name(NamePart::Full)
            .to_lowercase()
            .contains(&search)
        })
    });
  }

  let (field, direction) = match query.sort {
    Some(sort) => (sort.field, sort.direction),
    None => (FamilySortField::HusbandLastName, SortDirection::Asc),
  };
  views.sort_by(|a, b| {
    direction
      .apply(spouse_sort_key(a, field).cmp(&spouse_sort_key(b, field)))
  });

  Ok(Paged::slice(views, query.page))
}
