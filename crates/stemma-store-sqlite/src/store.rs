//! [`SqliteStore`] — the SQLite implementation of [`TreeStore`].
//!
//! Every query is scoped by `tree_id` in addition to any primary key, so an
//! id from another tree is indistinguishable from a missing row. The store
//! performs single-table operations only; multi-table consistency sequences
//! belong to `stemma-service`.

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use std::path::Path;
use uuid::Uuid;

use stemma_core::{
  event::{
    Event, EventFilter, EventParticipant, EventSubject, EventWrite,
    ParticipantDraft,
  },
  family::{Family, FamilyChild, FamilyWrite},
  individual::{Gender, Individual, Name, NameWrite},
  lookup::{EventRole, EventType, LookupDraft, PlaceType},
  place::{ParentFilter, Place, PlaceDraft, PlaceFilter},
  policy::EntityKind,
  store::{FamilyFilter, TreeStore},
  tree::{Tree, TreeUpdate},
};

use crate::{
  Error, Result,
  encode::{
    RawEvent, RawEventParticipant, RawEventSubject, RawFamily, RawFamilyChild,
    RawIndividual, RawLookup, RawName, RawPlace, RawTree, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row mappers ─────────────────────────────────────────────────────────────

const TREE_COLS: &str = "tree_id, created_at, name, is_default";
const INDIVIDUAL_COLS: &str =
  "individual_id, tree_id, created_at, gender, gedcom_id";
const NAME_COLS: &str = "name_id, tree_id, individual_id, created_at, kind, \
                         first_name, last_name, surname, is_primary";
const FAMILY_COLS: &str =
  "family_id, tree_id, created_at, husband_id, wife_id, kind, gedcom_id";
const FAMILY_CHILD_COLS: &str =
  "family_child_id, tree_id, family_id, individual_id, created_at";
const EVENT_COLS: &str = "event_id, tree_id, created_at, type_id, date, \
                          description, place_id, gedcom_id";
const EVENT_SUBJECT_COLS: &str =
  "event_subject_id, tree_id, event_id, individual_id, created_at";
const EVENT_PARTICIPANT_COLS: &str = "event_participant_id, tree_id, \
                                      event_id, individual_id, role_id, created_at";
const PLACE_COLS: &str = "place_id, tree_id, created_at, name, type_id, \
                          parent_id, latitude, longitude, gedcom_id";

fn tree_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTree> {
  Ok(RawTree {
    tree_id:    row.get(0)?,
    created_at: row.get(1)?,
    name:       row.get(2)?,
    is_default: row.get(3)?,
  })
}

fn individual_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawIndividual> {
  Ok(RawIndividual {
    individual_id: row.get(0)?,
    tree_id:       row.get(1)?,
    created_at:    row.get(2)?,
    gender:        row.get(3)?,
    gedcom_id:     row.get(4)?,
  })
}

fn name_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawName> {
  Ok(RawName {
    name_id:       row.get(0)?,
    tree_id:       row.get(1)?,
    individual_id: row.get(2)?,
    created_at:    row.get(3)?,
    kind:          row.get(4)?,
    first_name:    row.get(5)?,
    last_name:     row.get(6)?,
    surname:       row.get(7)?,
    is_primary:    row.get(8)?,
  })
}

fn family_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFamily> {
  Ok(RawFamily {
    family_id:  row.get(0)?,
    tree_id:    row.get(1)?,
    created_at: row.get(2)?,
    husband_id: row.get(3)?,
    wife_id:    row.get(4)?,
    kind:       row.get(5)?,
    gedcom_id:  row.get(6)?,
  })
}

fn family_child_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawFamilyChild> {
  Ok(RawFamilyChild {
    family_child_id: row.get(0)?,
    tree_id:         row.get(1)?,
    family_id:       row.get(2)?,
    individual_id:   row.get(3)?,
    created_at:      row.get(4)?,
  })
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:    row.get(0)?,
    tree_id:     row.get(1)?,
    created_at:  row.get(2)?,
    type_id:     row.get(3)?,
    date:        row.get(4)?,
    description: row.get(5)?,
    place_id:    row.get(6)?,
    gedcom_id:   row.get(7)?,
  })
}

fn event_subject_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawEventSubject> {
  Ok(RawEventSubject {
    event_subject_id: row.get(0)?,
    tree_id:          row.get(1)?,
    event_id:         row.get(2)?,
    individual_id:    row.get(3)?,
    created_at:       row.get(4)?,
  })
}

fn event_participant_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawEventParticipant> {
  Ok(RawEventParticipant {
    event_participant_id: row.get(0)?,
    tree_id:              row.get(1)?,
    event_id:             row.get(2)?,
    individual_id:        row.get(3)?,
    role_id:              row.get(4)?,
    created_at:           row.get(5)?,
  })
}

fn lookup_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLookup> {
  Ok(RawLookup {
    id:         row.get(0)?,
    tree_id:    row.get(1)?,
    created_at: row.get(2)?,
    name:       row.get(3)?,
    key:        row.get(4)?,
  })
}

fn place_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPlace> {
  Ok(RawPlace {
    place_id:   row.get(0)?,
    tree_id:    row.get(1)?,
    created_at: row.get(2)?,
    name:       row.get(3)?,
    type_id:    row.get(4)?,
    parent_id:  row.get(5)?,
    latitude:   row.get(6)?,
    longitude:  row.get(7)?,
    gedcom_id:  row.get(8)?,
  })
}

// ─── SQL helpers ─────────────────────────────────────────────────────────────

/// `"?, ?, ?"` for a dynamic IN list of `n` values.
fn placeholders(n: usize) -> String {
  vec!["?"; n].join(", ")
}

/// The next per-tree GEDCOM sequence number for an aggregate table.
fn next_gedcom_id(
  conn: &rusqlite::Connection,
  table: &str,
  tree_id: &str,
) -> rusqlite::Result<i64> {
  conn.query_row(
    &format!(
      "SELECT COALESCE(MAX(gedcom_id), 0) + 1 FROM {table} WHERE tree_id = ?1"
    ),
    rusqlite::params![tree_id],
    |r| r.get(0),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stemma genealogy store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete a single aggregate row scoped to its tree. Zero affected rows
  /// raises [`Error::RowNotFound`].
  async fn delete_row(
    &self,
    table: &'static str,
    id_col: &'static str,
    kind: EntityKind,
    tree_id: Uuid,
    id: Uuid,
  ) -> Result<()> {
    let sql =
      format!("DELETE FROM {table} WHERE {id_col} = ?1 AND tree_id = ?2");
    let id_str = encode_uuid(id);
    let tree_str = encode_uuid(tree_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&sql, rusqlite::params![id_str, tree_str])?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound { kind, id });
    }
    Ok(())
  }

  /// Delete dependent rows by an equality predicate. Zero affected rows is
  /// legitimate and not an error.
  async fn delete_dependents(
    &self,
    sql: &'static str,
    params: Vec<String>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params_from_iter(params))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Shared lookup-table plumbing ──────────────────────────────────────

  async fn insert_lookup(
    &self,
    table: &'static str,
    id_col: &'static str,
    tree_id: Uuid,
    draft: LookupDraft,
  ) -> Result<RawLookup> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let raw = RawLookup {
      id:         encode_uuid(id),
      tree_id:    encode_uuid(tree_id),
      created_at: encode_dt(now),
      name:       draft.name,
      key:        draft.key,
    };

    let sql = format!(
      "INSERT INTO {table} ({id_col}, tree_id, created_at, name, key)
       VALUES (?1, ?2, ?3, ?4, ?5)"
    );
    let params = (
      raw.id.clone(),
      raw.tree_id.clone(),
      raw.created_at.clone(),
      raw.name.clone(),
      raw.key.clone(),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &sql,
          rusqlite::params![params.0, params.1, params.2, params.3, params.4],
        )?;
        Ok(())
      })
      .await?;

    Ok(raw)
  }

  async fn get_lookup(
    &self,
    table: &'static str,
    id_col: &'static str,
    tree_id: Uuid,
    id: Uuid,
  ) -> Result<Option<RawLookup>> {
    let sql = format!(
      "SELECT {id_col}, tree_id, created_at, name, key FROM {table}
       WHERE {id_col} = ?1 AND tree_id = ?2"
    );
    let id_str = encode_uuid(id);
    let tree_str = encode_uuid(tree_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![id_str, tree_str],
              lookup_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw)
  }

  async fn list_lookups(
    &self,
    table: &'static str,
    id_col: &'static str,
    tree_id: Uuid,
  ) -> Result<Vec<RawLookup>> {
    let sql = format!(
      "SELECT {id_col}, tree_id, created_at, name, key FROM {table}
       WHERE tree_id = ?1 ORDER BY name ASC"
    );
    let tree_str = encode_uuid(tree_id);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![tree_str], lookup_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws)
  }

  async fn update_lookup(
    &self,
    table: &'static str,
    id_col: &'static str,
    kind: EntityKind,
    tree_id: Uuid,
    id: Uuid,
    draft: LookupDraft,
  ) -> Result<()> {
    let sql = format!(
      "UPDATE {table} SET name = ?1, key = ?2
       WHERE {id_col} = ?3 AND tree_id = ?4"
    );
    let id_str = encode_uuid(id);
    let tree_str = encode_uuid(tree_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &sql,
          rusqlite::params![draft.name, draft.key, id_str, tree_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound { kind, id });
    }
    Ok(())
  }
}

// ─── TreeStore impl ──────────────────────────────────────────────────────────

impl TreeStore for SqliteStore {
  type Error = Error;

  // ── Trees ─────────────────────────────────────────────────────────────

  async fn add_tree(&self, name: String, is_default: bool) -> Result<Tree> {
    let tree = Tree {
      tree_id: Uuid::new_v4(),
      created_at: Utc::now(),
      name,
      is_default,
    };

    let id_str = encode_uuid(tree.tree_id);
    let at_str = encode_dt(tree.created_at);
    let name_str = tree.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO trees (tree_id, created_at, name, is_default)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, at_str, name_str, is_default],
        )?;
        Ok(())
      })
      .await?;

    Ok(tree)
  }

  async fn get_tree(&self, tree_id: Uuid) -> Result<Option<Tree>> {
    let id_str = encode_uuid(tree_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TREE_COLS} FROM trees WHERE tree_id = ?1"),
              rusqlite::params![id_str],
              tree_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTree::into_tree).transpose()
  }

  async fn list_trees(&self) -> Result<Vec<Tree>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {TREE_COLS} FROM trees ORDER BY name ASC"))?;
        let rows = stmt
          .query_map([], tree_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTree::into_tree).collect()
  }

  async fn update_tree(&self, tree_id: Uuid, update: TreeUpdate) -> Result<()> {
    let id_str = encode_uuid(tree_id);

    let affected = self
      .conn
      .call(move |conn| {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::types::ToSql + Send>> =
          Vec::new();

        if let Some(name) = update.name {
          sets.push("name = ?");
          params.push(Box::new(name));
        }
        if let Some(is_default) = update.is_default {
          sets.push("is_default = ?");
          params.push(Box::new(is_default));
        }

        if sets.is_empty() {
          // Nothing to change; still report whether the row exists.
          let exists: bool = conn
            .query_row(
              "SELECT 1 FROM trees WHERE tree_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          return Ok(usize::from(exists));
        }

        params.push(Box::new(id_str));
        let sql = format!(
          "UPDATE trees SET {} WHERE tree_id = ?",
          sets.join(", ")
        );
        Ok(conn.execute(
          &sql,
          rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound { kind: EntityKind::Tree, id: tree_id });
    }
    Ok(())
  }

  async fn delete_tree(&self, tree_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(tree_id);

    let affected = self
      .conn
      .call(move |conn| {
        // Explicit wipe in dependency order: restrict-protected lookup
        // tables must empty out after every row referencing them is gone.
        for table in [
          "event_participants",
          "event_subjects",
          "events",
          "family_children",
          "families",
          "names",
          "individuals",
          "places",
          "event_types",
          "event_roles",
          "place_types",
        ] {
          conn.execute(
            &format!("DELETE FROM {table} WHERE tree_id = ?1"),
            rusqlite::params![id_str],
          )?;
        }
        Ok(conn.execute(
          "DELETE FROM trees WHERE tree_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound { kind: EntityKind::Tree, id: tree_id });
    }
    Ok(())
  }

  // ── Individuals ───────────────────────────────────────────────────────

  async fn add_individual(
    &self,
    tree_id: Uuid,
    gender: Gender,
  ) -> Result<Individual> {
    let individual_id = Uuid::new_v4();
    let created_at = Utc::now();

    let id_str = encode_uuid(individual_id);
    let tree_str = encode_uuid(tree_id);
    let at_str = encode_dt(created_at);
    let gender_str = gender.as_str();

    let gedcom_id = self
      .conn
      .call(move |conn| {
        let seq = next_gedcom_id(conn, "individuals", &tree_str)?;
        conn.execute(
          "INSERT INTO individuals
             (individual_id, tree_id, created_at, gender, gedcom_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, tree_str, at_str, gender_str, seq],
        )?;
        Ok(seq)
      })
      .await?;

    Ok(Individual { individual_id, tree_id, created_at, gender, gedcom_id })
  }

  async fn get_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> Result<Option<Individual>> {
    let id_str = encode_uuid(individual_id);
    let tree_str = encode_uuid(tree_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {INDIVIDUAL_COLS} FROM individuals
                 WHERE individual_id = ?1 AND tree_id = ?2"
              ),
              rusqlite::params![id_str, tree_str],
              individual_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIndividual::into_individual).transpose()
  }

  async fn list_individuals(
    &self,
    tree_id: Uuid,
    ids: Option<Vec<Uuid>>,
  ) -> Result<Vec<Individual>> {
    if let Some(ids) = &ids
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let tree_str = encode_uuid(tree_id);
    let id_strs =
      ids.map(|ids| ids.into_iter().map(encode_uuid).collect::<Vec<_>>());

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql = format!(
          "SELECT {INDIVIDUAL_COLS} FROM individuals WHERE tree_id = ?"
        );
        let mut params = vec![tree_str];
        if let Some(ids) = id_strs {
          sql.push_str(&format!(
            " AND individual_id IN ({})",
            placeholders(ids.len())
          ));
          params.extend(ids);
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), individual_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIndividual::into_individual).collect()
  }

  async fn update_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
    gender: Gender,
  ) -> Result<()> {
    let id_str = encode_uuid(individual_id);
    let tree_str = encode_uuid(tree_id);
    let gender_str = gender.as_str();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE individuals SET gender = ?1
           WHERE individual_id = ?2 AND tree_id = ?3",
          rusqlite::params![gender_str, id_str, tree_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound {
        kind: EntityKind::Individual,
        id:   individual_id,
      });
    }
    Ok(())
  }

  async fn delete_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> Result<()> {
    self
      .delete_row(
        "individuals",
        "individual_id",
        EntityKind::Individual,
        tree_id,
        individual_id,
      )
      .await
  }

  // ── Names ─────────────────────────────────────────────────────────────

  async fn insert_names(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
    names: Vec<NameWrite>,
  ) -> Result<Vec<Name>> {
    let rows: Vec<Name> = names
      .into_iter()
      .map(|w| Name {
        name_id: Uuid::new_v4(),
        tree_id,
        individual_id,
        created_at: Utc::now(),
        kind: w.kind,
        first_name: w.first_name,
        last_name: w.last_name,
        surname: w.surname,
        is_primary: w.is_primary,
      })
      .collect();

    let to_insert = rows.clone();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "INSERT INTO names ({NAME_COLS})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ))?;
        for name in &to_insert {
          stmt.execute(rusqlite::params![
            encode_uuid(name.name_id),
            encode_uuid(name.tree_id),
            encode_uuid(name.individual_id),
            encode_dt(name.created_at),
            name.kind.as_str(),
            name.first_name,
            name.last_name,
            name.surname,
            name.is_primary,
          ])?;
        }
        Ok(())
      })
      .await?;

    Ok(rows)
  }

  async fn list_names(
    &self,
    tree_id: Uuid,
    individual_ids: Option<Vec<Uuid>>,
  ) -> Result<Vec<Name>> {
    if let Some(ids) = &individual_ids
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let tree_str = encode_uuid(tree_id);
    let id_strs = individual_ids
      .map(|ids| ids.into_iter().map(encode_uuid).collect::<Vec<_>>());

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql =
          format!("SELECT {NAME_COLS} FROM names WHERE tree_id = ?");
        let mut params = vec![tree_str];
        if let Some(ids) = id_strs {
          sql.push_str(&format!(
            " AND individual_id IN ({})",
            placeholders(ids.len())
          ));
          params.extend(ids);
        }
        // Stable order so the "first element" primary fallback is
        // deterministic.
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), name_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawName::into_name).collect()
  }

  async fn delete_names_for(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> Result<()> {
    self
      .delete_dependents(
        "DELETE FROM names WHERE individual_id = ? AND tree_id = ?",
        vec![encode_uuid(individual_id), encode_uuid(tree_id)],
      )
      .await
  }

  // ── Families ──────────────────────────────────────────────────────────

  async fn add_family(
    &self,
    tree_id: Uuid,
    write: FamilyWrite,
  ) -> Result<Family> {
    let family_id = Uuid::new_v4();
    let created_at = Utc::now();

    let id_str = encode_uuid(family_id);
    let tree_str = encode_uuid(tree_id);
    let at_str = encode_dt(created_at);
    let husband_str = write.husband_id.map(encode_uuid);
    let wife_str = write.wife_id.map(encode_uuid);
    let kind_str = write.kind.as_str();

    let gedcom_id = self
      .conn
      .call(move |conn| {
        let seq = next_gedcom_id(conn, "families", &tree_str)?;
        conn.execute(
          &format!(
            "INSERT INTO families ({FAMILY_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
          ),
          rusqlite::params![
            id_str,
            tree_str,
            at_str,
            husband_str,
            wife_str,
            kind_str,
            seq
          ],
        )?;
        Ok(seq)
      })
      .await?;

    Ok(Family {
      family_id,
      tree_id,
      created_at,
      husband_id: write.husband_id,
      wife_id: write.wife_id,
      kind: write.kind,
      gedcom_id,
    })
  }

  async fn get_family(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
  ) -> Result<Option<Family>> {
    let id_str = encode_uuid(family_id);
    let tree_str = encode_uuid(tree_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FAMILY_COLS} FROM families
                 WHERE family_id = ?1 AND tree_id = ?2"
              ),
              rusqlite::params![id_str, tree_str],
              family_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFamily::into_family).transpose()
  }

  async fn list_families(
    &self,
    tree_id: Uuid,
    filter: FamilyFilter,
  ) -> Result<Vec<Family>> {
    if let Some(ids) = &filter.ids
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let tree_str = encode_uuid(tree_id);
    let id_strs = filter
      .ids
      .map(|ids| ids.into_iter().map(encode_uuid).collect::<Vec<_>>());
    let spouse_str = filter.spouse_id.map(encode_uuid);

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql =
          format!("SELECT {FAMILY_COLS} FROM families WHERE tree_id = ?");
        let mut params = vec![tree_str];
        if let Some(ids) = id_strs {
          sql.push_str(&format!(
            " AND family_id IN ({})",
            placeholders(ids.len())
          ));
          params.extend(ids);
        }
        if let Some(spouse) = spouse_str {
          sql.push_str(" AND (husband_id = ? OR wife_id = ?)");
          params.push(spouse.clone());
          params.push(spouse);
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), family_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFamily::into_family).collect()
  }

  async fn update_family(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
    write: FamilyWrite,
  ) -> Result<()> {
    let id_str = encode_uuid(family_id);
    let tree_str = encode_uuid(tree_id);
    let husband_str = write.husband_id.map(encode_uuid);
    let wife_str = write.wife_id.map(encode_uuid);
    let kind_str = write.kind.as_str();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE families SET husband_id = ?1, wife_id = ?2, kind = ?3
           WHERE family_id = ?4 AND tree_id = ?5",
          rusqlite::params![husband_str, wife_str, kind_str, id_str, tree_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound {
        kind: EntityKind::Family,
        id:   family_id,
      });
    }
    Ok(())
  }

  async fn delete_family(&self, tree_id: Uuid, family_id: Uuid) -> Result<()> {
    self
      .delete_row(
        "families",
        "family_id",
        EntityKind::Family,
        tree_id,
        family_id,
      )
      .await
  }

  // ── Family children ───────────────────────────────────────────────────

  async fn insert_family_children(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
    individual_ids: Vec<Uuid>,
  ) -> Result<()> {
    if individual_ids.is_empty() {
      return Ok(());
    }

    let tree_str = encode_uuid(tree_id);
    let family_str = encode_uuid(family_id);

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "INSERT INTO family_children ({FAMILY_CHILD_COLS})
           VALUES (?1, ?2, ?3, ?4, ?5)"
        ))?;
        for individual_id in &individual_ids {
          stmt.execute(rusqlite::params![
            encode_uuid(Uuid::new_v4()),
            tree_str,
            family_str,
            encode_uuid(*individual_id),
            encode_dt(Utc::now()),
          ])?;
        }
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn list_family_children(
    &self,
    tree_id: Uuid,
    family_ids: Option<Vec<Uuid>>,
  ) -> Result<Vec<FamilyChild>> {
    if let Some(ids) = &family_ids
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let tree_str = encode_uuid(tree_id);
    let id_strs = family_ids
      .map(|ids| ids.into_iter().map(encode_uuid).collect::<Vec<_>>());

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql = format!(
          "SELECT {FAMILY_CHILD_COLS} FROM family_children WHERE tree_id = ?"
        );
        let mut params = vec![tree_str];
        if let Some(ids) = id_strs {
          sql.push_str(&format!(
            " AND family_id IN ({})",
            placeholders(ids.len())
          ));
          params.extend(ids);
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), family_child_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawFamilyChild::into_family_child)
      .collect()
  }

  async fn list_child_memberships(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> Result<Vec<FamilyChild>> {
    let tree_str = encode_uuid(tree_id);
    let id_str = encode_uuid(individual_id);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FAMILY_CHILD_COLS} FROM family_children
           WHERE individual_id = ?1 AND tree_id = ?2
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![id_str, tree_str],
            family_child_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawFamilyChild::into_family_child)
      .collect()
  }

  async fn delete_family_children(
    &self,
    tree_id: Uuid,
    family_id: Uuid,
  ) -> Result<()> {
    self
      .delete_dependents(
        "DELETE FROM family_children WHERE family_id = ? AND tree_id = ?",
        vec![encode_uuid(family_id), encode_uuid(tree_id)],
      )
      .await
  }

  // ── Events ────────────────────────────────────────────────────────────

  async fn add_event(&self, tree_id: Uuid, write: EventWrite) -> Result<Event> {
    let event_id = Uuid::new_v4();
    let created_at = Utc::now();

    let id_str = encode_uuid(event_id);
    let tree_str = encode_uuid(tree_id);
    let at_str = encode_dt(created_at);
    let type_str = encode_uuid(write.type_id);
    let place_str = write.place_id.map(encode_uuid);
    let date = write.date.clone();
    let description = write.description.clone();

    let gedcom_id = self
      .conn
      .call(move |conn| {
        let seq = next_gedcom_id(conn, "events", &tree_str)?;
        conn.execute(
          &format!(
            "INSERT INTO events ({EVENT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ),
          rusqlite::params![
            id_str,
            tree_str,
            at_str,
            type_str,
            date,
            description,
            place_str,
            seq
          ],
        )?;
        Ok(seq)
      })
      .await?;

    Ok(Event {
      event_id,
      tree_id,
      created_at,
      type_id: write.type_id,
      date: write.date,
      description: write.description,
      place_id: write.place_id,
      gedcom_id,
    })
  }

  async fn get_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> Result<Option<Event>> {
    let id_str = encode_uuid(event_id);
    let tree_str = encode_uuid(tree_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EVENT_COLS} FROM events
                 WHERE event_id = ?1 AND tree_id = ?2"
              ),
              rusqlite::params![id_str, tree_str],
              event_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_events(
    &self,
    tree_id: Uuid,
    filter: EventFilter,
  ) -> Result<Vec<Event>> {
    for ids in [&filter.ids, &filter.type_ids, &filter.place_ids] {
      if let Some(ids) = ids
        && ids.is_empty()
      {
        return Ok(Vec::new());
      }
    }

    let tree_str = encode_uuid(tree_id);
    let encode_all = |ids: Vec<Uuid>| {
      ids.into_iter().map(encode_uuid).collect::<Vec<_>>()
    };
    let id_strs = filter.ids.map(encode_all);
    let type_strs = filter.type_ids.map(encode_all);
    let place_strs = filter.place_ids.map(encode_all);

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql =
          format!("SELECT {EVENT_COLS} FROM events WHERE tree_id = ?");
        let mut params = vec![tree_str];
        for (col, strs) in [
          ("event_id", id_strs),
          ("type_id", type_strs),
          ("place_id", place_strs),
        ] {
          if let Some(ids) = strs {
            sql.push_str(&format!(" AND {col} IN ({})", placeholders(ids.len())));
            params.extend(ids);
          }
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn update_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    write: EventWrite,
  ) -> Result<()> {
    let id_str = encode_uuid(event_id);
    let tree_str = encode_uuid(tree_id);
    let type_str = encode_uuid(write.type_id);
    let place_str = write.place_id.map(encode_uuid);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE events
             SET type_id = ?1, date = ?2, description = ?3, place_id = ?4
           WHERE event_id = ?5 AND tree_id = ?6",
          rusqlite::params![
            type_str,
            write.date,
            write.description,
            place_str,
            id_str,
            tree_str
          ],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound { kind: EntityKind::Event, id: event_id });
    }
    Ok(())
  }

  async fn delete_event(&self, tree_id: Uuid, event_id: Uuid) -> Result<()> {
    self
      .delete_row("events", "event_id", EntityKind::Event, tree_id, event_id)
      .await
  }

  // ── Event subjects ────────────────────────────────────────────────────

  async fn insert_event_subjects(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    individual_ids: Vec<Uuid>,
  ) -> Result<()> {
    if individual_ids.is_empty() {
      return Ok(());
    }

    let tree_str = encode_uuid(tree_id);
    let event_str = encode_uuid(event_id);

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "INSERT INTO event_subjects ({EVENT_SUBJECT_COLS})
           VALUES (?1, ?2, ?3, ?4, ?5)"
        ))?;
        for individual_id in &individual_ids {
          stmt.execute(rusqlite::params![
            encode_uuid(Uuid::new_v4()),
            tree_str,
            event_str,
            encode_uuid(*individual_id),
            encode_dt(Utc::now()),
          ])?;
        }
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn list_event_subjects(
    &self,
    tree_id: Uuid,
    event_ids: Option<Vec<Uuid>>,
  ) -> Result<Vec<EventSubject>> {
    if let Some(ids) = &event_ids
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let tree_str = encode_uuid(tree_id);
    let id_strs =
      event_ids.map(|ids| ids.into_iter().map(encode_uuid).collect::<Vec<_>>());

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql = format!(
          "SELECT {EVENT_SUBJECT_COLS} FROM event_subjects WHERE tree_id = ?"
        );
        let mut params = vec![tree_str];
        if let Some(ids) = id_strs {
          sql.push_str(&format!(
            " AND event_id IN ({})",
            placeholders(ids.len())
          ));
          params.extend(ids);
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params),
            event_subject_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawEventSubject::into_event_subject)
      .collect()
  }

  async fn list_subject_rows_for_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> Result<Vec<EventSubject>> {
    let tree_str = encode_uuid(tree_id);
    let id_str = encode_uuid(individual_id);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_SUBJECT_COLS} FROM event_subjects
           WHERE individual_id = ?1 AND tree_id = ?2
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![id_str, tree_str],
            event_subject_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawEventSubject::into_event_subject)
      .collect()
  }

  async fn count_event_subjects(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> Result<usize> {
    let tree_str = encode_uuid(tree_id);
    let event_str = encode_uuid(event_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM event_subjects
           WHERE event_id = ?1 AND tree_id = ?2",
          rusqlite::params![event_str, tree_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count as usize)
  }

  async fn delete_event_subjects_for_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> Result<()> {
    self
      .delete_dependents(
        "DELETE FROM event_subjects WHERE event_id = ? AND tree_id = ?",
        vec![encode_uuid(event_id), encode_uuid(tree_id)],
      )
      .await
  }

  async fn delete_event_subject_row(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    individual_id: Uuid,
  ) -> Result<()> {
    self
      .delete_dependents(
        "DELETE FROM event_subjects
         WHERE event_id = ? AND individual_id = ? AND tree_id = ?",
        vec![
          encode_uuid(event_id),
          encode_uuid(individual_id),
          encode_uuid(tree_id),
        ],
      )
      .await
  }

  // ── Event participants ────────────────────────────────────────────────

  async fn insert_event_participants(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
    entries: Vec<ParticipantDraft>,
  ) -> Result<()> {
    if entries.is_empty() {
      return Ok(());
    }

    let tree_str = encode_uuid(tree_id);
    let event_str = encode_uuid(event_id);

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "INSERT INTO event_participants ({EVENT_PARTICIPANT_COLS})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ))?;
        for entry in &entries {
          stmt.execute(rusqlite::params![
            encode_uuid(Uuid::new_v4()),
            tree_str,
            event_str,
            encode_uuid(entry.individual_id),
            encode_uuid(entry.role_id),
            encode_dt(Utc::now()),
          ])?;
        }
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn list_event_participants(
    &self,
    tree_id: Uuid,
    event_ids: Option<Vec<Uuid>>,
  ) -> Result<Vec<EventParticipant>> {
    if let Some(ids) = &event_ids
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let tree_str = encode_uuid(tree_id);
    let id_strs =
      event_ids.map(|ids| ids.into_iter().map(encode_uuid).collect::<Vec<_>>());

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql = format!(
          "SELECT {EVENT_PARTICIPANT_COLS} FROM event_participants
           WHERE tree_id = ?"
        );
        let mut params = vec![tree_str];
        if let Some(ids) = id_strs {
          sql.push_str(&format!(
            " AND event_id IN ({})",
            placeholders(ids.len())
          ));
          params.extend(ids);
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params),
            event_participant_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawEventParticipant::into_event_participant)
      .collect()
  }

  async fn delete_event_participants_for_event(
    &self,
    tree_id: Uuid,
    event_id: Uuid,
  ) -> Result<()> {
    self
      .delete_dependents(
        "DELETE FROM event_participants WHERE event_id = ? AND tree_id = ?",
        vec![encode_uuid(event_id), encode_uuid(tree_id)],
      )
      .await
  }

  async fn delete_event_participants_for_individual(
    &self,
    tree_id: Uuid,
    individual_id: Uuid,
  ) -> Result<()> {
    self
      .delete_dependents(
        "DELETE FROM event_participants
         WHERE individual_id = ? AND tree_id = ?",
        vec![encode_uuid(individual_id), encode_uuid(tree_id)],
      )
      .await
  }

  // ── Event types ───────────────────────────────────────────────────────

  async fn add_event_type(
    &self,
    tree_id: Uuid,
    draft: LookupDraft,
  ) -> Result<EventType> {
    let raw = self
      .insert_lookup("event_types", "event_type_id", tree_id, draft)
      .await?;
    raw.into_event_type()
  }

  async fn get_event_type(
    &self,
    tree_id: Uuid,
    event_type_id: Uuid,
  ) -> Result<Option<EventType>> {
    let raw = self
      .get_lookup("event_types", "event_type_id", tree_id, event_type_id)
      .await?;
    raw.map(RawLookup::into_event_type).transpose()
  }

  async fn list_event_types(&self, tree_id: Uuid) -> Result<Vec<EventType>> {
    let raws = self
      .list_lookups("event_types", "event_type_id", tree_id)
      .await?;
    raws.into_iter().map(RawLookup::into_event_type).collect()
  }

  async fn update_event_type(
    &self,
    tree_id: Uuid,
    event_type_id: Uuid,
    draft: LookupDraft,
  ) -> Result<()> {
    self
      .update_lookup(
        "event_types",
        "event_type_id",
        EntityKind::EventType,
        tree_id,
        event_type_id,
        draft,
      )
      .await
  }

  async fn delete_event_type(
    &self,
    tree_id: Uuid,
    event_type_id: Uuid,
  ) -> Result<()> {
    self
      .delete_row(
        "event_types",
        "event_type_id",
        EntityKind::EventType,
        tree_id,
        event_type_id,
      )
      .await
  }

  // ── Event roles ───────────────────────────────────────────────────────

  async fn add_event_role(
    &self,
    tree_id: Uuid,
    draft: LookupDraft,
  ) -> Result<EventRole> {
    let raw = self
      .insert_lookup("event_roles", "event_role_id", tree_id, draft)
      .await?;
    raw.into_event_role()
  }

  async fn get_event_role(
    &self,
    tree_id: Uuid,
    event_role_id: Uuid,
  ) -> Result<Option<EventRole>> {
    let raw = self
      .get_lookup("event_roles", "event_role_id", tree_id, event_role_id)
      .await?;
    raw.map(RawLookup::into_event_role).transpose()
  }

  async fn list_event_roles(&self, tree_id: Uuid) -> Result<Vec<EventRole>> {
    let raws = self
      .list_lookups("event_roles", "event_role_id", tree_id)
      .await?;
    raws.into_iter().map(RawLookup::into_event_role).collect()
  }

  async fn update_event_role(
    &self,
    tree_id: Uuid,
    event_role_id: Uuid,
    draft: LookupDraft,
  ) -> Result<()> {
    self
      .update_lookup(
        "event_roles",
        "event_role_id",
        EntityKind::EventRole,
        tree_id,
        event_role_id,
        draft,
      )
      .await
  }

  async fn delete_event_role(
    &self,
    tree_id: Uuid,
    event_role_id: Uuid,
  ) -> Result<()> {
    self
      .delete_row(
        "event_roles",
        "event_role_id",
        EntityKind::EventRole,
        tree_id,
        event_role_id,
      )
      .await
  }

  // ── Places ────────────────────────────────────────────────────────────

  async fn add_place(&self, tree_id: Uuid, draft: PlaceDraft) -> Result<Place> {
    let place_id = Uuid::new_v4();
    let created_at = Utc::now();

    let id_str = encode_uuid(place_id);
    let tree_str = encode_uuid(tree_id);
    let at_str = encode_dt(created_at);
    let name = draft.name.clone();
    let type_str = draft.type_id.map(encode_uuid);
    let parent_str = draft.parent_id.map(encode_uuid);
    let latitude = draft.latitude;
    let longitude = draft.longitude;

    let gedcom_id = self
      .conn
      .call(move |conn| {
        let seq = next_gedcom_id(conn, "places", &tree_str)?;
        conn.execute(
          &format!(
            "INSERT INTO places ({PLACE_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ),
          rusqlite::params![
            id_str,
            tree_str,
            at_str,
            name,
            type_str,
            parent_str,
            latitude,
            longitude,
            seq
          ],
        )?;
        Ok(seq)
      })
      .await?;

    Ok(Place {
      place_id,
      tree_id,
      created_at,
      name: draft.name,
      type_id: draft.type_id,
      parent_id: draft.parent_id,
      latitude: draft.latitude,
      longitude: draft.longitude,
      gedcom_id,
    })
  }

  async fn get_place(
    &self,
    tree_id: Uuid,
    place_id: Uuid,
  ) -> Result<Option<Place>> {
    let id_str = encode_uuid(place_id);
    let tree_str = encode_uuid(tree_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PLACE_COLS} FROM places
                 WHERE place_id = ?1 AND tree_id = ?2"
              ),
              rusqlite::params![id_str, tree_str],
              place_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlace::into_place).transpose()
  }

  async fn list_places(
    &self,
    tree_id: Uuid,
    filter: PlaceFilter,
  ) -> Result<Vec<Place>> {
    if let Some(ids) = &filter.ids
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let tree_str = encode_uuid(tree_id);
    let id_strs = filter
      .ids
      .map(|ids| ids.into_iter().map(encode_uuid).collect::<Vec<_>>());
    let parent = filter.parent;

    let raws = self
      .conn
      .call(move |conn| {
        let mut sql =
          format!("SELECT {PLACE_COLS} FROM places WHERE tree_id = ?");
        let mut params = vec![tree_str];
        if let Some(ids) = id_strs {
          sql.push_str(&format!(
            " AND place_id IN ({})",
            placeholders(ids.len())
          ));
          params.extend(ids);
        }
        match parent {
          Some(ParentFilter::Root) => sql.push_str(" AND parent_id IS NULL"),
          Some(ParentFilter::Of(parent_id)) => {
            sql.push_str(" AND parent_id = ?");
            params.push(encode_uuid(parent_id));
          }
          None => {}
        }
        sql.push_str(" ORDER BY name ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), place_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlace::into_place).collect()
  }

  async fn update_place(
    &self,
    tree_id: Uuid,
    place_id: Uuid,
    draft: PlaceDraft,
  ) -> Result<()> {
    let id_str = encode_uuid(place_id);
    let tree_str = encode_uuid(tree_id);
    let type_str = draft.type_id.map(encode_uuid);
    let parent_str = draft.parent_id.map(encode_uuid);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE places
             SET name = ?1, type_id = ?2, parent_id = ?3,
                 latitude = ?4, longitude = ?5
           WHERE place_id = ?6 AND tree_id = ?7",
          rusqlite::params![
            draft.name,
            type_str,
            parent_str,
            draft.latitude,
            draft.longitude,
            id_str,
            tree_str
          ],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RowNotFound { kind: EntityKind::Place, id: place_id });
    }
    Ok(())
  }

  async fn delete_place(&self, tree_id: Uuid, place_id: Uuid) -> Result<()> {
    self
      .delete_row("places", "place_id", EntityKind::Place, tree_id, place_id)
      .await
  }

  // ── Place types ───────────────────────────────────────────────────────

  async fn add_place_type(
    &self,
    tree_id: Uuid,
    draft: LookupDraft,
  ) -> Result<PlaceType> {
    let raw = self
      .insert_lookup("place_types", "place_type_id", tree_id, draft)
      .await?;
    raw.into_place_type()
  }

  async fn get_place_type(
    &self,
    tree_id: Uuid,
    place_type_id: Uuid,
  ) -> Result<Option<PlaceType>> {
    let raw = self
      .get_lookup("place_types", "place_type_id", tree_id, place_type_id)
      .await?;
    raw.map(RawLookup::into_place_type).transpose()
  }

  async fn list_place_types(&self, tree_id: Uuid) -> Result<Vec<PlaceType>> {
    let raws = self
      .list_lookups("place_types", "place_type_id", tree_id)
      .await?;
    raws.into_iter().map(RawLookup::into_place_type).collect()
  }

  async fn update_place_type(
    &self,
    tree_id: Uuid,
    place_type_id: Uuid,
    draft: LookupDraft,
  ) -> Result<()> {
    self
      .update_lookup(
        "place_types",
        "place_type_id",
        EntityKind::PlaceType,
        tree_id,
        place_type_id,
        draft,
      )
      .await
  }

  async fn delete_place_type(
    &self,
    tree_id: Uuid,
    place_type_id: Uuid,
  ) -> Result<()> {
    self
      .delete_row(
        "place_types",
        "place_type_id",
        EntityKind::PlaceType,
        tree_id,
        place_type_id,
      )
      .await
  }
}
