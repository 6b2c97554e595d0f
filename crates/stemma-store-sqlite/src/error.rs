//! Error type for `stemma-store-sqlite`.

use stemma_core::policy::EntityKind;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stemma_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A delete or update targeted a row that does not exist in this tree.
  /// Dependent-row deletes legitimately matching zero rows do not raise
  /// this; aggregate-row writes do.
  #[error("{kind} not found: {id}")]
  RowNotFound { kind: EntityKind, id: Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
