//! Error type for `stemma-service`.

use stemma_core::policy::EntityKind;
use thiserror::Error;
use uuid::Uuid;

/// An error surfaced to the caller of a use-case function.
///
/// Store errors are propagated unchanged — never swallowed, never retried.
/// Messages are human-readable so the UI layer can show them verbatim.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: Uuid },

  /// A lookup expected to be unique returned more than one row. Defensive
  /// check against data corruption; the first row is never silently taken.
  #[error("multiple {kind} rows found for id {id}")]
  MultipleFound { kind: EntityKind, id: Uuid },

  /// The place hierarchy contains a cycle. Unreachable under the schema's
  /// constraints, checked anyway so recursion can never loop.
  #[error("place hierarchy cycle detected at {0}")]
  PlaceCycle(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
    Self::NotFound { kind, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
