//! Error types for `stemma-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown gender: {0:?}")]
  UnknownGender(String),

  #[error("unknown name kind: {0:?}")]
  UnknownNameKind(String),

  #[error("unknown family kind: {0:?}")]
  UnknownFamilyKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
