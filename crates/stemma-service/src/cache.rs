//! Cache-invalidation hints.
//!
//! The caller owns a request cache keyed per collection and per entity (the
//! usual query-client layout). The service holds no cache state of its own;
//! it only reports, after each successful write, which keys are now stale.

use serde::Serialize;
use uuid::Uuid;

/// A request-cache key made stale by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum Key {
  Trees,
  Tree(Uuid),
  Individuals,
  Individual(Uuid),
  Families,
  Family(Uuid),
  Events,
  Event(Uuid),
  Places,
  Place(Uuid),
  EventTypes,
  EventRoles,
  PlaceTypes,
}

/// The result of a write: the produced value plus the cache keys the write
/// invalidated.
#[derive(Debug, Clone)]
pub struct Written<T> {
  pub value: T,
  pub stale: Vec<Key>,
}

impl<T> Written<T> {
  pub fn new(value: T, stale: Vec<Key>) -> Self {
    Self { value, stale }
  }
}
