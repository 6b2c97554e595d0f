//! Use-case layer for Stemma.
//!
//! Async functions per use case, generic over any [`stemma_core::store::TreeStore`]
//! backend: multi-step consistency sequences for writes, fan-out reads joined
//! in memory for view models, and table-query normalisation.
//!
//! # Consistency
//!
//! Write sequences here span several store calls and are **not atomic** — a
//! failure partway through aborts the remaining steps and surfaces the error,
//! leaving visible partial state. The [`audit`] module is the compensating
//! check: it detects the states a torn write can leave behind and can repair
//! most of them.
//!
//! # Caching
//!
//! The service holds no cache state. Every mutation returns a
//! [`cache::Written`] naming the cache keys it made stale, so the caller can
//! invalidate its own request cache.

pub mod audit;
pub mod cache;
pub mod error;
pub mod events;
pub mod families;
pub mod individuals;
pub mod lookups;
pub mod places;
pub mod trees;

pub use cache::{Key, Written};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
