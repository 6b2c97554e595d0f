//! Pure display projections: primary-name resolution and GEDCOM ids.

use crate::{individual::Name, policy::EntityKind};

// ─── Display name ────────────────────────────────────────────────────────────

/// Which part of a resolved name to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePart {
  First,
  Last,
  #[default]
  Full,
  /// "Last, First" — for sorted tabular listings.
  FullInverted,
}

/// Resolve the display name from an individual's name set.
///
/// The name flagged primary wins; with no flagged name the first element is
/// used (callers that care about which row that is should have sorted by
/// `created_at` ascending — the stores do). Missing components render as
/// empty strings, never as a null placeholder. An empty set renders as "".
pub fn display_name(names: &[Name], part: NamePart) -> String {
  let Some(name) = names.iter().find(|n| n.is_primary).or_else(|| names.first())
  else {
    return String::new();
  };

  let first = name.first_name.as_deref().unwrap_or("");
  let last = name.last_name.as_deref().unwrap_or("");

  match part {
    NamePart::First => first.to_owned(),
    NamePart::Last => last.to_owned(),
    NamePart::Full => format!("{first} {last}").trim().to_owned(),
    NamePart::FullInverted => format!("{last}, {first}").trim().to_owned(),
  }
}

// ─── GEDCOM id ───────────────────────────────────────────────────────────────

/// Format a numeric sequence id as a legacy GEDCOM-style display id:
/// letter prefix, dash, number zero-padded to at least four digits. Wider
/// numbers are kept whole. A missing id formats as `0000`.
pub fn format_gedcom_id(kind: EntityKind, id: Option<i64>) -> String {
  format!("{}-{:04}", kind.gedcom_prefix(), id.unwrap_or(0))
}
