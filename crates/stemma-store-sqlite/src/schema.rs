//! SQL schema for the Stemma SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.
//!
//! The foreign-key clauses here are load-bearing: the application code
//! relies on CASCADE for owned dependents (names, family children, event
//! subjects/participants), SET NULL for weak references (spouse links,
//! place parents, event places), and RESTRICT to keep lookup tables
//! authoritative. The declared-policy table in `stemma_core::policy`
//! mirrors exactly these clauses.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS trees (
    tree_id     TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,
    name        TEXT NOT NULL,
    is_default  INTEGER NOT NULL DEFAULT 0 CHECK (is_default IN (0, 1))
);

-- Lookup tables. Never cascaded into; referencing rows restrict deletion.
CREATE TABLE IF NOT EXISTS place_types (
    place_type_id TEXT PRIMARY KEY,
    tree_id       TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL,
    key           TEXT
);

CREATE TABLE IF NOT EXISTS event_types (
    event_type_id TEXT PRIMARY KEY,
    tree_id       TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL,
    key           TEXT
);

CREATE TABLE IF NOT EXISTS event_roles (
    event_role_id TEXT PRIMARY KEY,
    tree_id       TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL,
    key           TEXT
);

CREATE TABLE IF NOT EXISTS individuals (
    individual_id TEXT PRIMARY KEY,
    tree_id       TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    gender        TEXT NOT NULL,   -- 'male' | 'female' | 'unknown'
    gedcom_id     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS names (
    name_id       TEXT PRIMARY KEY,
    tree_id       TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    individual_id TEXT NOT NULL REFERENCES individuals(individual_id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    kind          TEXT NOT NULL,   -- 'birth' | 'marriage' | 'nickname' | 'unknown'
    first_name    TEXT,
    last_name     TEXT,
    surname       TEXT,
    is_primary    INTEGER NOT NULL DEFAULT 0 CHECK (is_primary IN (0, 1))
);

-- Spouse links are weak: an individual's deletion nulls them out.
CREATE TABLE IF NOT EXISTS families (
    family_id  TEXT PRIMARY KEY,
    tree_id    TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    husband_id TEXT REFERENCES individuals(individual_id) ON DELETE SET NULL,
    wife_id    TEXT REFERENCES individuals(individual_id) ON DELETE SET NULL,
    kind       TEXT NOT NULL,      -- 'married' | 'civil union' | 'unmarried' | 'unknown'
    gedcom_id  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS family_children (
    family_child_id TEXT PRIMARY KEY,
    tree_id         TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    family_id       TEXT NOT NULL REFERENCES families(family_id) ON DELETE CASCADE,
    individual_id   TEXT NOT NULL REFERENCES individuals(individual_id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS places (
    place_id   TEXT PRIMARY KEY,
    tree_id    TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    name       TEXT NOT NULL,
    type_id    TEXT REFERENCES place_types(place_type_id) ON DELETE RESTRICT,
    parent_id  TEXT REFERENCES places(place_id) ON DELETE SET NULL,
    latitude   REAL,
    longitude  REAL,
    gedcom_id  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    tree_id     TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    type_id     TEXT NOT NULL REFERENCES event_types(event_type_id) ON DELETE RESTRICT,
    date        TEXT,              -- free text; genealogy dates are fuzzy
    description TEXT,
    place_id    TEXT REFERENCES places(place_id) ON DELETE SET NULL,
    gedcom_id   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS event_subjects (
    event_subject_id TEXT PRIMARY KEY,
    tree_id          TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    event_id         TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    individual_id    TEXT NOT NULL REFERENCES individuals(individual_id) ON DELETE CASCADE,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS event_participants (
    event_participant_id TEXT PRIMARY KEY,
    tree_id              TEXT NOT NULL REFERENCES trees(tree_id) ON DELETE CASCADE,
    event_id             TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    individual_id        TEXT NOT NULL REFERENCES individuals(individual_id) ON DELETE CASCADE,
    role_id              TEXT NOT NULL REFERENCES event_roles(event_role_id) ON DELETE RESTRICT,
    created_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS names_individual_idx        ON names(individual_id);
CREATE INDEX IF NOT EXISTS names_primary_idx           ON names(is_primary);
CREATE INDEX IF NOT EXISTS family_children_family_idx  ON family_children(family_id);
CREATE INDEX IF NOT EXISTS family_children_child_idx   ON family_children(individual_id);
CREATE INDEX IF NOT EXISTS places_parent_idx           ON places(parent_id);
CREATE INDEX IF NOT EXISTS places_type_idx             ON places(type_id);
CREATE INDEX IF NOT EXISTS events_type_idx             ON events(type_id);
CREATE INDEX IF NOT EXISTS events_place_idx            ON events(place_id);
CREATE INDEX IF NOT EXISTS event_subjects_event_idx    ON event_subjects(event_id);
CREATE INDEX IF NOT EXISTS event_subjects_indiv_idx    ON event_subjects(individual_id);
CREATE INDEX IF NOT EXISTS event_participants_event_idx ON event_participants(event_id);
CREATE INDEX IF NOT EXISTS event_participants_indiv_idx ON event_participants(individual_id);

PRAGMA user_version = 1;
";
