//! SQL schema for the Quorum SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS parties (
    party_id   TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    created_on TEXT NOT NULL,      -- ISO date; history floor for clients
    created_at TEXT NOT NULL,      -- RFC 3339 UTC
    weekdays   INTEGER NOT NULL    -- 7-bit mask, bit 0 = Monday
);

CREATE TABLE IF NOT EXISTS members (
    member_id    TEXT PRIMARY KEY,
    party_id     TEXT NOT NULL REFERENCES parties(party_id),
    name         TEXT NOT NULL,
    nickname     TEXT,
    user_id      TEXT,             -- linked account, if claimed
    profile_name TEXT,
    address      TEXT
);

-- Tri-state availability: a row is 'available' or 'unavailable'; unset is
-- the absence of a row. At most one row per (member, date).
CREATE TABLE IF NOT EXISTS availability (
    party_id   TEXT NOT NULL REFERENCES parties(party_id),
    member_id  TEXT NOT NULL REFERENCES members(member_id),
    date       TEXT NOT NULL,      -- ISO date
    state      TEXT NOT NULL,      -- 'available' | 'unavailable'
    updated_at TEXT NOT NULL,      -- RFC 3339 UTC; server-assigned
    PRIMARY KEY (member_id, date)
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id   TEXT PRIMARY KEY,
    party_id     TEXT NOT NULL REFERENCES parties(party_id),
    date         TEXT NOT NULL,    -- ISO date
    host_json    TEXT NOT NULL DEFAULT '{}',
    confirmed_by TEXT,
    confirmed_at TEXT NOT NULL,
    UNIQUE (party_id, date)
);

CREATE INDEX IF NOT EXISTS availability_party_date_idx
    ON availability(party_id, date);
CREATE INDEX IF NOT EXISTS members_party_idx  ON members(party_id);
CREATE INDEX IF NOT EXISTS sessions_party_idx ON sessions(party_id);

PRAGMA user_version = 1;
";
