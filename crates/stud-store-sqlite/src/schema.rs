//! SQL schema for the Stud SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS owners (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    description TEXT
);

-- Parent references are cleared, not cascaded, when a parent is deleted.
CREATE TABLE IF NOT EXISTS subjects (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    description   TEXT,
    date_of_birth TEXT NOT NULL,   -- ISO 8601 calendar date
    sex           TEXT NOT NULL CHECK (sex IN ('FEMALE', 'MALE')),
    owner_id      INTEGER REFERENCES owners(id) ON DELETE SET NULL,
    mother_id     INTEGER REFERENCES subjects(id) ON DELETE SET NULL,
    father_id     INTEGER REFERENCES subjects(id) ON DELETE SET NULL,
    CHECK (mother_id IS NULL OR mother_id != id),
    CHECK (father_id IS NULL OR father_id != id)
);

CREATE INDEX IF NOT EXISTS subjects_mother_idx ON subjects(mother_id);
CREATE INDEX IF NOT EXISTS subjects_father_idx ON subjects(father_id);
CREATE INDEX IF NOT EXISTS subjects_owner_idx  ON subjects(owner_id);

PRAGMA user_version = 1;
";

/// Generation-bounded ancestry of `?1`. `?2` is the bound, `NULL` for none;
/// `?3` caps the recursion so corrupted (cyclic) data still terminates.
pub const ANCESTORS_SQL: &str = "
WITH RECURSIVE lineage(id, generation) AS (
    SELECT id, 0 FROM subjects WHERE id = ?1

    UNION

    SELECT p.id, l.generation + 1
    FROM lineage l
    JOIN subjects c ON c.id = l.id
    JOIN subjects p ON p.id IN (c.mother_id, c.father_id)
    WHERE (?2 IS NULL OR l.generation < ?2)
      AND l.generation < ?3
)
SELECT s.id, s.name, s.description, s.date_of_birth, s.sex,
       s.owner_id, s.mother_id, s.father_id
FROM subjects s
WHERE s.id IN (SELECT id FROM lineage)
";
