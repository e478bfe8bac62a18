//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use stud_core::{
  owner::{NewOwner, Owner, OwnerId, OwnerQuery},
  pedigree::MAX_PEDIGREE_DEPTH,
  store::RecordStore,
  subject::{NewSubject, Subject, SubjectId, SubjectQuery},
};

use crate::{
  Error, Result,
  encode::{OWNER_COLUMNS, RawOwner, RawSubject, SUBJECT_COLUMNS, encode_date, encode_sex},
  schema::{ANCESTORS_SQL, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stud record store backed by a single SQLite file.
///
/// Cloning shares the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
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

  /// Run a subject `SELECT` whose only parameter is an id.
  async fn subjects_where(&self, sql: String, id: i64) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }
}

/// Bind values for the seven writable subject columns, in schema order.
struct SubjectParams {
  name:          String,
  description:   Option<String>,
  date_of_birth: String,
  sex:           &'static str,
  owner_id:      Option<i64>,
  mother_id:     Option<i64>,
  father_id:     Option<i64>,
}

impl From<NewSubject> for SubjectParams {
  fn from(input: NewSubject) -> Self {
    Self {
      name:          input.name,
      description:   input.description,
      date_of_birth: encode_date(input.date_of_birth),
      sex:           encode_sex(input.sex),
      owner_id:      input.owner_id,
      mother_id:     input.mother_id,
      father_id:     input.father_id,
    }
  }
}

/// Treat an empty filter string as no filter.
fn filter_text(s: &Option<String>) -> Option<String> {
  s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

/// `LIMIT` operand: negative means unlimited, oversized limits saturate.
pub(crate) fn sql_limit(limit: Option<usize>) -> i64 {
  limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX))
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>> {
    tracing::trace!(id, "get_subject");
    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.id = ?1"),
              rusqlite::params![id],
              RawSubject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn children_of(&self, id: SubjectId) -> Result<Vec<Subject>> {
    tracing::trace!(id, "children_of");
    self
      .subjects_where(
        format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects s
           WHERE s.mother_id = ?1 OR s.father_id = ?1
           ORDER BY s.id"
        ),
        id,
      )
      .await
  }

  async fn ancestors(
    &self,
    id: SubjectId,
    max_generations: Option<u32>,
  ) -> Result<Vec<Subject>> {
    tracing::trace!(id, ?max_generations, "ancestors");
    let bound = max_generations.map(i64::from);
    let cap = MAX_PEDIGREE_DEPTH as i64;

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(ANCESTORS_SQL)?;
        let rows = stmt
          .query_map(rusqlite::params![id, bound, cap], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn search_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
    tracing::trace!(?query, "search_subjects");
    let name          = filter_text(&query.name);
    let description   = filter_text(&query.description);
    let date_of_birth = query.date_of_birth.map(encode_date);
    let sex           = query.sex.map(encode_sex);
    let owner_name    = filter_text(&query.owner_name);
    // SQLite treats a negative LIMIT as "no limit".
    let limit         = sql_limit(query.limit);

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS}
           FROM subjects s
           LEFT JOIN owners o ON o.id = s.owner_id
           WHERE (?1 IS NULL OR UPPER(s.name) LIKE '%' || UPPER(?1) || '%')
             AND (?2 IS NULL OR UPPER(s.description) LIKE '%' || UPPER(?2) || '%')
             AND (?3 IS NULL OR s.date_of_birth = ?3)
             AND (?4 IS NULL OR s.sex = ?4)
             AND (?5 IS NULL OR UPPER(o.first_name || ' ' || o.last_name) LIKE '%' || UPPER(?5) || '%')
           ORDER BY s.id
           LIMIT ?6"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![name, description, date_of_birth, sex, owner_name, limit],
            RawSubject::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn create_subject(&self, input: NewSubject) -> Result<Option<Subject>> {
    tracing::trace!(?input, "create_subject");
    let p = SubjectParams::from(input.clone());

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO subjects (
             name, description, date_of_birth, sex, owner_id, mother_id, father_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            p.name,
            p.description,
            p.date_of_birth,
            p.sex,
            p.owner_id,
            p.mother_id,
            p.father_id,
          ],
        )?;
        Ok((inserted > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(id.map(|id| input.with_id(id)))
  }

  async fn update_subject(
    &self,
    id: SubjectId,
    input: NewSubject,
  ) -> Result<Option<Subject>> {
    tracing::trace!(id, ?input, "update_subject");
    let p = SubjectParams::from(input.clone());

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects
           SET name = ?1, description = ?2, date_of_birth = ?3, sex = ?4,
               owner_id = ?5, mother_id = ?6, father_id = ?7
           WHERE id = ?8",
          rusqlite::params![
            p.name,
            p.description,
            p.date_of_birth,
            p.sex,
            p.owner_id,
            p.mother_id,
            p.father_id,
            id,
          ],
        )?)
      })
      .await?;

    Ok((updated > 0).then(|| input.with_id(id)))
  }

  async fn delete_subject(&self, id: SubjectId) -> Result<Option<Subject>> {
    tracing::trace!(id, "delete_subject");
    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.id = ?1"),
            rusqlite::params![id],
            RawSubject::from_row,
          )
          .optional()?;
        if raw.is_some() {
          // `ON DELETE SET NULL` clears the children's references.
          tx.execute("DELETE FROM subjects WHERE id = ?1", rusqlite::params![id])?;
        }
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  // ── Owners ────────────────────────────────────────────────────────────────

  async fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>> {
    tracing::trace!(id, "get_owner");
    let raw: Option<RawOwner> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {OWNER_COLUMNS} FROM owners o WHERE o.id = ?1"),
              rusqlite::params![id],
              RawOwner::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawOwner::into_owner))
  }

  async fn owners_by_ids(&self, ids: &[OwnerId]) -> Result<Vec<Owner>> {
    tracing::trace!(?ids, "owners_by_ids");
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids = ids.to_vec();

    let raws: Vec<RawOwner> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
          "SELECT {OWNER_COLUMNS} FROM owners o WHERE o.id IN ({placeholders}) ORDER BY o.id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids), RawOwner::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawOwner::into_owner).collect())
  }

  async fn create_owner(&self, input: NewOwner) -> Result<Option<Owner>> {
    tracing::trace!(?input, "create_owner");
    let NewOwner { first_name, last_name, description } = input;
    let (f, l, d) = (first_name.clone(), last_name.clone(), description.clone());

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO owners (first_name, last_name, description) VALUES (?1, ?2, ?3)",
          rusqlite::params![f, l, d],
        )?;
        Ok((inserted > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(id.map(|id| Owner { id, first_name, last_name, description }))
  }

  async fn search_owners(&self, query: &OwnerQuery) -> Result<Vec<Owner>> {
    tracing::trace!(?query, "search_owners");
    let name  = filter_text(&query.name);
    let limit = sql_limit(query.max_amount);

    let raws: Vec<RawOwner> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {OWNER_COLUMNS}
           FROM owners o
           WHERE (?1 IS NULL OR UPPER(o.first_name || ' ' || o.last_name) LIKE '%' || UPPER(?1) || '%')
           ORDER BY o.id
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![name, limit], RawOwner::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawOwner::into_owner).collect())
  }
}
