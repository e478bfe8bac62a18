//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 calendar dates (`YYYY-MM-DD`), which sort and
//! compare correctly as text. Sex is stored as `FEMALE` / `MALE`.

use std::str::FromStr as _;

use chrono::NaiveDate;
use stud_core::{
  owner::Owner,
  subject::{Sex, Subject},
};

use crate::{Error, Result};

/// Column list shared by every `SELECT` that feeds [`RawSubject::from_row`].
pub const SUBJECT_COLUMNS: &str =
  "s.id, s.name, s.description, s.date_of_birth, s.sex, s.owner_id, s.mother_id, s.father_id";

/// Column list shared by every `SELECT` that feeds [`RawOwner::from_row`].
pub const OWNER_COLUMNS: &str = "o.id, o.first_name, o.last_name, o.description";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

pub fn encode_sex(sex: Sex) -> &'static str {
  match sex {
    Sex::Female => "FEMALE",
    Sex::Male => "MALE",
  }
}

pub fn decode_sex(s: &str) -> Result<Sex> {
  Sex::from_str(s).map_err(|_| Error::Decode { column: "sex", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub id:            i64,
  pub name:          String,
  pub description:   Option<String>,
  pub date_of_birth: String,
  pub sex:           String,
  pub owner_id:      Option<i64>,
  pub mother_id:     Option<i64>,
  pub father_id:     Option<i64>,
}

impl RawSubject {
  /// Read a row selected with [`SUBJECT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      description:   row.get(2)?,
      date_of_birth: row.get(3)?,
      sex:           row.get(4)?,
      owner_id:      row.get(5)?,
      mother_id:     row.get(6)?,
      father_id:     row.get(7)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:            self.id,
      name:          self.name,
      description:   self.description,
      date_of_birth: decode_date(&self.date_of_birth)?,
      sex:           decode_sex(&self.sex)?,
      owner_id:      self.owner_id,
      mother_id:     self.mother_id,
      father_id:     self.father_id,
    })
  }
}

/// Raw values read directly from an `owners` row.
pub struct RawOwner {
  pub id:          i64,
  pub first_name:  String,
  pub last_name:   String,
  pub description: Option<String>,
}

impl RawOwner {
  /// Read a row selected with [`OWNER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      first_name:  row.get(1)?,
      last_name:   row.get(2)?,
      description: row.get(3)?,
    })
  }

  pub fn into_owner(self) -> Owner {
    Owner {
      id:          self.id,
      first_name:  self.first_name,
      last_name:   self.last_name,
      description: self.description,
    }
  }
}
