//! Subject: an individual in the stud book, linked to at most one mother
//! and one father.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::owner::{Owner, OwnerId};

/// Store-assigned identifier of a subject. Test data uses negative ids.
pub type SubjectId = i64;

// ─── Sex ─────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
  Female,
  Male,
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// A persisted subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:            SubjectId,
  pub name:          String,
  pub description:   Option<String>,
  pub date_of_birth: NaiveDate,
  pub sex:           Sex,
  pub owner_id:      Option<OwnerId>,
  pub mother_id:     Option<SubjectId>,
  pub father_id:     Option<SubjectId>,
}

impl Subject {
  /// Iterate over the parent ids that are set, mother first.
  pub fn parent_ids(&self) -> impl Iterator<Item = SubjectId> + use<> {
    self.mother_id.into_iter().chain(self.father_id)
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// A create or update payload as received from a caller.
///
/// Required fields are optional here so that a missing value is reported as a
/// [`Violation`](crate::validate::Violation) instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectDraft {
  pub name:          Option<String>,
  pub description:   Option<String>,
  pub date_of_birth: Option<NaiveDate>,
  pub sex:           Option<Sex>,
  pub owner_id:      Option<OwnerId>,
  pub mother_id:     Option<SubjectId>,
  pub father_id:     Option<SubjectId>,
}

impl SubjectDraft {
  /// Convert into the shape the store writes. Returns `None` if a required
  /// field is missing, which validation rules out.
  pub fn into_new(self) -> Option<NewSubject> {
    Some(NewSubject {
      name:          self.name?,
      description:   self.description,
      date_of_birth: self.date_of_birth?,
      sex:           self.sex?,
      owner_id:      self.owner_id,
      mother_id:     self.mother_id,
      father_id:     self.father_id,
    })
  }
}

impl From<&Subject> for SubjectDraft {
  fn from(s: &Subject) -> Self {
    Self {
      name:          Some(s.name.clone()),
      description:   s.description.clone(),
      date_of_birth: Some(s.date_of_birth),
      sex:           Some(s.sex),
      owner_id:      s.owner_id,
      mother_id:     s.mother_id,
      father_id:     s.father_id,
    }
  }
}

/// Validated input to [`crate::store::RecordStore::create_subject`] and
/// [`crate::store::RecordStore::update_subject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
  pub name:          String,
  pub description:   Option<String>,
  pub date_of_birth: NaiveDate,
  pub sex:           Sex,
  pub owner_id:      Option<OwnerId>,
  pub mother_id:     Option<SubjectId>,
  pub father_id:     Option<SubjectId>,
}

impl NewSubject {
  pub fn with_id(self, id: SubjectId) -> Subject {
    Subject {
      id,
      name: self.name,
      description: self.description,
      date_of_birth: self.date_of_birth,
      sex: self.sex,
      owner_id: self.owner_id,
      mother_id: self.mother_id,
      father_id: self.father_id,
    }
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// The few fields of a parent shown alongside its child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSummary {
  pub id:            SubjectId,
  pub name:          String,
  pub date_of_birth: NaiveDate,
  pub sex:           Sex,
}

impl From<&Subject> for ParentSummary {
  fn from(s: &Subject) -> Self {
    Self {
      id:            s.id,
      name:          s.name.clone(),
      date_of_birth: s.date_of_birth,
      sex:           s.sex,
    }
  }
}

/// A subject with its owner resolved; returned by searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSummary {
  #[serde(flatten)]
  pub subject: Subject,
  pub owner:   Option<Owner>,
}

/// A subject with its owner and parents resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectDetail {
  #[serde(flatten)]
  pub subject: Subject,
  pub owner:   Option<Owner>,
  pub mother:  Option<ParentSummary>,
  pub father:  Option<ParentSummary>,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::RecordStore::search_subjects`]. Every
/// `None` field is left unfiltered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectQuery {
  /// Case-insensitive substring of the name.
  pub name:          Option<String>,
  /// Case-insensitive substring of the description.
  pub description:   Option<String>,
  pub date_of_birth: Option<NaiveDate>,
  pub sex:           Option<Sex>,
  /// Case-insensitive substring of the owner's "first last" name.
  pub owner_name:    Option<String>,
  pub limit:         Option<usize>,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use super::*;

  #[test]
  fn sex_wire_names() {
    assert_eq!(Sex::Female.as_ref(), "FEMALE");
    assert_eq!(Sex::from_str("MALE").unwrap(), Sex::Male);
    assert!(Sex::from_str("GELDING").is_err());
    assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"FEMALE\"");
  }

  #[test]
  fn draft_missing_required_field_does_not_convert() {
    let draft = SubjectDraft {
      name: Some("Wendy".into()),
      sex: Some(Sex::Female),
      ..Default::default()
    };
    assert!(draft.into_new().is_none());
  }
}
