//! Relationship validator: field rules and parent-graph invariants.
//!
//! Every check runs and every failure is collected; a caller gets the full
//! list of [`Violation`]s at once. Lookups that find nothing (a missing
//! parent, owner, or the subject under update) are violations too. Only
//! store failures abort validation.
//!
//! Parent links require a strictly earlier birth date, which keeps the parent
//! graph acyclic without any explicit cycle detection.

use chrono::{Months, NaiveDate};
use strum::Display;
use thiserror::Error;

use crate::{
  Error, Result,
  owner::{OwnerDraft, OwnerId},
  store::RecordStore,
  subject::{Sex, Subject, SubjectDraft, SubjectId},
};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 4095;
/// Oldest admissible age, in years, implied by a date of birth.
pub const MAX_AGE_YEARS: u32 = 62;

// ─── Violations ──────────────────────────────────────────────────────────────

/// Which parent slot a rule is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Mother,
  Father,
}

impl Role {
  pub const BOTH: [Role; 2] = [Role::Mother, Role::Father];

  /// The sex a subject must have to fill this role.
  pub fn sex(self) -> Sex {
    match self {
      Self::Mother => Sex::Female,
      Self::Father => Sex::Male,
    }
  }

  /// The parent `subject` has in this role.
  pub fn of(self, subject: &Subject) -> Option<SubjectId> {
    match self {
      Self::Mother => subject.mother_id,
      Self::Father => subject.father_id,
    }
  }

  fn of_draft(self, draft: &SubjectDraft) -> Option<SubjectId> {
    match self {
      Self::Mother => draft.mother_id,
      Self::Father => draft.father_id,
    }
  }
}

/// A single broken rule. The `Display` form is the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
  #[error("{0} is required")]
  Missing(&'static str),

  #[error("{0} is given but blank")]
  Blank(&'static str),

  #[error("{field} too long: longer than {max} characters")]
  TooLong { field: &'static str, max: usize },

  #[error("{0} must start with a capital letter and contain only letters and hyphens")]
  Malformed(&'static str),

  #[error("date of birth {0} lies in the future")]
  BornInFuture(NaiveDate),

  #[error("date of birth {0} implies an age over {max} years", max = MAX_AGE_YEARS)]
  TooOld(NaiveDate),

  #[error("owner id must be positive, got {0}")]
  OwnerIdNotPositive(OwnerId),

  #[error("owner {0} not found")]
  OwnerNotFound(OwnerId),

  #[error("subject {0} does not exist")]
  SubjectMissing(SubjectId),

  #[error("a subject cannot be its own {0}")]
  OwnParent(Role),

  #[error("{0} {1} not found")]
  ParentNotFound(Role, SubjectId),

  #[error("{role} {id} must be {expected}")]
  ParentWrongSex {
    role:     Role,
    id:       SubjectId,
    expected: Sex,
  },

  #[error("{role} {id} (born {born}) must be born before {child_born}")]
  ParentNotOlder {
    role:       Role,
    id:         SubjectId,
    born:       NaiveDate,
    child_born: NaiveDate,
  },

  #[error("child {child_name} ({child_id}) lists this subject as its {role}, so sex must stay {expected}")]
  ChildRoleConflict {
    child_id:   SubjectId,
    child_name: String,
    role:       Role,
    expected:   Sex,
  },

  #[error("child {child_name} ({child_id}) was born {child_born}; date of birth must stay before that")]
  ChildBornEarlier {
    child_id:   SubjectId,
    child_name: String,
    child_born: NaiveDate,
  },

  #[error("max generations must not be negative, got {0}")]
  NegativeGenerations(i64),
}

// ─── Subject validation ──────────────────────────────────────────────────────

/// Validates subject writes against the store's current contents.
pub struct RelationshipValidator<'a, S> {
  store: &'a S,
  today: NaiveDate,
}

impl<'a, S: RecordStore> RelationshipValidator<'a, S> {
  /// `today` anchors the date-of-birth rules.
  pub fn new(store: &'a S, today: NaiveDate) -> Self { Self { store, today } }

  /// Check a subject that does not exist yet.
  pub async fn validate_for_create(&self, draft: &SubjectDraft) -> Result<Vec<Violation>> {
    tracing::trace!(?draft, "validate_for_create");
    let mut violations = Vec::new();

    check_fields(draft, self.today, &mut violations);
    self.check_owner(draft.owner_id, &mut violations).await?;
    for role in Role::BOTH {
      self.check_parent(role, draft, &mut violations).await?;
    }

    tracing::debug!(count = violations.len(), "create validated");
    Ok(violations)
  }

  /// Check a replacement of every field of subject `id`, including the
  /// effect on the children that already reference it.
  pub async fn validate_for_update(
    &self,
    id: SubjectId,
    draft: &SubjectDraft,
  ) -> Result<Vec<Violation>> {
    tracing::trace!(id, ?draft, "validate_for_update");
    let mut violations = Vec::new();

    check_fields(draft, self.today, &mut violations);
    self.check_owner(draft.owner_id, &mut violations).await?;
    for role in Role::BOTH {
      if role.of_draft(draft) == Some(id) {
        violations.push(Violation::OwnParent(role));
      } else {
        self.check_parent(role, draft, &mut violations).await?;
      }
    }

    match self.store.get_subject(id).await.map_err(Error::store)? {
      Some(current) => self.check_children(&current, draft, &mut violations).await?,
      None => violations.push(Violation::SubjectMissing(id)),
    }

    tracing::debug!(id, count = violations.len(), "update validated");
    Ok(violations)
  }

  async fn check_owner(&self, owner_id: Option<OwnerId>, out: &mut Vec<Violation>) -> Result<()> {
    let Some(owner_id) = owner_id else {
      return Ok(());
    };
    if owner_id <= 0 {
      out.push(Violation::OwnerIdNotPositive(owner_id));
    } else if self
      .store
      .get_owner(owner_id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      out.push(Violation::OwnerNotFound(owner_id));
    }
    Ok(())
  }

  async fn check_parent(
    &self,
    role: Role,
    draft: &SubjectDraft,
    out: &mut Vec<Violation>,
  ) -> Result<()> {
    let Some(parent_id) = role.of_draft(draft) else {
      return Ok(());
    };
    let Some(parent) = self
      .store
      .get_subject(parent_id)
      .await
      .map_err(Error::store)?
    else {
      out.push(Violation::ParentNotFound(role, parent_id));
      return Ok(());
    };

    if parent.sex != role.sex() {
      out.push(Violation::ParentWrongSex {
        role,
        id: parent_id,
        expected: role.sex(),
      });
    }
    if let Some(born) = draft.date_of_birth
      && parent.date_of_birth >= born
    {
      out.push(Violation::ParentNotOlder {
        role,
        id: parent_id,
        born: parent.date_of_birth,
        child_born: born,
      });
    }
    Ok(())
  }

  /// The cascading check: a parent's new sex and birth date must still suit
  /// every child that references it.
  async fn check_children(
    &self,
    current: &Subject,
    draft: &SubjectDraft,
    out: &mut Vec<Violation>,
  ) -> Result<()> {
    let new_sex = draft.sex.filter(|s| *s != current.sex);
    let new_birth = draft.date_of_birth.filter(|d| *d != current.date_of_birth);
    if new_sex.is_none() && new_birth.is_none() {
      return Ok(());
    }

    let children = self
      .store
      .children_of(current.id)
      .await
      .map_err(Error::store)?;
    tracing::trace!(id = current.id, children = children.len(), "cascading check");

    for child in children {
      if let Some(sex) = new_sex {
        for role in Role::BOTH {
          if role.of(&child) == Some(current.id) && sex != role.sex() {
            out.push(Violation::ChildRoleConflict {
              child_id: child.id,
              child_name: child.name.clone(),
              role,
              expected: role.sex(),
            });
          }
        }
      }
      if let Some(born) = new_birth
        && born >= child.date_of_birth
      {
        out.push(Violation::ChildBornEarlier {
          child_id:   child.id,
          child_name: child.name,
          child_born: child.date_of_birth,
        });
      }
    }
    Ok(())
  }
}

fn check_fields(draft: &SubjectDraft, today: NaiveDate, out: &mut Vec<Violation>) {
  check_name("name", draft.name.as_deref(), out);
  check_description(draft.description.as_deref(), true, out);

  match draft.date_of_birth {
    None => out.push(Violation::Missing("date of birth")),
    Some(born) => {
      if born > today {
        out.push(Violation::BornInFuture(born));
      }
      if let Some(earliest) = today.checked_sub_months(Months::new(12 * MAX_AGE_YEARS))
        && born < earliest
      {
        out.push(Violation::TooOld(born));
      }
    }
  }

  if draft.sex.is_none() {
    out.push(Violation::Missing("sex"));
  }
}

fn check_name(field: &'static str, value: Option<&str>, out: &mut Vec<Violation>) {
  let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
    out.push(Violation::Missing(field));
    return;
  };
  if value.chars().count() > MAX_NAME_LEN {
    out.push(Violation::TooLong { field, max: MAX_NAME_LEN });
  }
  let mut chars = value.chars();
  let well_formed = chars.next().is_some_and(|c| c.is_ascii_uppercase())
    && chars.all(|c| c.is_ascii_alphabetic() || c == '-');
  if !well_formed {
    out.push(Violation::Malformed(field));
  }
}

fn check_description(value: Option<&str>, reject_blank: bool, out: &mut Vec<Violation>) {
  let Some(value) = value else {
    return;
  };
  if reject_blank && value.trim().is_empty() {
    out.push(Violation::Blank("description"));
  }
  if value.chars().count() > MAX_DESCRIPTION_LEN {
    out.push(Violation::TooLong {
      field: "description",
      max:   MAX_DESCRIPTION_LEN,
    });
  }
}

// ─── Other inputs ────────────────────────────────────────────────────────────

/// Check the generation bound of a pedigree request.
pub fn validate_generations(max_generations: Option<i64>) -> Vec<Violation> {
  match max_generations {
    Some(n) if n < 0 => vec![Violation::NegativeGenerations(n)],
    _ => Vec::new(),
  }
}

/// Check an owner create payload.
pub fn validate_owner(draft: &OwnerDraft) -> Vec<Violation> {
  tracing::trace!(?draft, "validate_owner");
  let mut violations = Vec::new();
  check_name("first name", draft.first_name.as_deref(), &mut violations);
  check_name("last name", draft.last_name.as_deref(), &mut violations);
  check_description(draft.description.as_deref(), false, &mut violations);
  violations
}
