//! Owner: the external party a subject may belong to.

use serde::{Deserialize, Serialize};

pub type OwnerId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub id:          OwnerId,
  pub first_name:  String,
  pub last_name:   String,
  pub description: Option<String>,
}

impl Owner {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// An owner create payload as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerDraft {
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub description: Option<String>,
}

impl OwnerDraft {
  pub fn into_new(self) -> Option<NewOwner> {
    Some(NewOwner {
      first_name:  self.first_name?,
      last_name:   self.last_name?,
      description: self.description,
    })
  }
}

/// Validated input to [`crate::store::RecordStore::create_owner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
  pub first_name:  String,
  pub last_name:   String,
  pub description: Option<String>,
}

/// Parameters for [`crate::store::RecordStore::search_owners`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerQuery {
  /// Case-insensitive substring of "first last".
  pub name:       Option<String>,
  pub max_amount: Option<usize>,
}
