//! Error types for `stud-core`.

use thiserror::Error;

use crate::{owner::OwnerId, subject::SubjectId, validate::Violation};

#[derive(Debug, Error)]
pub enum Error {
  /// One or more business-rule violations; the caller can fix its input.
  #[error("{context}: {count} violation(s)", count = .violations.len())]
  Validation {
    context:    &'static str,
    violations: Vec<Violation>,
  },

  #[error("subject not found: {0}")]
  SubjectNotFound(SubjectId),

  #[error("owner not found: {0}")]
  OwnerNotFound(OwnerId),

  /// An assumption about the store's data or the engine's own contracts
  /// broke. Never retried.
  #[error("internal error: {0}")]
  Fatal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// The violations carried by a validation failure, empty otherwise.
  pub fn violations(&self) -> &[Violation] {
    match self {
      Self::Validation { violations, .. } => violations,
      _ => &[],
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
