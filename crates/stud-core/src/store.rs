//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `stud-store-sqlite`).
//! The engine in this crate only reads through it and commits writes that
//! already passed validation; it never owns storage.

use std::future::Future;

use crate::{
  owner::{NewOwner, Owner, OwnerId, OwnerQuery},
  subject::{NewSubject, Subject, SubjectId, SubjectQuery},
};

/// Abstraction over a Stud record store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Retrieve a subject by id. Returns `None` if not found.
  fn get_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// All subjects whose mother or father is `id`. Empty if there are none.
  fn children_of(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// The subject `id` together with its ancestors up to `max_generations`
  /// parent edges away (`None` for the full ancestry).
  ///
  /// Implementations may return more subjects than requested but must not
  /// omit any within the bound. Returns an empty list if `id` does not exist.
  fn ancestors(
    &self,
    id: SubjectId,
    max_generations: Option<u32>,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Search subjects. An empty query returns every subject.
  fn search_subjects<'a>(
    &'a self,
    query: &'a SubjectQuery,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  /// Persist a new subject; the store assigns the id. Returns `None` if the
  /// insert reported success without yielding an id.
  fn create_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Overwrite every field of subject `id`. Returns `None` if it does not
  /// exist.
  fn update_subject(
    &self,
    id: SubjectId,
    input: NewSubject,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Delete subject `id` and clear every child's reference to it. Returns the
  /// deleted subject, or `None` if it did not exist.
  fn delete_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  // ── Owners ────────────────────────────────────────────────────────────

  fn get_owner(
    &self,
    id: OwnerId,
  ) -> impl Future<Output = Result<Option<Owner>, Self::Error>> + Send + '_;

  /// Fetch the owners with the given ids; unknown ids are skipped.
  fn owners_by_ids<'a>(
    &'a self,
    ids: &'a [OwnerId],
  ) -> impl Future<Output = Result<Vec<Owner>, Self::Error>> + Send + 'a;

  /// Persist a new owner. `None` has the same meaning as for
  /// [`RecordStore::create_subject`].
  fn create_owner(
    &self,
    input: NewOwner,
  ) -> impl Future<Output = Result<Option<Owner>, Self::Error>> + Send + '_;

  fn search_owners<'a>(
    &'a self,
    query: &'a OwnerQuery,
  ) -> impl Future<Output = Result<Vec<Owner>, Self::Error>> + Send + 'a;
}
