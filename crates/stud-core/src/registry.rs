//! [`Registry`]: the application service in front of a [`RecordStore`].
//!
//! Every write passes the [`RelationshipValidator`] before it reaches the
//! store, and every pedigree read composes [`walk_ancestors`] with
//! [`assemble`].

use std::{collections::BTreeSet, sync::Arc};

use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  ancestry::walk_ancestors,
  owner::{Owner, OwnerDraft, OwnerId, OwnerQuery},
  pedigree::{PedigreeNode, assemble},
  store::RecordStore,
  subject::{
    ParentSummary, Subject, SubjectDetail, SubjectDraft, SubjectId, SubjectQuery,
    SubjectSummary,
  },
  validate::{RelationshipValidator, Violation, validate_generations, validate_owner},
};

/// Application service over a record store.
///
/// Mutations are serialised through a write gate, so the validation a write
/// passed still holds when the write commits, as long as every writer goes
/// through the same `Registry`.
pub struct Registry<S> {
  store:      Arc<S>,
  write_gate: Mutex<()>,
  today:      Option<NaiveDate>,
}

impl<S: RecordStore> Registry<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      write_gate: Mutex::new(()),
      today: None,
    }
  }

  /// Pin the date the date-of-birth rules are checked against. Defaults to
  /// the current UTC date.
  pub fn with_today(mut self, today: NaiveDate) -> Self {
    self.today = Some(today);
    self
  }

  pub fn store(&self) -> &S { &self.store }

  fn validator(&self) -> RelationshipValidator<'_, S> {
    let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
    RelationshipValidator::new(&self.store, today)
  }

  // ── Engine surface ────────────────────────────────────────────────────────

  /// The pedigree of `root`, `max_generations` parent edges deep (`None` for
  /// the full ancestry).
  pub async fn compute_pedigree(
    &self,
    root: SubjectId,
    max_generations: Option<i64>,
  ) -> Result<PedigreeNode> {
    tracing::trace!(root, ?max_generations, "compute_pedigree");
    reject("invalid pedigree request", validate_generations(max_generations))?;

    let bound = max_generations.map(|n| u32::try_from(n).unwrap_or(u32::MAX));
    let ancestry = walk_ancestors(self.store.as_ref(), root, bound).await?;
    assemble(root, &ancestry)
  }

  pub async fn validate_for_create(&self, draft: &SubjectDraft) -> Result<Vec<Violation>> {
    self.validator().validate_for_create(draft).await
  }

  pub async fn validate_for_update(
    &self,
    id: SubjectId,
    draft: &SubjectDraft,
  ) -> Result<Vec<Violation>> {
    self.validator().validate_for_update(id, draft).await
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  pub async fn get(&self, id: SubjectId) -> Result<SubjectDetail> {
    tracing::trace!(id, "get");
    let subject = self.fetch(id).await?;
    self.detail(subject).await
  }

  pub async fn search(&self, query: &SubjectQuery) -> Result<Vec<SubjectSummary>> {
    tracing::trace!(?query, "search");
    let subjects = self
      .store
      .search_subjects(query)
      .await
      .map_err(Error::store)?;

    let owner_ids: Vec<OwnerId> = subjects
      .iter()
      .filter_map(|s| s.owner_id)
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect();
    let owners = self
      .store
      .owners_by_ids(&owner_ids)
      .await
      .map_err(Error::store)?;

    subjects
      .into_iter()
      .map(|subject| {
        let owner = match subject.owner_id {
          None => None,
          Some(id) => Some(
            owners
              .iter()
              .find(|o| o.id == id)
              .cloned()
              .ok_or_else(|| dangling_owner(&subject, id))?,
          ),
        };
        Ok(SubjectSummary { subject, owner })
      })
      .collect()
  }

  pub async fn create(&self, draft: SubjectDraft) -> Result<SubjectDetail> {
    tracing::trace!(?draft, "create");
    let _gate = self.write_gate.lock().await;

    let violations = self.validator().validate_for_create(&draft).await?;
    reject("validation of subject for create failed", violations)?;

    let input = draft
      .into_new()
      .ok_or_else(|| Error::Fatal("validated subject is missing a required field".into()))?;
    let created = self
      .store
      .create_subject(input)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| missing_id("subject"))?;
    tracing::debug!(id = created.id, "subject created");

    self.detail(created).await
  }

  pub async fn update(&self, id: SubjectId, draft: SubjectDraft) -> Result<SubjectDetail> {
    tracing::trace!(id, ?draft, "update");
    let _gate = self.write_gate.lock().await;

    let violations = self.validator().validate_for_update(id, &draft).await?;
    reject("validation of subject for update failed", violations)?;

    let input = draft
      .into_new()
      .ok_or_else(|| Error::Fatal("validated subject is missing a required field".into()))?;
    let updated = self
      .store
      .update_subject(id, input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound(id))?;
    tracing::debug!(id, "subject updated");

    self.detail(updated).await
  }

  /// Delete a subject. Its children lose their reference to it.
  pub async fn delete(&self, id: SubjectId) -> Result<SubjectDetail> {
    tracing::trace!(id, "delete");
    let _gate = self.write_gate.lock().await;

    let detail = self.get(id).await?;
    self
      .store
      .delete_subject(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound(id))?;
    tracing::debug!(id, "subject deleted");

    Ok(detail)
  }

  // ── Owners ────────────────────────────────────────────────────────────────

  pub async fn get_owner(&self, id: OwnerId) -> Result<Owner> {
    self
      .store
      .get_owner(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::OwnerNotFound(id))
  }

  pub async fn search_owners(&self, query: &OwnerQuery) -> Result<Vec<Owner>> {
    tracing::trace!(?query, "search_owners");
    self.store.search_owners(query).await.map_err(Error::store)
  }

  pub async fn create_owner(&self, draft: OwnerDraft) -> Result<Owner> {
    tracing::trace!(?draft, "create_owner");
    reject("validation of owner for create failed", validate_owner(&draft))?;

    let input = draft
      .into_new()
      .ok_or_else(|| Error::Fatal("validated owner is missing a required field".into()))?;
    let owner = self
      .store
      .create_owner(input)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| missing_id("owner"))?;
    tracing::debug!(id = owner.id, "owner created");
    Ok(owner)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn fetch(&self, id: SubjectId) -> Result<Subject> {
    self
      .store
      .get_subject(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound(id))
  }

  /// Resolve owner and parents. A persisted subject pointing at records that
  /// do not exist means the store broke an invariant.
  async fn detail(&self, subject: Subject) -> Result<SubjectDetail> {
    let owner = match subject.owner_id {
      None => None,
      Some(id) => Some(
        self
          .store
          .get_owner(id)
          .await
          .map_err(Error::store)?
          .ok_or_else(|| dangling_owner(&subject, id))?,
      ),
    };
    let mother = self.parent(&subject, subject.mother_id).await?;
    let father = self.parent(&subject, subject.father_id).await?;

    Ok(SubjectDetail { subject, owner, mother, father })
  }

  async fn parent(
    &self,
    child: &Subject,
    parent_id: Option<SubjectId>,
  ) -> Result<Option<ParentSummary>> {
    let Some(parent_id) = parent_id else {
      return Ok(None);
    };
    match self.store.get_subject(parent_id).await.map_err(Error::store)? {
      Some(parent) => Ok(Some(ParentSummary::from(&parent))),
      None => {
        tracing::warn!(child = child.id, parent_id, "dangling parent reference");
        Err(Error::Fatal(format!(
          "parent {parent_id} referenced by subject {} not found",
          child.id
        )))
      }
    }
  }
}

fn reject(context: &'static str, violations: Vec<Violation>) -> Result<()> {
  if violations.is_empty() {
    return Ok(());
  }
  tracing::debug!(context, count = violations.len(), "rejected");
  Err(Error::Validation { context, violations })
}

fn missing_id(kind: &str) -> Error {
  tracing::warn!(kind, "store reported a write without an id");
  Error::Fatal(format!("store created a {kind} but returned no id"))
}

fn dangling_owner(subject: &Subject, owner_id: OwnerId) -> Error {
  tracing::warn!(subject = subject.id, owner_id, "dangling owner reference");
  Error::Fatal(format!(
    "owner {owner_id} referenced by subject {} not found",
    subject.id
  ))
}
