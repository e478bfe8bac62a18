//! In-memory [`RecordStore`] and fixtures for unit tests.

use std::{
  collections::BTreeMap,
  convert::Infallible,
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::NaiveDate;

use crate::{
  owner::{NewOwner, Owner, OwnerId, OwnerQuery},
  store::RecordStore,
  subject::{NewSubject, Sex, Subject, SubjectId, SubjectQuery},
};

#[derive(Default)]
pub struct MemoryStore {
  subjects: Mutex<BTreeMap<SubjectId, Subject>>,
  owners:   Mutex<BTreeMap<OwnerId, Owner>>,
  /// When set, creates store nothing and report no id.
  lose_ids: AtomicBool,
  /// When set, subject reads yield to the scheduler first, so concurrent
  /// callers interleave.
  yielding: AtomicBool,
}

impl MemoryStore {
  pub fn with(subjects: impl IntoIterator<Item = Subject>) -> Self {
    let store = Self::default();
    store
      .subjects
      .lock()
      .unwrap()
      .extend(subjects.into_iter().map(|s| (s.id, s)));
    store
  }

  pub fn insert_owner(&self, owner: Owner) {
    self.owners.lock().unwrap().insert(owner.id, owner);
  }

  pub fn insert(&self, subject: Subject) {
    self.subjects.lock().unwrap().insert(subject.id, subject);
  }

  pub fn lose_new_ids(&self) { self.lose_ids.store(true, Ordering::SeqCst); }

  fn losing_ids(&self) -> bool { self.lose_ids.load(Ordering::SeqCst) }

  pub fn yield_on_reads(&self) { self.yielding.store(true, Ordering::SeqCst); }

  async fn maybe_yield(&self) {
    if self.yielding.load(Ordering::SeqCst) {
      tokio::task::yield_now().await;
    }
  }

  fn next_id(map: &BTreeMap<i64, impl Sized>) -> i64 {
    map.keys().next_back().map_or(1, |k| (*k).max(0) + 1)
  }
}

impl RecordStore for MemoryStore {
  type Error = Infallible;

  async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, Infallible> {
    self.maybe_yield().await;
    Ok(self.subjects.lock().unwrap().get(&id).cloned())
  }

  async fn children_of(&self, id: SubjectId) -> Result<Vec<Subject>, Infallible> {
    self.maybe_yield().await;
    Ok(
      self
        .subjects
        .lock()
        .unwrap()
        .values()
        .filter(|s| s.mother_id == Some(id) || s.father_id == Some(id))
        .cloned()
        .collect(),
    )
  }

  // Returns everything; the walker trims to the bound.
  async fn ancestors(
    &self,
    id: SubjectId,
    _max_generations: Option<u32>,
  ) -> Result<Vec<Subject>, Infallible> {
    let subjects = self.subjects.lock().unwrap();
    if !subjects.contains_key(&id) {
      return Ok(Vec::new());
    }
    Ok(subjects.values().cloned().collect())
  }

  async fn search_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>, Infallible> {
    let needle = query.name.as_deref().map(str::to_lowercase);
    Ok(
      self
        .subjects
        .lock()
        .unwrap()
        .values()
        .filter(|s| {
          needle
            .as_deref()
            .is_none_or(|n| s.name.to_lowercase().contains(n))
        })
        .filter(|s| query.sex.is_none_or(|sex| s.sex == sex))
        .take(query.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect(),
    )
  }

  async fn create_subject(&self, input: NewSubject) -> Result<Option<Subject>, Infallible> {
    if self.losing_ids() {
      return Ok(None);
    }
    let mut subjects = self.subjects.lock().unwrap();
    let subject = input.with_id(Self::next_id(&*subjects));
    subjects.insert(subject.id, subject.clone());
    Ok(Some(subject))
  }

  async fn update_subject(
    &self,
    id: SubjectId,
    input: NewSubject,
  ) -> Result<Option<Subject>, Infallible> {
    let mut subjects = self.subjects.lock().unwrap();
    let Some(slot) = subjects.get_mut(&id) else {
      return Ok(None);
    };
    *slot = input.with_id(id);
    Ok(Some(slot.clone()))
  }

  async fn delete_subject(&self, id: SubjectId) -> Result<Option<Subject>, Infallible> {
    let mut subjects = self.subjects.lock().unwrap();
    let deleted = subjects.remove(&id);
    for s in subjects.values_mut() {
      if s.mother_id == Some(id) {
        s.mother_id = None;
      }
      if s.father_id == Some(id) {
        s.father_id = None;
      }
    }
    Ok(deleted)
  }

  async fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>, Infallible> {
    Ok(self.owners.lock().unwrap().get(&id).cloned())
  }

  async fn owners_by_ids(&self, ids: &[OwnerId]) -> Result<Vec<Owner>, Infallible> {
    let owners = self.owners.lock().unwrap();
    Ok(ids.iter().filter_map(|id| owners.get(id).cloned()).collect())
  }

  async fn create_owner(&self, input: NewOwner) -> Result<Option<Owner>, Infallible> {
    if self.losing_ids() {
      return Ok(None);
    }
    let mut owners = self.owners.lock().unwrap();
    let owner = Owner {
      id:          Self::next_id(&*owners),
      first_name:  input.first_name,
      last_name:   input.last_name,
      description: input.description,
    };
    owners.insert(owner.id, owner.clone());
    Ok(Some(owner))
  }

  async fn search_owners(&self, query: &OwnerQuery) -> Result<Vec<Owner>, Infallible> {
    let needle = query.name.as_deref().unwrap_or_default().to_lowercase();
    Ok(
      self
        .owners
        .lock()
        .unwrap()
        .values()
        .filter(|o| o.full_name().to_lowercase().contains(&needle))
        .take(query.max_amount.unwrap_or(usize::MAX))
        .cloned()
        .collect(),
    )
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

pub fn subject(
  id: SubjectId,
  name: &str,
  sex: Sex,
  born: &str,
  mother_id: Option<SubjectId>,
  father_id: Option<SubjectId>,
) -> Subject {
  Subject {
    id,
    name: name.into(),
    description: None,
    date_of_birth: date(born),
    sex,
    owner_id: None,
    mother_id,
    father_id,
  }
}

/// The same genealogy the SQLite test data seeds.
///
/// ```text
/// Storm(-8) ── mother Daisy(-4) ── mother Wendy(-1)
///           │                  └── father Hugo(-2)
///           └─ father Comet(-7) ── mother Bella(-3) ── mother Ruby(-9) ── mother Misty(-11)
///                               │                  └── father Ajax(-10)
///                               └── father Hugo(-2)
/// Luna(-6)  ── mother Wendy(-1), father Rocky(-5)
/// ```
pub fn stud_book() -> Vec<Subject> {
  use Sex::{Female, Male};
  vec![
    subject(-1, "Wendy", Female, "2015-01-01", None, None),
    subject(-2, "Hugo", Male, "2012-05-05", None, None),
    subject(-3, "Bella", Female, "2016-03-10", Some(-9), Some(-10)),
    subject(-4, "Daisy", Female, "2019-01-01", Some(-1), Some(-2)),
    subject(-5, "Rocky", Male, "2010-07-07", None, None),
    subject(-6, "Luna", Female, "2018-04-04", Some(-1), Some(-5)),
    subject(-7, "Comet", Male, "2021-02-02", Some(-3), Some(-2)),
    subject(-8, "Storm", Male, "2022-06-06", Some(-4), Some(-7)),
    subject(-9, "Ruby", Female, "2008-01-01", Some(-11), None),
    subject(-10, "Ajax", Male, "2007-01-01", None, None),
    subject(-11, "Misty", Female, "2001-01-01", None, None),
  ]
}

/// A fixed "today" for validation tests.
pub fn today() -> NaiveDate { date("2024-06-01") }
