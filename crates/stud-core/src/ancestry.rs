//! Ancestry walker: collects the bounded, deduplicated ancestry of a subject.
//!
//! The walk runs in two steps: the store's bulk [`RecordStore::ancestors`]
//! fetch fills an in-memory arena, then a breadth-first expansion over that
//! arena decides which subjects belong to the ancestry. The expansion alone
//! enforces the generation bound, so a store is free to over-fetch.

use std::collections::{HashMap, VecDeque};

use crate::{
  Error, Result,
  store::RecordStore,
  subject::{Subject, SubjectId},
};

/// A subject reached during a walk, with the number of parent edges between it
/// and the root along the shortest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
  pub subject:    Subject,
  pub generation: u32,
}

/// The set of subjects reachable from a root by following parent edges,
/// keyed by subject id. The root itself is always a member at generation 0.
#[derive(Debug, Clone)]
pub struct Ancestry {
  root:    SubjectId,
  members: HashMap<SubjectId, Ancestor>,
}

impl Ancestry {
  /// Breadth-first expansion from `root` over `arena`.
  ///
  /// A subject at generation `g` contributes its parents at `g + 1` only while
  /// `g < max_generations`. Each subject is kept once, at the generation it was
  /// first reached. Parents missing from `arena` are skipped. Returns `None` if
  /// `root` itself is not in `arena`.
  pub fn collect(
    root: SubjectId,
    max_generations: Option<u32>,
    arena: &HashMap<SubjectId, Subject>,
  ) -> Option<Self> {
    if !arena.contains_key(&root) {
      return None;
    }

    let mut members: HashMap<SubjectId, Ancestor> = HashMap::new();
    let mut queue = VecDeque::from([(root, 0u32)]);

    while let Some((id, generation)) = queue.pop_front() {
      if members.contains_key(&id) {
        continue;
      }
      let Some(subject) = arena.get(&id) else {
        continue;
      };

      if max_generations.is_none_or(|max| generation < max) {
        for parent in subject.parent_ids() {
          if !members.contains_key(&parent) {
            queue.push_back((parent, generation + 1));
          }
        }
      }

      members.insert(id, Ancestor { subject: subject.clone(), generation });
    }

    Some(Self { root, members })
  }

  /// Build an unbounded ancestry from an explicit list of subjects. Subjects
  /// not reachable from `root` are dropped.
  pub fn from_subjects(
    root: SubjectId,
    subjects: impl IntoIterator<Item = Subject>,
  ) -> Option<Self> {
    let arena = subjects.into_iter().map(|s| (s.id, s)).collect();
    Self::collect(root, None, &arena)
  }

  pub fn root(&self) -> SubjectId { self.root }

  pub fn get(&self, id: SubjectId) -> Option<&Ancestor> { self.members.get(&id) }

  pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
    self.members.get(&id).map(|a| &a.subject)
  }

  pub fn contains(&self, id: SubjectId) -> bool { self.members.contains_key(&id) }

  pub fn len(&self) -> usize { self.members.len() }

  pub fn is_empty(&self) -> bool { self.members.is_empty() }

  /// Members in no particular order.
  pub fn iter(&self) -> impl Iterator<Item = &Ancestor> { self.members.values() }

  /// Member ids, sorted.
  pub fn ids(&self) -> Vec<SubjectId> {
    let mut ids: Vec<_> = self.members.keys().copied().collect();
    ids.sort_unstable();
    ids
  }
}

/// Walk the ancestry of `root` up to `max_generations` parent edges.
///
/// Fails with [`Error::SubjectNotFound`] if `root` does not exist.
pub async fn walk_ancestors<S: RecordStore>(
  store: &S,
  root: SubjectId,
  max_generations: Option<u32>,
) -> Result<Ancestry> {
  tracing::trace!(root, ?max_generations, "walk_ancestors");

  let fetched = store
    .ancestors(root, max_generations)
    .await
    .map_err(Error::store)?;
  let arena: HashMap<SubjectId, Subject> =
    fetched.into_iter().map(|s| (s.id, s)).collect();

  let ancestry = Ancestry::collect(root, max_generations, &arena)
    .ok_or(Error::SubjectNotFound(root))?;

  tracing::debug!(
    root,
    fetched = arena.len(),
    kept = ancestry.len(),
    "ancestry collected"
  );
  Ok(ancestry)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{MemoryStore, stud_book};

  fn arena() -> HashMap<SubjectId, Subject> {
    stud_book().into_iter().map(|s| (s.id, s)).collect()
  }

  #[test]
  fn zero_generations_is_just_the_root() {
    let a = Ancestry::collect(-7, Some(0), &arena()).unwrap();
    assert_eq!(a.ids(), vec![-7]);
    assert_eq!(a.get(-7).unwrap().generation, 0);
  }

  #[test]
  fn bound_excludes_deeper_generations() {
    // Comet(-7): Bella(-3), Hugo(-2) at 1; Ruby(-9), Ajax(-10) at 2;
    // Misty(-11) would be generation 3.
    let a = Ancestry::collect(-7, Some(2), &arena()).unwrap();
    assert_eq!(a.ids(), vec![-10, -9, -7, -3, -2]);
    assert_eq!(a.get(-9).unwrap().generation, 2);
    assert!(!a.contains(-11));
  }

  #[test]
  fn each_bound_is_a_strict_subset_of_the_next() {
    let arena = arena();
    let mut previous = Ancestry::collect(-8, Some(0), &arena).unwrap().ids();
    for n in 1..=4 {
      let current = Ancestry::collect(-8, Some(n), &arena).unwrap().ids();
      assert!(previous.iter().all(|id| current.contains(id)));
      assert!(current.len() > previous.len(), "bound {n} added nothing");
      previous = current;
    }
  }

  #[test]
  fn diamond_ancestor_appears_once_at_shortest_generation() {
    // Hugo(-2) is Storm's grandfather through both Daisy(-4) and Comet(-7).
    let a = Ancestry::collect(-8, None, &arena()).unwrap();
    assert_eq!(a.iter().filter(|x| x.subject.id == -2).count(), 1);
    assert_eq!(a.get(-2).unwrap().generation, 2);
    assert_eq!(a.len(), 9);
  }

  #[test]
  fn unbounded_walk_reaches_every_ancestor() {
    let a = Ancestry::collect(-7, None, &arena()).unwrap();
    assert_eq!(a.ids(), vec![-11, -10, -9, -7, -3, -2]);
    assert_eq!(a.get(-11).unwrap().generation, 3);
  }

  #[test]
  fn missing_root_yields_none() {
    assert!(Ancestry::collect(-99, None, &arena()).is_none());
  }

  #[test]
  fn parent_missing_from_arena_is_skipped() {
    let mut arena = arena();
    arena.remove(&-3);
    let a = Ancestry::collect(-7, None, &arena).unwrap();
    assert_eq!(a.ids(), vec![-7, -2]);
  }

  #[test]
  fn corrupted_cycle_terminates() {
    let mut arena = arena();
    // Misty claims Comet as her mother: a cycle no valid write can create.
    arena.get_mut(&-11).unwrap().mother_id = Some(-7);
    let a = Ancestry::collect(-7, None, &arena).unwrap();
    assert_eq!(a.len(), 6);
  }

  #[tokio::test]
  async fn walk_trims_an_over_fetching_store() {
    let store = MemoryStore::with(stud_book());
    let a = walk_ancestors(&store, -7, Some(1)).await.unwrap();
    assert_eq!(a.ids(), vec![-7, -3, -2]);
  }

  #[tokio::test]
  async fn walk_of_unknown_root_is_not_found() {
    let store = MemoryStore::with(stud_book());
    let err = walk_ancestors(&store, 42, None).await.unwrap_err();
    assert!(matches!(err, Error::SubjectNotFound(42)));
  }
}
