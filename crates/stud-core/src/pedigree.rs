//! Pedigree assembler: turns a flat [`Ancestry`] into a nested tree.
//!
//! The assembler knows nothing about generation bounds. It recurses as deep as
//! the ancestry it is given allows; bounding is the walker's job.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ancestry::Ancestry,
  subject::{Sex, Subject, SubjectId},
};

/// Recursion limit. Valid data is acyclic, so hitting it means the store was
/// modified behind the engine's back.
pub const MAX_PEDIGREE_DEPTH: usize = 512;

/// One node of a pedigree tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedigreeNode {
  pub id:            SubjectId,
  pub name:          String,
  pub date_of_birth: NaiveDate,
  pub sex:           Sex,
  pub mother:        Option<Box<PedigreeNode>>,
  pub father:        Option<Box<PedigreeNode>>,
}

impl PedigreeNode {
  /// Number of generations below and including this node.
  pub fn depth(&self) -> usize {
    let mother = self.mother.as_ref().map_or(0, |m| m.depth());
    let father = self.father.as_ref().map_or(0, |f| f.depth());
    1 + mother.max(father)
  }
}

/// Build the pedigree rooted at `root` from `ancestry`.
///
/// Fails with [`Error::Fatal`] if `root` is not a member of `ancestry`, or if
/// the recursion exceeds [`MAX_PEDIGREE_DEPTH`].
pub fn assemble(root: SubjectId, ancestry: &Ancestry) -> Result<PedigreeNode> {
  tracing::trace!(root, members = ancestry.len(), "assemble");
  let subject = ancestry.subject(root).ok_or_else(|| {
    Error::Fatal(format!("pedigree root {root} missing from its own ancestry"))
  })?;
  build(subject, ancestry, 0)
}

fn build(subject: &Subject, ancestry: &Ancestry, depth: usize) -> Result<PedigreeNode> {
  if depth >= MAX_PEDIGREE_DEPTH {
    tracing::warn!(id = subject.id, depth, "pedigree recursion limit reached");
    return Err(Error::Fatal(format!(
      "pedigree of subject {} exceeds {MAX_PEDIGREE_DEPTH} generations; parent links are cyclic",
      subject.id
    )));
  }

  let parent = |id: Option<SubjectId>| -> Result<Option<Box<PedigreeNode>>> {
    match id.and_then(|id| ancestry.subject(id)) {
      Some(p) => Ok(Some(Box::new(build(p, ancestry, depth + 1)?))),
      None => Ok(None),
    }
  };

  Ok(PedigreeNode {
    id:            subject.id,
    name:          subject.name.clone(),
    date_of_birth: subject.date_of_birth,
    sex:           subject.sex,
    mother:        parent(subject.mother_id)?,
    father:        parent(subject.father_id)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{stud_book, subject};

  fn book(ids: &[SubjectId]) -> Vec<Subject> {
    stud_book()
      .into_iter()
      .filter(|s| ids.contains(&s.id))
      .collect()
  }

  #[test]
  fn slots_follow_parent_ids() {
    let ancestry = Ancestry::from_subjects(-7, book(&[-7, -3, -2])).unwrap();
    let tree = assemble(-7, &ancestry).unwrap();

    assert_eq!(tree.name, "Comet");
    assert_eq!(tree.mother.as_ref().unwrap().id, -3);
    assert_eq!(tree.father.as_ref().unwrap().id, -2);
    // Bella's parents exist but were not supplied.
    assert!(tree.mother.as_ref().unwrap().mother.is_none());
    assert_eq!(tree.depth(), 2);
  }

  #[test]
  fn parent_absent_from_set_leaves_slot_empty() {
    let ancestry = Ancestry::from_subjects(-7, book(&[-7, -3])).unwrap();
    let tree = assemble(-7, &ancestry).unwrap();
    assert!(tree.mother.is_some());
    assert!(tree.father.is_none());
  }

  #[test]
  fn subject_without_parents_is_a_leaf() {
    let ancestry = Ancestry::from_subjects(-1, book(&[-1])).unwrap();
    let tree = assemble(-1, &ancestry).unwrap();
    assert!(tree.mother.is_none() && tree.father.is_none());
  }

  #[test]
  fn diamond_ancestor_is_repeated_in_each_branch() {
    let ancestry = Ancestry::from_subjects(-8, stud_book()).unwrap();
    let tree = assemble(-8, &ancestry).unwrap();
    let via_daisy = tree.mother.as_ref().unwrap().father.as_ref().unwrap();
    let via_comet = tree.father.as_ref().unwrap().father.as_ref().unwrap();
    assert_eq!(via_daisy.id, -2);
    assert_eq!(via_comet.id, -2);
    assert_eq!(tree.depth(), 5);
  }

  #[test]
  fn root_missing_is_fatal() {
    let ancestry = Ancestry::from_subjects(-1, book(&[-1])).unwrap();
    let err = assemble(-4, &ancestry).unwrap_err();
    assert!(matches!(err, Error::Fatal(_)));
  }

  #[test]
  fn tree_may_exceed_the_walk_bound_through_a_shorter_path() {
    use crate::subject::Sex::{Female, Male};
    // X's father G is also its great-grandfather through A -> B.
    let subjects = vec![
      subject(1, "X", Male, "2020-01-01", Some(2), Some(4)),
      subject(2, "A", Female, "2015-01-01", Some(3), None),
      subject(3, "B", Female, "2010-01-01", None, Some(4)),
      subject(4, "G", Male, "2005-01-01", Some(5), None),
      subject(5, "M", Female, "2000-01-01", None, None),
    ];
    let arena = subjects.into_iter().map(|s| (s.id, s)).collect();
    let ancestry = Ancestry::collect(1, Some(2), &arena).unwrap();
    assert!(ancestry.contains(4) && ancestry.contains(5));

    let tree = assemble(1, &ancestry).unwrap();
    // X -> A -> B -> G -> M: five levels for a two-generation request.
    assert_eq!(tree.depth(), 5);
  }

  #[test]
  fn cyclic_data_trips_the_recursion_guard() {
    use crate::subject::Sex::Female;
    let subjects = vec![
      subject(1, "Ouro", Female, "2020-01-01", Some(2), None),
      subject(2, "Boros", Female, "2019-01-01", Some(1), None),
    ];
    let ancestry = Ancestry::from_subjects(1, subjects).unwrap();
    let err = assemble(1, &ancestry).unwrap_err();
    assert!(matches!(err, Error::Fatal(_)));
  }
}
