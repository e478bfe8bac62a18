//! Demonstration records for development and tests.
//!
//! Test rows use negative ids so they never collide with ids assigned by
//! SQLite. Reseeding first removes every negative-id row. Seeded subjects
//! carry no owner: owner references must be positive ids.

use crate::{Result, store::SqliteStore};

/// Parents are inserted before their children to satisfy the foreign keys.
const TEST_DATA: &str = "
DELETE FROM subjects WHERE id < 0;
DELETE FROM owners   WHERE id < 0;

INSERT INTO owners (id, first_name, last_name, description) VALUES
    (-1, 'Gilbert', 'Crocker', 'Breeder since 1998'),
    (-2, 'Anna',    'Berger',  NULL),
    (-3, 'Tom',     'Miller',  'Stable hand');

INSERT INTO subjects (id, name, description, date_of_birth, sex, mother_id, father_id) VALUES
    (-11, 'Misty', NULL,                '2001-01-01', 'FEMALE', NULL, NULL),
    (-10, 'Ajax',  'Founding stallion', '2007-01-01', 'MALE',   NULL, NULL),
    (-9,  'Ruby',  NULL,                '2008-01-01', 'FEMALE', -11,  NULL),
    (-5,  'Rocky', NULL,                '2010-07-07', 'MALE',   NULL, NULL),
    (-2,  'Hugo',  'Grey, calm',        '2012-05-05', 'MALE',   NULL, NULL),
    (-1,  'Wendy', NULL,                '2015-01-01', 'FEMALE', NULL, NULL),
    (-3,  'Bella', NULL,                '2016-03-10', 'FEMALE', -9,   -10),
    (-4,  'Daisy', 'Show jumper',       '2019-01-01', 'FEMALE', -1,   -2),
    (-6,  'Luna',  NULL,                '2018-04-04', 'FEMALE', -1,   -5),
    (-7,  'Comet', NULL,                '2021-02-02', 'MALE',   -3,   -2),
    (-8,  'Storm', NULL,                '2022-06-06', 'MALE',   -4,   -7);
";

impl SqliteStore {
  /// Replace the demonstration records: three owners and an eleven-subject
  /// stud book spanning four generations.
  pub async fn insert_test_data(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(TEST_DATA)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::info!("test data inserted");
    Ok(())
  }
}
