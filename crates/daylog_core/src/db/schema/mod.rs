//! Versioned schema steps.
//!
//! Step `n` (1-based) moves the store from version `n - 1` to `n`. Steps are
//! append-only; an applied step is never edited.

use super::{DbError, DbResult};
use rusqlite::Connection;

const STEPS: &[&str] = &[include_str!("v1_kv_blobs.sql")];

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = STEPS.len() as u32;

/// Versions before and after `upgrade`; equal when nothing ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from: u32,
    pub to: u32,
}

impl SchemaUpgrade {
    pub fn ran(&self) -> bool {
        self.from != self.to
    }
}

/// Current `user_version` of the connection.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Runs every pending step in a single transaction.
pub(crate) fn upgrade(conn: &mut Connection) -> DbResult<SchemaUpgrade> {
    let from = schema_version(conn)?;
    if from > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found: from,
            supported: SCHEMA_VERSION,
        });
    }

    if from < SCHEMA_VERSION {
        let tx = conn.transaction()?;
        for sql in &STEPS[from as usize..] {
            tx.execute_batch(sql)?;
        }
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
    }

    Ok(SchemaUpgrade {
        from,
        to: SCHEMA_VERSION,
    })
}

#[cfg(test)]
mod tests {
    use super::{upgrade, SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn second_upgrade_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        let first = upgrade(&mut conn).unwrap();
        assert!(first.ran());
        assert_eq!((first.from, first.to), (0, SCHEMA_VERSION));

        let second = upgrade(&mut conn).unwrap();
        assert!(!second.ran());
    }
}
