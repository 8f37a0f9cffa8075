//! Schema versions of the collection store.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps shipped with this binary.
//! - Bring a connection up to the newest step in one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and grow by exactly 1.
//! - `PRAGMA user_version` always equals the last applied step.
//! - A database newer than this binary is never touched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "collections",
    sql: include_str!("0001_collections.sql"),
}];

/// What one `apply_migrations` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the steps applied, oldest first. Empty when up to date.
    pub applied: Vec<&'static str>,
}

/// Returns the newest schema version this binary can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades `conn` to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - SQLite failures; the transaction is rolled back and the version kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationOutcome> {
    let from_version = read_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending = pending_steps(from_version).collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(MigrationOutcome {
            from_version,
            to_version: from_version,
            applied: Vec::new(),
        });
    }

    let tx = conn.transaction()?;
    for step in &pending {
        run_step(&tx, step)?;
    }
    tx.commit()?;

    let applied = pending.iter().map(|step| step.name).collect::<Vec<_>>();
    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} steps={}",
        applied.len()
    );
    Ok(MigrationOutcome {
        from_version,
        to_version: latest,
        applied,
    })
}

fn pending_steps(current: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS.iter().filter(move |step| step.version > current)
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    debug!(
        "event=db_migrate_step module=db status=start version={} name={}",
        step.version, step.name
    );
    tx.execute_batch(step.sql)?;
    // PRAGMA does not accept bound parameters.
    tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))?;
    Ok(())
}

fn read_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, pending_steps, SCHEMA_STEPS};
    use rusqlite::Connection;

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step `{}`", step.name);
        }
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        assert_eq!(pending_steps(0).count(), SCHEMA_STEPS.len());
        assert_eq!(pending_steps(latest_version()).count(), 0);
    }

    #[test]
    fn fresh_connection_applies_every_step_then_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();

        let first = apply_migrations(&mut conn).unwrap();
        assert_eq!(first.from_version, 0);
        assert_eq!(first.to_version, latest_version());
        assert_eq!(first.applied, vec!["collections"]);

        let second = apply_migrations(&mut conn).unwrap();
        assert_eq!(second.from_version, latest_version());
        assert!(second.applied.is_empty());
    }
}
