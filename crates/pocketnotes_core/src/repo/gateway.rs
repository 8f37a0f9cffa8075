//! Persistence gateway contract and SQLite implementation.
//!
//! # Responsibility
//! - Store the group and note collections as whole-collection payloads.
//! - Keep serialization format and SQL details inside the gateway.
//!
//! # Invariants
//! - A missing collection loads as empty; a malformed one is an error.
//! - Each save replaces the full payload inside one transaction.
//! - `save_collections` commits both payloads or neither.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::group::Group;
use crate::model::note::Note;
use log::{debug, error, warn};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Stable storage key of the group collection.
pub const GROUPS_KEY: &str = "notes_app_groups";
/// Stable storage key of the note collection.
pub const NOTES_KEY: &str = "notes_app_notes";

pub type StorageResult<T> = Result<T, StorageError>;

/// Gateway-level failure. Surfaced to callers as "storage unavailable".
#[derive(Debug)]
pub enum StorageError {
    /// Underlying database could not be opened, read or written.
    Db(DbError),
    /// Stored payload under `key` is not a valid collection.
    Corrupted {
        key: &'static str,
        source: serde_json::Error,
    },
    /// Collection could not be encoded for storage.
    Encode(serde_json::Error),
    /// Connection is missing the collection table.
    MissingRequiredTable(&'static str),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "storage unavailable: {err}"),
            Self::Corrupted { key, source } => {
                write!(f, "storage unavailable: corrupted payload under `{key}`: {source}")
            }
            Self::Encode(err) => write!(f, "storage unavailable: failed to encode payload: {err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "storage unavailable: missing required table `{table}`")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Corrupted { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable store of the two named collections.
///
/// Writes take `&mut self`, so one gateway has at most one writer.
pub trait PersistenceGateway {
    /// Loads all groups in insertion order.
    fn load_groups(&self) -> StorageResult<Vec<Group>>;
    /// Replaces the full group collection.
    fn save_groups(&mut self, groups: &[Group]) -> StorageResult<()>;
    /// Loads all notes in collection order.
    fn load_notes(&self) -> StorageResult<Vec<Note>>;
    /// Replaces the full note collection.
    fn save_notes(&mut self, notes: &[Note]) -> StorageResult<()>;
    /// Replaces both collections as one atomic unit.
    fn save_collections(&mut self, groups: &[Group], notes: &[Note]) -> StorageResult<()>;
}

/// SQLite-backed collection store.
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        ensure_collections_table(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (and migrates) a file database.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Raw stored payload under `key`, if any.
    pub fn raw_payload(&self, key: &str) -> StorageResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &'static str) -> StorageResult<Vec<T>> {
        let Some(payload) = self.raw_payload(key)? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&payload).map_err(|source| {
            warn!(
                "event=collection_load module=gateway status=error key={key} error_code=payload_corrupted bytes={}",
                payload.len()
            );
            StorageError::Corrupted { key, source }
        })
    }

    fn write_collections(&mut self, entries: &[(&'static str, String)]) -> StorageResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for (key, payload) in entries {
            tx.execute(
                "INSERT INTO collections (key, payload, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at;",
                params![key, payload],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn save_encoded(&mut self, entries: &[(&'static str, String)]) -> StorageResult<()> {
        let keys = entries
            .iter()
            .map(|(key, _)| *key)
            .collect::<Vec<_>>()
            .join(",");
        match self.write_collections(entries) {
            Ok(()) => {
                debug!("event=collection_save module=gateway status=ok keys={keys}");
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=collection_save module=gateway status=error keys={keys} error_code=write_failed error={err}"
                );
                Err(err)
            }
        }
    }
}

impl PersistenceGateway for SqliteGateway {
    fn load_groups(&self) -> StorageResult<Vec<Group>> {
        self.load_collection(GROUPS_KEY)
    }

    fn save_groups(&mut self, groups: &[Group]) -> StorageResult<()> {
        let payload = encode(groups)?;
        self.save_encoded(&[(GROUPS_KEY, payload)])
    }

    fn load_notes(&self) -> StorageResult<Vec<Note>> {
        self.load_collection(NOTES_KEY)
    }

    fn save_notes(&mut self, notes: &[Note]) -> StorageResult<()> {
        let payload = encode(notes)?;
        self.save_encoded(&[(NOTES_KEY, payload)])
    }

    fn save_collections(&mut self, groups: &[Group], notes: &[Note]) -> StorageResult<()> {
        let groups_payload = encode(groups)?;
        let notes_payload = encode(notes)?;
        self.save_encoded(&[(GROUPS_KEY, groups_payload), (NOTES_KEY, notes_payload)])
    }
}

fn encode<T: Serialize>(records: &[T]) -> StorageResult<String> {
    serde_json::to_string(records).map_err(StorageError::Encode)
}

fn ensure_collections_table(conn: &Connection) -> StorageResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'collections'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StorageError::MissingRequiredTable("collections"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{PersistenceGateway, SqliteGateway, StorageError, GROUPS_KEY};
    use rusqlite::Connection;

    #[test]
    fn missing_collections_load_as_empty() {
        let gateway = SqliteGateway::open_in_memory().unwrap();
        assert!(gateway.load_groups().unwrap().is_empty());
        assert!(gateway.load_notes().unwrap().is_empty());
        assert_eq!(gateway.raw_payload(GROUPS_KEY).unwrap(), None);
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteGateway::try_new(conn).err().unwrap();
        assert!(matches!(err, StorageError::MissingRequiredTable("collections")));
    }
}
