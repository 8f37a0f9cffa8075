//! Core domain logic for Pocket Notes.
//! This crate is the single source of truth for group/note invariants.

pub mod config;
pub mod coordinator;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use coordinator::projection::{project_view, ViewState};
pub use coordinator::{CoordinatorError, CoordinatorResult, StateCoordinator};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::clock::{Clock, ManualClock, SystemClock};
pub use model::group::{
    random_group_color, Group, GroupId, GroupNameError, DEFAULT_GROUP_PALETTE,
    GROUP_NAME_MIN_CHARS,
};
pub use model::note::{Note, NoteId, Timestamp};
pub use repo::gateway::{
    PersistenceGateway, SqliteGateway, StorageError, StorageResult, GROUPS_KEY, NOTES_KEY,
};
pub use service::group_service::{DeletedGroup, GroupService, GroupServiceError};
pub use service::note_service::{NoteService, NoteServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
