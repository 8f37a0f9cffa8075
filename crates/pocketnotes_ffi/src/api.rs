//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose group/note use-cases to Dart via FRB as sync calls.
//! - Translate typed core outcomes into user-facing message envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide coordinator serializes every read-modify-write.
//! - A failed coordinator bootstrap is retried on the next call.

use log::{error, warn};
use pocketnotes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, random_group_color,
    CoordinatorError, CoreConfig, Group, GroupNameError, Note, SqliteGateway, StateCoordinator,
    SystemClock, GROUP_NAME_MIN_CHARS,
};
use std::sync::{Mutex, MutexGuard};

type Coordinator = StateCoordinator<SqliteGateway, SystemClock>;

struct Bridge {
    config: CoreConfig,
    coordinator: Coordinator,
}

static BRIDGE: Mutex<Option<Bridge>> = Mutex::new(None);

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Group row for the sidebar list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupItem {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Two-letter avatar label.
    pub initials: String,
}

/// Note row for the active group's view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub content: String,
    pub group_id: String,
    pub group_color: Option<String>,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
    /// RFC 3339 UTC timestamp.
    pub updated_at: String,
}

/// Envelope for group list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupsResponse {
    pub ok: bool,
    pub items: Vec<GroupItem>,
    pub active_group_id: Option<String>,
    pub message: String,
}

/// Envelope for the active group's note view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub ok: bool,
    pub group_id: Option<String>,
    /// Most recently updated first.
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Generic action envelope for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created/changed/removed entity on success.
    pub id: Option<String>,
    /// Stable error code on failure (`group_name_duplicate`, ...).
    pub error_code: Option<String>,
    /// Human-readable message for toast/inline display.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(err: &CoordinatorError) -> Self {
        if !err.is_recoverable() {
            error!(
                "event=ffi_action module=ffi status=error error_code={} error={err}",
                err.code()
            );
        }
        Self {
            ok: false,
            id: None,
            error_code: Some(err.code().to_string()),
            message: user_message(err),
        }
    }
}

/// Lists groups in creation order with the current selection.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_list() -> GroupsResponse {
    match with_bridge(|bridge| {
        let coordinator = &bridge.coordinator;
        Ok((
            coordinator.groups().iter().map(to_group_item).collect::<Vec<_>>(),
            coordinator.active_group().map(|group| group.id.clone()),
        ))
    }) {
        Ok((items, active_group_id)) => GroupsResponse {
            ok: true,
            message: format!("{} group(s).", items.len()),
            items,
            active_group_id,
        },
        Err(err) => GroupsResponse {
            ok: false,
            items: Vec::new(),
            active_group_id: None,
            message: user_message(&err),
        },
    }
}

/// Creates a group and selects it.
///
/// `color = None` picks a random color from the configured palette.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_create(name: String, color: Option<String>) -> ActionResponse {
    let result = with_bridge(|bridge| {
        let color = color
            .filter(|value| !value.trim().is_empty())
            .or_else(|| random_group_color(&bridge.config.palette))
            .unwrap_or_default();
        bridge.coordinator.create_group(&name, &color)
    });
    match result {
        Ok(group) => ActionResponse::success(format!("Group \"{}\" created.", group.name), group.id),
        Err(err) => ActionResponse::failure(&err),
    }
}

/// Deletes a group together with all of its notes.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_delete(group_id: String) -> ActionResponse {
    match with_bridge(|bridge| bridge.coordinator.delete_group(&group_id)) {
        Ok(deleted) => ActionResponse::success(
            format!(
                "Group \"{}\" deleted with {} note(s).",
                deleted.group.name, deleted.removed_notes
            ),
            deleted.group.id,
        ),
        Err(err) => ActionResponse::failure(&err),
    }
}

/// Selects a group and returns its sorted, enriched notes.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_select(group_id: String) -> NotesResponse {
    notes_response(with_bridge(|bridge| {
        bridge.coordinator.select_group(&group_id)?;
        Ok(snapshot_view(&bridge.coordinator))
    }))
}

/// Returns the current view without reloading.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_view() -> NotesResponse {
    notes_response(with_bridge(|bridge| Ok(snapshot_view(&bridge.coordinator))))
}

/// Creates a note in `group_id`, selecting that group first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create(group_id: String, content: String) -> ActionResponse {
    let result = with_bridge(|bridge| {
        let already_active = bridge
            .coordinator
            .active_group()
            .is_some_and(|group| group.id == group_id);
        if !already_active {
            bridge.coordinator.select_group(&group_id)?;
        }
        bridge.coordinator.create_note(&content)
    });
    match result {
        Ok(note) => ActionResponse::success("Note added.", note.id),
        Err(err) => ActionResponse::failure(&err),
    }
}

/// Replaces note content.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_edit(note_id: String, content: String) -> ActionResponse {
    match with_bridge(|bridge| bridge.coordinator.edit_note(&note_id, &content)) {
        Ok(note) => ActionResponse::success("Note updated.", note.id),
        Err(err) => ActionResponse::failure(&err),
    }
}

/// Deletes one note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(note_id: String) -> ActionResponse {
    match with_bridge(|bridge| bridge.coordinator.delete_note(&note_id)) {
        Ok(note) => ActionResponse::success("Note deleted.", note.id),
        Err(err) => ActionResponse::failure(&err),
    }
}

fn with_bridge<T>(
    f: impl FnOnce(&mut Bridge) -> Result<T, CoordinatorError>,
) -> Result<T, CoordinatorError> {
    let mut guard = lock_bridge();
    let mut bridge = match guard.take() {
        Some(bridge) => bridge,
        None => bootstrap()?,
    };
    let result = f(&mut bridge);
    *guard = Some(bridge);
    result
}

fn lock_bridge() -> MutexGuard<'static, Option<Bridge>> {
    // A panicking call never puts its bridge back; the next call reloads.
    BRIDGE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn bootstrap() -> Result<Bridge, CoordinatorError> {
    let config = CoreConfig::from_env().unwrap_or_else(|err| {
        warn!("event=ffi_bootstrap module=ffi status=degraded error_code=config_invalid error={err}");
        CoreConfig::default()
    });
    if let Err(err) = config.start_logging() {
        warn!("event=ffi_bootstrap module=ffi status=degraded error_code=logging_unavailable error={err}");
    }
    let gateway = SqliteGateway::open(&config.db_path)?;
    let coordinator = StateCoordinator::load(gateway, SystemClock)?;
    Ok(Bridge {
        config,
        coordinator,
    })
}

fn snapshot_view(coordinator: &Coordinator) -> (Option<String>, Vec<NoteItem>) {
    (
        coordinator.active_group().map(|group| group.id.clone()),
        coordinator.view().iter().map(to_note_item).collect(),
    )
}

fn notes_response(result: Result<(Option<String>, Vec<NoteItem>), CoordinatorError>) -> NotesResponse {
    match result {
        Ok((group_id, items)) => NotesResponse {
            ok: true,
            message: if items.is_empty() {
                "No notes in this group yet.".to_string()
            } else {
                format!("{} note(s).", items.len())
            },
            group_id,
            items,
        },
        Err(err) => NotesResponse {
            ok: false,
            group_id: None,
            items: Vec::new(),
            message: user_message(&err),
        },
    }
}

fn user_message(err: &CoordinatorError) -> String {
    match err {
        CoordinatorError::InvalidName(GroupNameError::Empty) => "Group name is required".to_string(),
        CoordinatorError::InvalidName(GroupNameError::TooShort) => {
            format!("Group name must be at least {GROUP_NAME_MIN_CHARS} characters")
        }
        CoordinatorError::InvalidColor => "Pick a color for the group".to_string(),
        CoordinatorError::DuplicateName(_) => "A group with this name already exists".to_string(),
        CoordinatorError::EmptyContent => "Note content cannot be empty".to_string(),
        CoordinatorError::GroupNotFound(_) => "Group not found".to_string(),
        CoordinatorError::NoteNotFound(_) => "Note not found".to_string(),
        CoordinatorError::NoActiveGroup => "Select a group first".to_string(),
        CoordinatorError::StorageUnavailable(inner) => {
            format!("Local storage is unavailable; your last change was not saved ({inner})")
        }
    }
}

fn to_group_item(group: &Group) -> GroupItem {
    GroupItem {
        id: group.id.clone(),
        name: group.name.clone(),
        color: group.color.clone(),
        initials: group.initials(),
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.clone(),
        content: note.content.clone(),
        group_id: note.group_id.clone(),
        group_color: note.group_color.clone(),
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
    }
}
