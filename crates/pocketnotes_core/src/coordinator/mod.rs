//! In-memory state coordinator for the presentation layer.
//!
//! # Responsibility
//! - Load groups at startup and own the active selection.
//! - Route every mutation through the group/note services.
//! - Maintain the active group's view incrementally after each mutation.
//!
//! # Invariants
//! - The incremental view always equals `project_view` over a full reload.
//! - Deleting the active group reselects the first remaining group, or
//!   clears both selection and view.
//! - Active selection is never persisted.

pub mod projection;

use crate::coordinator::projection::{newest_first, project_view, ViewState};
use crate::model::clock::Clock;
use crate::model::group::{Group, GroupId, GroupNameError};
use crate::model::note::{Note, NoteId};
use crate::repo::gateway::{PersistenceGateway, StorageError};
use crate::service::group_service::{DeletedGroup, GroupService, GroupServiceError};
use crate::service::note_service::{NoteService, NoteServiceError};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Typed outcome of a failed coordinator operation.
#[derive(Debug)]
pub enum CoordinatorError {
    /// Group name is blank or too short after trim.
    InvalidName(GroupNameError),
    /// Group color is blank.
    InvalidColor,
    /// Group name collides case-insensitively with an existing group.
    DuplicateName(String),
    /// Note content is blank after trim.
    EmptyContent,
    /// Target group does not exist.
    GroupNotFound(GroupId),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Note creation requested while no group is selected.
    NoActiveGroup,
    /// Persistence-layer failure; state on disk is unchanged.
    StorageUnavailable(StorageError),
}

impl Display for CoordinatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(GroupNameError::Empty) => write!(f, "group name must not be blank"),
            Self::InvalidName(GroupNameError::TooShort) => {
                write!(f, "group name is shorter than the minimum length")
            }
            Self::InvalidColor => write!(f, "group color must not be blank"),
            Self::DuplicateName(name) => write!(f, "group name already exists: `{name}`"),
            Self::EmptyContent => write!(f, "note content must not be blank"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::NoActiveGroup => write!(f, "no active group selected"),
            Self::StorageUnavailable(err) => write!(f, "{err}"),
        }
    }
}

impl CoordinatorError {
    /// Stable machine-readable code for bridges and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName(GroupNameError::Empty) => "group_name_empty",
            Self::InvalidName(GroupNameError::TooShort) => "group_name_too_short",
            Self::InvalidColor => "group_color_invalid",
            Self::DuplicateName(_) => "group_name_duplicate",
            Self::EmptyContent => "note_content_empty",
            Self::GroupNotFound(_) => "group_not_found",
            Self::NoteNotFound(_) => "note_not_found",
            Self::NoActiveGroup => "no_active_group",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    /// Whether the user can fix the input and retry right away.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::StorageUnavailable(_))
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for CoordinatorError {
    fn from(value: StorageError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<GroupServiceError> for CoordinatorError {
    fn from(value: GroupServiceError) -> Self {
        match value {
            GroupServiceError::InvalidName(reason) => Self::InvalidName(reason),
            GroupServiceError::InvalidColor => Self::InvalidColor,
            GroupServiceError::DuplicateName(name) => Self::DuplicateName(name),
            GroupServiceError::GroupNotFound(id) => Self::GroupNotFound(id),
            GroupServiceError::StorageUnavailable(err) => Self::StorageUnavailable(err),
        }
    }
}

impl From<NoteServiceError> for CoordinatorError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::EmptyContent => Self::EmptyContent,
            NoteServiceError::NoteNotFound(id) => Self::NoteNotFound(id),
            NoteServiceError::StorageUnavailable(err) => Self::StorageUnavailable(err),
        }
    }
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Single in-memory authority over groups, selection and the note view.
pub struct StateCoordinator<G: PersistenceGateway, C: Clock> {
    gateway: G,
    clock: C,
    groups: Vec<Group>,
    active_group_id: Option<GroupId>,
    view: Vec<Note>,
    // Position of each viewed note in collection order; breaks `updated_at` ties.
    ordinals: HashMap<NoteId, u64>,
    next_ordinal: u64,
}

impl<G: PersistenceGateway, C: Clock> StateCoordinator<G, C> {
    /// Loads groups and selects the first one when any exist.
    pub fn load(gateway: G, clock: C) -> CoordinatorResult<Self> {
        let groups = gateway.load_groups()?;
        let mut coordinator = Self {
            gateway,
            clock,
            groups,
            active_group_id: None,
            view: Vec::new(),
            ordinals: HashMap::new(),
            next_ordinal: 0,
        };

        if let Some(first) = coordinator.groups.first().map(|group| group.id.clone()) {
            coordinator.select_group(&first)?;
        }

        info!(
            "event=coordinator_load module=coordinator status=ok groups={} active={}",
            coordinator.groups.len(),
            coordinator.active_group_id.is_some()
        );
        Ok(coordinator)
    }

    /// All groups in insertion order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Currently selected group.
    pub fn active_group(&self) -> Option<&Group> {
        let active_id = self.active_group_id.as_deref()?;
        self.groups.iter().find(|group| group.id == active_id)
    }

    /// Enriched notes of the active group, most recently updated first.
    pub fn view(&self) -> &[Note] {
        &self.view
    }

    /// Snapshot of the current view state.
    pub fn view_state(&self) -> ViewState {
        ViewState {
            active_group: self.active_group().cloned(),
            notes: self.view.clone(),
        }
    }

    /// Recomputes the view from storage without touching in-memory state.
    pub fn reload_view(&self) -> CoordinatorResult<ViewState> {
        let groups = self.gateway.load_groups()?;
        let notes = self.gateway.load_notes()?;
        Ok(project_view(
            &groups,
            &notes,
            self.active_group_id.as_deref(),
        ))
    }

    /// Borrowed gateway, for diagnostics.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Makes `group_id` active and loads its enriched, sorted notes.
    pub fn select_group(&mut self, group_id: &str) -> CoordinatorResult<&[Note]> {
        if !self.groups.iter().any(|group| group.id == group_id) {
            return Err(CoordinatorError::GroupNotFound(group_id.to_string()));
        }

        let notes = self.gateway.load_notes()?;
        let state = project_view(&self.groups, &notes, Some(group_id));

        self.ordinals = notes
            .iter()
            .filter(|note| note.group_id == group_id)
            .zip(0u64..)
            .map(|(note, ordinal)| (note.id.clone(), ordinal))
            .collect();
        self.next_ordinal = self.ordinals.len() as u64;
        self.active_group_id = Some(group_id.to_string());
        self.view = state.notes;

        debug!(
            "event=group_select module=coordinator status=ok group_id={} notes={}",
            group_id,
            self.view.len()
        );
        Ok(&self.view)
    }

    /// Creates a group and makes it active.
    ///
    /// When the new group's view cannot be loaded the group is still
    /// created and the selection is left empty.
    pub fn create_group(&mut self, name: &str, color: &str) -> CoordinatorResult<Group> {
        let group = GroupService::new(&mut self.gateway).create_group(name, color)?;
        self.groups.push(group.clone());
        self.reselect_after_commit(Some(group.id.clone()));
        Ok(group)
    }

    /// Deletes a group with its notes, reselecting when it was active.
    ///
    /// A failed reselect leaves no group selected; the delete itself stands.
    pub fn delete_group(&mut self, group_id: &str) -> CoordinatorResult<DeletedGroup> {
        let deleted = GroupService::new(&mut self.gateway).delete_group(group_id)?;
        self.groups.retain(|group| group.id != group_id);

        if self.active_group_id.as_deref() == Some(group_id) {
            let next = self.groups.first().map(|group| group.id.clone());
            self.reselect_after_commit(next);
        }
        Ok(deleted)
    }

    /// Creates a note in the active group.
    pub fn create_note(&mut self, content: &str) -> CoordinatorResult<Note> {
        let (group_id, group_color) = match self.active_group() {
            Some(group) => (group.id.clone(), group.color.clone()),
            None => return Err(CoordinatorError::NoActiveGroup),
        };

        let note = NoteService::new(&mut self.gateway, &self.clock).create_note(
            &group_id,
            content,
            Some(group_color.as_str()),
        )?;

        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.ordinals.insert(note.id.clone(), ordinal);
        // Newest in collection order, so it goes after every note not older than it.
        let position = self
            .view
            .partition_point(|existing| existing.updated_at >= note.updated_at);
        self.view.insert(position, note.clone());
        Ok(note)
    }

    /// Edits note content; re-sorts the view when the note is shown.
    pub fn edit_note(&mut self, note_id: &str, content: &str) -> CoordinatorResult<Note> {
        let edited = NoteService::new(&mut self.gateway, &self.clock).edit_note(note_id, content)?;

        if let Some(slot) = self.view.iter_mut().find(|note| note.id == edited.id) {
            slot.content = edited.content.clone();
            slot.updated_at = edited.updated_at;
            let ordinals = &self.ordinals;
            self.view.sort_by(|left, right| {
                newest_first(left, right).then_with(|| {
                    let left_ordinal = ordinals.get(&left.id).copied().unwrap_or(u64::MAX);
                    let right_ordinal = ordinals.get(&right.id).copied().unwrap_or(u64::MAX);
                    left_ordinal.cmp(&right_ordinal)
                })
            });
        }
        Ok(edited)
    }

    /// Deletes a note; drops it from the view when shown.
    pub fn delete_note(&mut self, note_id: &str) -> CoordinatorResult<Note> {
        let removed = NoteService::new(&mut self.gateway, &self.clock).delete_note(note_id)?;
        self.view.retain(|note| note.id != removed.id);
        self.ordinals.remove(&removed.id);
        Ok(removed)
    }

    /// Moves the selection after a committed group mutation.
    ///
    /// The mutation already succeeded, so a failed reload only degrades the
    /// view: selection stays cleared and the caller still gets `Ok`.
    fn reselect_after_commit(&mut self, next: Option<GroupId>) {
        self.clear_selection();
        let Some(next) = next else {
            return;
        };
        if let Err(err) = self.select_group(&next) {
            warn!(
                "event=group_select module=coordinator status=degraded group_id={} error_code={} error={}",
                next,
                err.code(),
                err
            );
        }
    }

    fn clear_selection(&mut self) {
        self.active_group_id = None;
        self.view.clear();
        self.ordinals.clear();
        self.next_ordinal = 0;
        debug!("event=group_select module=coordinator status=ok group_id=none notes=0");
    }
}
