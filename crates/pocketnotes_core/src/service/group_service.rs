//! Group use-case service.
//!
//! # Responsibility
//! - Validate and create groups with case-insensitive unique names.
//! - Delete groups together with every note they own.
//!
//! # Invariants
//! - Name validation runs here even when the caller already checked it.
//! - Group listing keeps insertion order.
//! - Cascade delete persists both collections in one gateway write.

use crate::model::group::{normalize_group_name, Group, GroupId, GroupNameError};
use crate::repo::gateway::{PersistenceGateway, StorageError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for group use-cases.
#[derive(Debug)]
pub enum GroupServiceError {
    /// Name is blank or too short after trim.
    InvalidName(GroupNameError),
    /// Color token is blank.
    InvalidColor,
    /// Another group already uses this name (case-insensitive).
    DuplicateName(String),
    /// Target group does not exist.
    GroupNotFound(GroupId),
    /// Persistence-layer failure.
    StorageUnavailable(StorageError),
}

impl Display for GroupServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(GroupNameError::Empty) => write!(f, "group name must not be blank"),
            Self::InvalidName(GroupNameError::TooShort) => {
                write!(f, "group name is shorter than the minimum length")
            }
            Self::InvalidColor => write!(f, "group color must not be blank"),
            Self::DuplicateName(name) => write!(f, "group name already exists: `{name}`"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GroupServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for GroupServiceError {
    fn from(value: StorageError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<GroupNameError> for GroupServiceError {
    fn from(value: GroupNameError) -> Self {
        Self::InvalidName(value)
    }
}

/// Outcome of a successful cascade delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedGroup {
    /// The removed group.
    pub group: Group,
    /// Number of notes removed with it.
    pub removed_notes: usize,
}

/// Group service facade over a persistence gateway.
pub struct GroupService<'g, G: PersistenceGateway> {
    gateway: &'g mut G,
}

impl<'g, G: PersistenceGateway> GroupService<'g, G> {
    /// Creates a service borrowing the provided gateway.
    pub fn new(gateway: &'g mut G) -> Self {
        Self { gateway }
    }

    /// Creates one group and appends it to the stored collection.
    ///
    /// # Errors
    /// - `InvalidName` when the trimmed name is empty or too short.
    /// - `InvalidColor` when `color` is blank.
    /// - `DuplicateName` when the name collides case-insensitively.
    pub fn create_group(&mut self, name: &str, color: &str) -> Result<Group, GroupServiceError> {
        let name = normalize_group_name(name)?;
        let color = color.trim();
        if color.is_empty() {
            return Err(GroupServiceError::InvalidColor);
        }

        let mut groups = self.gateway.load_groups()?;
        if groups.iter().any(|group| group.name_matches(&name)) {
            warn!("event=group_create module=group status=rejected error_code=duplicate_name");
            return Err(GroupServiceError::DuplicateName(name));
        }

        let group = Group::new(name, color);
        groups.push(group.clone());
        self.gateway.save_groups(&groups)?;

        info!(
            "event=group_create module=group status=ok group_id={} total_groups={}",
            group.id,
            groups.len()
        );
        Ok(group)
    }

    /// Removes one group and all notes referencing it.
    ///
    /// Both collections are staged in memory and committed together, so a
    /// storage failure leaves the previous state untouched.
    pub fn delete_group(&mut self, group_id: &str) -> Result<DeletedGroup, GroupServiceError> {
        let mut groups = self.gateway.load_groups()?;
        let Some(position) = groups.iter().position(|group| group.id == group_id) else {
            return Err(GroupServiceError::GroupNotFound(group_id.to_string()));
        };

        let notes = self.gateway.load_notes()?;
        let total_notes = notes.len();
        let remaining_notes = notes
            .into_iter()
            .filter(|note| note.group_id != group_id)
            .collect::<Vec<_>>();
        let removed_notes = total_notes - remaining_notes.len();
        let group = groups.remove(position);

        self.gateway.save_collections(&groups, &remaining_notes)?;

        info!(
            "event=group_delete module=group status=ok group_id={} removed_notes={}",
            group.id, removed_notes
        );
        Ok(DeletedGroup {
            group,
            removed_notes,
        })
    }

    /// Lists all groups in insertion order.
    pub fn list_groups(&self) -> Result<Vec<Group>, GroupServiceError> {
        Ok(self.gateway.load_groups()?)
    }

    /// Gets one group by id.
    pub fn get_group(&self, group_id: &str) -> Result<Option<Group>, GroupServiceError> {
        Ok(self
            .gateway
            .load_groups()?
            .into_iter()
            .find(|group| group.id == group_id))
    }
}
