//! Group domain model.
//!
//! # Responsibility
//! - Define the named, colored container that owns notes.
//! - Provide name normalization and the default color palette.
//!
//! # Invariants
//! - `id` is stable and never reused for another group.
//! - `name` is stored trimmed and is unique case-insensitively.
//! - `color` is chosen at creation and never changes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a group.
///
/// Kept as opaque text so records created by older clients (non-UUID ids)
/// keep loading unchanged.
pub type GroupId = String;

/// Minimum group name length in characters, measured after trim.
pub const GROUP_NAME_MIN_CHARS: usize = 2;

/// Default color tokens offered for new groups.
pub const DEFAULT_GROUP_PALETTE: [&str; 8] = [
    "#0369A1", // blue
    "#15803D", // green
    "#B91C1C", // red
    "#7E22CE", // purple
    "#C2410C", // orange
    "#4338CA", // indigo
    "#BE185D", // pink
    "#B45309", // amber
];

/// Named, colored collection of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Opaque unique id assigned at creation.
    pub id: GroupId,
    /// Display name, trimmed.
    pub name: String,
    /// Opaque display token, immutable after creation.
    pub color: String,
}

/// Reasons a group name is rejected before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupNameError {
    /// Name is blank after trim.
    Empty,
    /// Name is shorter than [`GROUP_NAME_MIN_CHARS`] after trim.
    TooShort,
}

impl Group {
    /// Creates a group with a freshly generated id.
    ///
    /// Does not validate `name`; callers go through `GroupService`.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Returns whether `other` collides with this group's name.
    pub fn name_matches(&self, other: &str) -> bool {
        names_collide(&self.name, other)
    }

    /// Avatar label: first two characters of the name, uppercased.
    pub fn initials(&self) -> String {
        self.name.chars().take(2).collect::<String>().to_uppercase()
    }
}

/// Trims a raw group name and enforces emptiness/length rules.
pub fn normalize_group_name(raw: &str) -> Result<String, GroupNameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GroupNameError::Empty);
    }
    if trimmed.chars().count() < GROUP_NAME_MIN_CHARS {
        return Err(GroupNameError::TooShort);
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive name comparison used for uniqueness checks.
pub fn names_collide(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Picks one color uniformly from `palette`.
///
/// Returns `None` when the palette is empty.
pub fn random_group_color<S: AsRef<str>>(palette: &[S]) -> Option<String> {
    if palette.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..palette.len());
    Some(palette[index].as_ref().to_string())
}
