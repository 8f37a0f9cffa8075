//! Note domain model.
//!
//! # Responsibility
//! - Define the timestamped text entry owned by one group.
//! - Own the `group_color` backfill rule for records that predate the field.
//!
//! # Invariants
//! - `content` is non-empty after trim and stored trimmed.
//! - `created_at` never changes; `updated_at >= created_at`.
//! - `group_color` is a display cache only, never used for identity.

use crate::model::group::{Group, GroupId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = String;

/// Timestamp type shared by note fields.
pub type Timestamp = DateTime<Utc>;

/// Timestamped text entry belonging to exactly one group.
///
/// Serialized with the camelCase field names of the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Trimmed, non-empty text.
    pub content: String,
    /// Foreign key to the owning group.
    pub group_id: GroupId,
    /// Owning group's color at creation time. Missing on legacy records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Note {
    /// Creates a note with a fresh id and `created_at = updated_at = now`.
    ///
    /// Does not validate `content`; callers go through `NoteService`.
    pub fn new(
        group_id: impl Into<GroupId>,
        content: impl Into<String>,
        group_color: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            group_id: group_id.into(),
            group_color,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces content and advances `updated_at`.
    ///
    /// `updated_at` is clamped to `created_at` so a clock moving backwards
    /// cannot break the ordering invariant.
    pub fn apply_edit(&mut self, content: String, now: Timestamp) {
        self.content = content;
        self.updated_at = now.max(self.created_at);
    }

    /// Fills a missing `group_color` from the owning group.
    ///
    /// Returns whether a value was written. Existing values are kept even
    /// when they differ from the group, since the cache is informational.
    pub fn backfill_group_color(&mut self, group: &Group) -> bool {
        if self.group_color.is_some() || self.group_id != group.id {
            return false;
        }
        self.group_color = Some(group.color.clone());
        true
    }
}

/// Trims note content; `None` when nothing remains.
pub fn normalize_note_content(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_note_content, Note};
    use crate::model::group::Group;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn legacy_record_without_group_color_deserializes() {
        let raw = r#"{
            "id": "k3j2h1abc",
            "content": "buy milk",
            "groupId": "g1",
            "createdAt": "2024-03-01T10:15:30.123Z",
            "updatedAt": "2024-03-01T10:15:30.123Z"
        }"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.group_color, None);
        assert_eq!(note.group_id, "g1");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn serialization_uses_camel_case_and_omits_missing_color() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let note = Note::new("g1", "hello", None, now);
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("groupId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("groupColor").is_none());
    }

    #[test]
    fn apply_edit_never_moves_updated_at_before_created_at() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut note = Note::new("g1", "hello", None, created);
        note.apply_edit("rewritten".to_string(), created - Duration::seconds(30));
        assert_eq!(note.updated_at, created);
        assert_eq!(note.content, "rewritten");
    }

    #[test]
    fn backfill_only_fills_missing_color_for_owner() {
        let now = Utc::now();
        let owner = Group {
            id: "g1".to_string(),
            name: "Work".to_string(),
            color: "#15803D".to_string(),
        };
        let mut legacy = Note::new("g1", "x", None, now);
        assert!(legacy.backfill_group_color(&owner));
        assert_eq!(legacy.group_color.as_deref(), Some("#15803D"));

        let mut cached = Note::new("g1", "y", Some("#B91C1C".to_string()), now);
        assert!(!cached.backfill_group_color(&owner));
        assert_eq!(cached.group_color.as_deref(), Some("#B91C1C"));

        let mut foreign = Note::new("g2", "z", None, now);
        assert!(!foreign.backfill_group_color(&owner));
    }

    #[test]
    fn normalize_note_content_rejects_whitespace() {
        assert_eq!(normalize_note_content("  \n\t "), None);
        assert_eq!(normalize_note_content("  hi ").as_deref(), Some("hi"));
    }
}
