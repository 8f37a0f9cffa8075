//! Pure view projection over stored collections.
//!
//! # Invariants
//! - View notes belong to the active group only.
//! - Order is `updated_at DESC`, ties kept in collection order.
//! - Missing `group_color` is backfilled from the active group.

use crate::model::group::Group;
use crate::model::note::Note;
use std::cmp::Ordering;

/// View-ready state derived from groups, notes and the active selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Currently selected group, if any.
    pub active_group: Option<Group>,
    /// Enriched notes of the active group, most recently updated first.
    pub notes: Vec<Note>,
}

/// Derives the view for `active_id`.
///
/// An unknown or absent `active_id` yields no active group and no notes.
pub fn project_view(groups: &[Group], notes: &[Note], active_id: Option<&str>) -> ViewState {
    let Some(active_group) =
        active_id.and_then(|id| groups.iter().find(|group| group.id == id))
    else {
        return ViewState::default();
    };

    let mut view = notes
        .iter()
        .filter(|note| note.group_id == active_group.id)
        .cloned()
        .map(|mut note| {
            note.backfill_group_color(active_group);
            note
        })
        .collect::<Vec<_>>();
    // `sort_by` is stable, which keeps collection order among equal timestamps.
    view.sort_by(newest_first);

    ViewState {
        active_group: Some(active_group.clone()),
        notes: view,
    }
}

/// Orders notes by `updated_at` descending.
pub fn newest_first(left: &Note, right: &Note) -> Ordering {
    right.updated_at.cmp(&left.updated_at)
}
