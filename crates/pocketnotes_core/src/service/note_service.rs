//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/edit/delete/list APIs over the stored collection.
//! - Stamp `created_at`/`updated_at` from the injected clock.
//!
//! # Invariants
//! - Content is trimmed and never persisted empty, on create and on edit.
//! - `create_note` trusts `group_id`; callers only pass the active group.
//! - Listing keeps collection order; sorting belongs to the coordinator.

use crate::model::clock::Clock;
use crate::model::note::{normalize_note_content, Note, NoteId};
use crate::repo::gateway::{PersistenceGateway, StorageError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Content is blank after trim.
    EmptyContent,
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    StorageUnavailable(StorageError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content must not be blank"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for NoteServiceError {
    fn from(value: StorageError) -> Self {
        Self::StorageUnavailable(value)
    }
}

/// Note service facade over a persistence gateway.
pub struct NoteService<'g, G: PersistenceGateway> {
    gateway: &'g mut G,
    clock: &'g dyn Clock,
}

impl<'g, G: PersistenceGateway> NoteService<'g, G> {
    /// Creates a service borrowing the gateway and time source.
    pub fn new(gateway: &'g mut G, clock: &'g dyn Clock) -> Self {
        Self { gateway, clock }
    }

    /// Creates one note and appends it to the stored collection.
    ///
    /// `group_color` is cached on the note for rendering only.
    pub fn create_note(
        &mut self,
        group_id: &str,
        content: &str,
        group_color: Option<&str>,
    ) -> Result<Note, NoteServiceError> {
        let content = normalize_note_content(content).ok_or(NoteServiceError::EmptyContent)?;

        let mut notes = self.gateway.load_notes()?;
        let note = Note::new(
            group_id,
            content,
            group_color.map(str::to_string),
            self.clock.now(),
        );
        notes.push(note.clone());
        self.gateway.save_notes(&notes)?;

        info!(
            "event=note_create module=note status=ok note_id={} group_id={}",
            note.id, note.group_id
        );
        Ok(note)
    }

    /// Replaces note content and advances `updated_at`.
    ///
    /// Nothing is written when the content is blank or the note is missing.
    pub fn edit_note(&mut self, note_id: &str, content: &str) -> Result<Note, NoteServiceError> {
        let content = normalize_note_content(content).ok_or(NoteServiceError::EmptyContent)?;

        let mut notes = self.gateway.load_notes()?;
        let note = notes
            .iter_mut()
            .find(|note| note.id == note_id)
            .ok_or_else(|| NoteServiceError::NoteNotFound(note_id.to_string()))?;
        note.apply_edit(content, self.clock.now());
        let edited = note.clone();
        self.gateway.save_notes(&notes)?;

        info!("event=note_edit module=note status=ok note_id={}", edited.id);
        Ok(edited)
    }

    /// Removes one note and returns it.
    pub fn delete_note(&mut self, note_id: &str) -> Result<Note, NoteServiceError> {
        let mut notes = self.gateway.load_notes()?;
        let position = notes
            .iter()
            .position(|note| note.id == note_id)
            .ok_or_else(|| NoteServiceError::NoteNotFound(note_id.to_string()))?;
        let removed = notes.remove(position);
        self.gateway.save_notes(&notes)?;

        info!("event=note_delete module=note status=ok note_id={}", removed.id);
        Ok(removed)
    }

    /// Lists notes of one group in collection order.
    pub fn list_notes_for_group(&self, group_id: &str) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self
            .gateway
            .load_notes()?
            .into_iter()
            .filter(|note| note.group_id == group_id)
            .collect())
    }

    /// Gets one note by id.
    pub fn get_note(&self, note_id: &str) -> Result<Option<Note>, NoteServiceError> {
        Ok(self
            .gateway
            .load_notes()?
            .into_iter()
            .find(|note| note.id == note_id))
    }
}
