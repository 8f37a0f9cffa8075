//! Domain model for groups and notes.
//!
//! # Responsibility
//! - Define the two persisted entity shapes and their local helpers.
//! - Keep serialization naming aligned with the stored collection layout.
//!
//! # Invariants
//! - Every note references its owning group by id only.
//! - Timestamps are UTC and round-trip through RFC 3339 text exactly.

pub mod clock;
pub mod group;
pub mod note;
