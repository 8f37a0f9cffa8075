//! Persistence gateway abstractions and storage implementations.
//!
//! # Responsibility
//! - Define the whole-collection load/save contract used by services.
//! - Isolate SQLite and JSON payload details from business orchestration.
//!
//! # Invariants
//! - Gateway reads never mask corrupted payloads as empty collections.
//! - Gateway writes are transactional; no partial write is observable.

pub mod gateway;
