//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway read-modify-write cycles into use-case APIs.
//! - Keep the coordinator and FFI layers decoupled from storage details.

pub mod group_service;
pub mod note_service;
