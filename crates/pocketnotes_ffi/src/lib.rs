//! Flutter-facing bridge over `pocketnotes_core`.

pub mod api;
