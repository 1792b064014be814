//! Domain logic for the kanban backend.
//!
//! This crate has no database, async, or I/O dependencies. It holds the
//! shared id/timestamp types, the domain error type, activity kind
//! constants, the board slug generator, and the whole pure half of the
//! Trello import translator (schema validation, action-log replay, and
//! foreign-to-local identity mapping).

pub mod activity;
pub mod error;
pub mod slug;
pub mod trello;
pub mod types;
