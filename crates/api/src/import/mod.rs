//! Import pipelines for foreign board data.
//!
//! Each supported source system gets its own submodule. The pipeline
//! shape is shared: validate the untrusted payload, replay its activity
//! log into a digest, then materialize local entities oldest-first so
//! every foreign reference resolves through the identity maps.

pub mod trello;
