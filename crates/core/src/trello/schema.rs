//! Structural validation of Trello export payloads.
//!
//! The export is untrusted JSON. Before any entity is created we walk
//! the raw collections and verify the fields the translator relies on,
//! in a fixed order, aborting at the first failure. Validation is
//! non-mutating; the typed [`TrelloBoardExport`]/[`TrelloCard`] structs
//! are only deserialized after their collections have passed.
//!
//! A [`SchemaViolation`] names the offending collection, record index,
//! and field. That detail is for diagnostics (logs) only -- the HTTP
//! layer collapses it into a generic schema-error response so foreign
//! export internals never leak to end users.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::types::Timestamp;

/// Permission levels accepted on a Trello board.
pub const PERMISSION_LEVELS: &[&str] = &["org", "private", "public"];

// ---------------------------------------------------------------------------
// SchemaViolation
// ---------------------------------------------------------------------------

/// A structural validation failure, pointing at one field of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Which collection failed (`"actions"`, `"board"`, `"labels"`, ...).
    pub collection: &'static str,
    /// Index of the failing record, when the collection is an array.
    pub index: Option<usize>,
    /// Dotted path of the failing field (e.g. `"prefs.permissionLevel"`).
    pub field: String,
    /// What the field was expected to be.
    pub expected: &'static str,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(
                f,
                "schema violation in {}[{}]: field `{}` must be {}",
                self.collection, i, self.field, self.expected
            ),
            None => write!(
                f,
                "schema violation in {}: field `{}` must be {}",
                self.collection, self.field, self.expected
            ),
        }
    }
}

impl std::error::Error for SchemaViolation {}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn violation(
    collection: &'static str,
    index: Option<usize>,
    field: &str,
    expected: &'static str,
) -> SchemaViolation {
    SchemaViolation {
        collection,
        index,
        field: field.to_string(),
        expected,
    }
}

fn expect_bool(
    collection: &'static str,
    index: Option<usize>,
    obj: &Value,
    field: &str,
) -> Result<(), SchemaViolation> {
    match obj.get(field) {
        Some(Value::Bool(_)) => Ok(()),
        _ => Err(violation(collection, index, field, "a boolean")),
    }
}

fn expect_string(
    collection: &'static str,
    index: Option<usize>,
    obj: &Value,
    field: &str,
) -> Result<(), SchemaViolation> {
    match obj.get(field) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(violation(collection, index, field, "a string")),
    }
}

fn expect_number(
    collection: &'static str,
    index: Option<usize>,
    obj: &Value,
    field: &str,
) -> Result<(), SchemaViolation> {
    match obj.get(field) {
        Some(Value::Number(_)) => Ok(()),
        _ => Err(violation(collection, index, field, "a number")),
    }
}

fn expect_object(
    collection: &'static str,
    index: Option<usize>,
    obj: &Value,
    field: &str,
) -> Result<(), SchemaViolation> {
    match obj.get(field) {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(violation(collection, index, field, "an object")),
    }
}

fn expect_string_array(
    collection: &'static str,
    index: Option<usize>,
    obj: &Value,
    field: &str,
) -> Result<(), SchemaViolation> {
    match obj.get(field) {
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
        _ => Err(violation(collection, index, field, "an array of strings")),
    }
}

fn expect_date(
    collection: &'static str,
    index: Option<usize>,
    obj: &Value,
    field: &str,
) -> Result<(), SchemaViolation> {
    match obj.get(field) {
        Some(Value::String(s)) if parse_date(s).is_some() => Ok(()),
        _ => Err(violation(collection, index, field, "an ISO-8601 date string")),
    }
}

fn expect_array<'a>(
    collection: &'static str,
    value: &'a Value,
) -> Result<&'a [Value], SchemaViolation> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(violation(collection, None, "", "an array")),
    }
}

/// Parse a Trello ISO-8601 date string (RFC 3339 with milliseconds, e.g.
/// `2020-01-01T00:00:00.000Z`) into a UTC timestamp.
pub fn parse_date(s: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Collection validators
// ---------------------------------------------------------------------------

/// Validate the raw action log.
///
/// Only the envelope is checked here; unrecognized action types are
/// accepted and filtered semantically during replay.
pub fn check_actions(actions: &Value) -> Result<(), SchemaViolation> {
    let items = expect_array("actions", actions)?;
    for (i, action) in items.iter().enumerate() {
        expect_object("actions", Some(i), action, "data")?;
        expect_date("actions", Some(i), action, "date")?;
        expect_string("actions", Some(i), action, "type")?;
    }
    Ok(())
}

/// Validate the board record.
pub fn check_board(board: &Value) -> Result<(), SchemaViolation> {
    expect_bool("board", None, board, "closed")?;
    expect_string("board", None, board, "name")?;
    expect_object("board", None, board, "prefs")?;

    let prefs = &board["prefs"];
    expect_string("board", None, prefs, "background").map_err(|mut v| {
        v.field = "prefs.background".to_string();
        v
    })?;
    match prefs.get("permissionLevel") {
        Some(Value::String(level)) if PERMISSION_LEVELS.contains(&level.as_str()) => Ok(()),
        _ => Err(violation(
            "board",
            None,
            "prefs.permissionLevel",
            "one of org, private, public",
        )),
    }
}

/// Validate the label collection.
pub fn check_labels(labels: &Value) -> Result<(), SchemaViolation> {
    let items = expect_array("labels", labels)?;
    for (i, label) in items.iter().enumerate() {
        expect_string("labels", Some(i), label, "color")?;
        expect_string("labels", Some(i), label, "name")?;
    }
    Ok(())
}

/// Validate the list collection.
pub fn check_lists(lists: &Value) -> Result<(), SchemaViolation> {
    let items = expect_array("lists", lists)?;
    for (i, list) in items.iter().enumerate() {
        expect_bool("lists", Some(i), list, "closed")?;
        expect_string("lists", Some(i), list, "name")?;
    }
    Ok(())
}

/// Validate the card collection.
pub fn check_cards(cards: &Value) -> Result<(), SchemaViolation> {
    let items = expect_array("cards", cards)?;
    for (i, card) in items.iter().enumerate() {
        expect_bool("cards", Some(i), card, "closed")?;
        expect_date("cards", Some(i), card, "dateLastActivity")?;
        expect_string("cards", Some(i), card, "desc")?;
        expect_string_array("cards", Some(i), card, "idLabels")?;
        expect_string_array("cards", Some(i), card, "idMembers")?;
        expect_string("cards", Some(i), card, "name")?;
        expect_number("cards", Some(i), card, "pos")?;
    }
    Ok(())
}

///// Validate the options record of a single-card import: a target list
/// id (string), a numeric sort index, and an optional members mapping.
pub fn check_card_options(options: &Value) -> Result<(), SchemaViolation> {
    expect_string("options", None, options, "listId")?;
    expect_number("options", None, options, "sortIndex")?;
    if let Some(mapping) = options.get("membersMapping") {
        if !mapping.is_null() && !mapping.is_object() {
            return Err(violation("options", None, "membersMapping", "an object"));
        }
    }
    Ok(())
}

/// Validate the options record of a whole-board import.
pub fn check_board_options(options: &Value) -> Result<(), SchemaViolation> {
    if let Some(mapping) = options.get("membersMapping") {
        if !mapping.is_null() && !mapping.is_object() {
            return Err(violation("options", None, "membersMapping", "an object"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Typed export records
// ---------------------------------------------------------------------------

/// A whole-board Trello export, deserialized after validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloBoardExport {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub closed: bool,
    pub prefs: TrelloPrefs,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub memberships: Vec<TrelloMembership>,
    #[serde(default)]
    pub labels: Vec<TrelloLabel>,
    #[serde(default)]
    pub lists: Vec<TrelloList>,
    #[serde(default)]
    pub cards: Vec<TrelloCard>,
    /// Raw action log; replayed by [`super::actions::ActionDigest`].
    #[serde(default)]
    pub actions: Vec<Value>,
}

/// Board preferences subset the translator reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloPrefs {
    pub background: String,
    pub permission_level: String,
}

/// A board membership entry, referencing a foreign member id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloMembership {
    pub id_member: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrelloLabel {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrelloList {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub closed: bool,
}

/// A Trello card. On the single-card import path the card embeds its own
/// `labels` and `actions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloCard {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub desc: String,
    pub closed: bool,
    pub pos: f64,
    #[serde(default)]
    pub id_list: Option<String>,
    #[serde(default)]
    pub id_labels: Vec<String>,
    #[serde(default)]
    pub id_members: Vec<String>,
    #[serde(default)]
    pub id_attachment_cover: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub labels: Vec<TrelloLabel>,
    #[serde(default)]
    pub actions: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
