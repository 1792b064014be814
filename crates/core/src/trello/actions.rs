//! Single-pass replay of the Trello action log.
//!
//! The export's action log is the only place creation dates and
//! comment/attachment associations live, so we scan it exactly once and
//! index what the materializer needs by foreign id. Dispatch is over a
//! closed [`ActionKind`] enum; everything the translator does not
//! understand parses to [`ActionKind::Unrecognized`] and is ignored.

use std::collections::HashMap;

use serde_json::Value;

use crate::trello::schema::parse_date;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// The action kinds the translator consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    CreateBoard {
        date: Timestamp,
    },
    CreateList {
        list_id: String,
        date: Timestamp,
    },
    CreateCard {
        card_id: String,
        date: Timestamp,
    },
    CommentCard {
        card_id: String,
        text: String,
        date: Timestamp,
    },
    AddAttachmentToCard {
        card_id: String,
        attachment_id: String,
        /// Absent when the attachment was later deleted in Trello; the
        /// log still reports the historical add.
        url: Option<String>,
        name: Option<String>,
    },
    /// Any action type the translator does not consume, or a consumed
    /// type whose payload is missing the fields we need.
    Unrecognized,
}

impl ActionKind {
    /// Parse one raw action object.
    ///
    /// The envelope (`data`, `date`, `type`) has already been validated;
    /// payloads missing type-specific fields degrade to `Unrecognized`
    /// rather than failing the whole import.
    pub fn parse(action: &Value) -> Self {
        let Some(date) = action
            .get("date")
            .and_then(Value::as_str)
            .and_then(parse_date)
        else {
            return Self::Unrecognized;
        };
        let data = &action["data"];

        match action.get("type").and_then(Value::as_str) {
            Some("createBoard") => Self::CreateBoard { date },
            Some("createList") => match data_id(data, "list") {
                Some(list_id) => Self::CreateList { list_id, date },
                None => Self::Unrecognized,
            },
            Some("createCard") => match data_id(data, "card") {
                Some(card_id) => Self::CreateCard { card_id, date },
                None => Self::Unrecognized,
            },
            Some("commentCard") => {
                let text = data.get("text").and_then(Value::as_str);
                match (data_id(data, "card"), text) {
                    (Some(card_id), Some(text)) => Self::CommentCard {
                        card_id,
                        text: text.to_string(),
                        date,
                    },
                    _ => Self::Unrecognized,
                }
            }
            Some("addAttachmentToCard") => {
                let attachment = &data["attachment"];
                let attachment_id = attachment.get("id").and_then(Value::as_str);
                match (data_id(data, "card"), attachment_id) {
                    (Some(card_id), Some(attachment_id)) => Self::AddAttachmentToCard {
                        card_id,
                        attachment_id: attachment_id.to_string(),
                        url: attachment
                            .get("url")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        name: attachment
                            .get("name")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    },
                    _ => Self::Unrecognized,
                }
            }
            _ => Self::Unrecognized,
        }
    }
}

fn data_id(data: &Value, entity: &str) -> Option<String> {
    data.get(entity)?
        .get("id")?
        .as_str()
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Pending records
// ---------------------------------------------------------------------------

/// A comment waiting for its card to materialize. Kept in log order.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingComment {
    pub text: String,
    pub date: Timestamp,
}

/// An attachment waiting for its card to materialize.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAttachment {
    /// Foreign attachment id, matched against the card's cover id.
    pub id: String,
    pub url: String,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// ActionDigest
// ---------------------------------------------------------------------------

/// Everything one forward pass over the action log yields: creation
/// timestamps per foreign id, and per-card pending comments and
/// attachments in log order.
#[derive(Debug, Default)]
pub struct ActionDigest {
    pub board_created_at: Option<Timestamp>,
    pub list_created_at: HashMap<String, Timestamp>,
    pub card_created_at: HashMap<String, Timestamp>,
    pub comments: HashMap<String, Vec<PendingComment>>,
    pub attachments: HashMap<String, Vec<PendingAttachment>>,
}

impl ActionDigest {
    /// Replay the raw action log. An empty log yields an empty digest;
    /// downstream falls back to "now" timestamps.
    pub fn replay(actions: &[Value]) -> Self {
        let mut digest = Self::default();

        for action in actions {
            match ActionKind::parse(action) {
                // Well-formed exports have exactly one createBoard;
                // last write wins if they do not.
                ActionKind::CreateBoard { date } => digest.board_created_at = Some(date),
                ActionKind::CreateList { list_id, date } => {
                    digest.list_created_at.insert(list_id, date);
                }
                ActionKind::CreateCard { card_id, date } => {
                    digest.card_created_at.insert(card_id, date);
                }
                ActionKind::CommentCard {
                    card_id,
                    text,
                    date,
                } => {
                    digest
                        .comments
                        .entry(card_id)
                        .or_default()
                        .push(PendingComment { text, date });
                }
                ActionKind::AddAttachmentToCard {
                    card_id,
                    attachment_id,
                    url,
                    name,
                } => {
                    // No url means the attachment no longer exists; skip it.
                    if let Some(url) = url {
                        digest.attachments.entry(card_id).or_default().push(
                            PendingAttachment {
                                id: attachment_id,
                                url,
                                name,
                            },
                        );
                    }
                }
                ActionKind::Unrecognized => {}
            }
        }

        digest
    }

    /// Creation time recorded for a foreign list id, if any.
    pub fn list_created_at(&self, foreign_id: &str) -> Option<Timestamp> {
        self.list_created_at.get(foreign_id).copied()
    }

    /// Creation time recorded for a foreign card id, if any.
    pub fn card_created_at(&self, foreign_id: &str) -> Option<Timestamp> {
        self.card_created_at.get(foreign_id).copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(kind: &str, date: &str, data: Value) -> Value {
        json!({ "type": kind, "date": date, "data": data })
    }

    #[test]
    fn empty_log_yields_empty_digest() {
        let digest = ActionDigest::replay(&[]);
        assert!(digest.board_created_at.is_none());
        assert!(digest.card_created_at.is_empty());
        assert!(digest.comments.is_empty());
    }

    #[test]
    fn create_actions_record_dates() {
        let log = [
            action("createBoard", "2018-03-01T08:00:00.000Z", json!({})),
            action(
                "createList",
                "2018-03-02T08:00:00.000Z",
                json!({ "list": { "id": "L1" } }),
            ),
            action(
                "createCard",
                "2020-01-01T00:00:00.000Z",
                json!({ "card": { "id": "C1" } }),
            ),
        ];
        let digest = ActionDigest::replay(&log);

        assert_eq!(
            digest.board_created_at,
            parse_date("2018-03-01T08:00:00.000Z")
        );
        assert_eq!(
            digest.list_created_at("L1"),
            parse_date("2018-03-02T08:00:00.000Z")
        );
        assert_eq!(
            digest.card_created_at("C1"),
            parse_date("2020-01-01T00:00:00.000Z")
        );
        assert_eq!(digest.card_created_at("C2"), None);
    }

    #[test]
    fn duplicate_create_board_last_write_wins() {
        let log = [
            action("createBoard", "2018-01-01T00:00:00.000Z", json!({})),
            action("createBoard", "2019-01-01T00:00:00.000Z", json!({})),
        ];
        let digest = ActionDigest::replay(&log);
        assert_eq!(
            digest.board_created_at,
            parse_date("2019-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn comments_preserve_log_order() {
        let log = [
            action(
                "commentCard",
                "2020-01-01T10:00:00.000Z",
                json!({ "card": { "id": "C1" }, "text": "first" }),
            ),
            action(
                "commentCard",
                "2020-01-02T10:00:00.000Z",
                json!({ "card": { "id": "C1" }, "text": "second" }),
            ),
        ];
        let digest = ActionDigest::replay(&log);
        let comments = &digest.comments["C1"];
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "first");
        assert_eq!(comments[1].text, "second");
        assert!(comments[0].date < comments[1].date);
    }

    #[test]
    fn attachment_without_url_is_skipped() {
        let log = [
            action(
                "addAttachmentToCard",
                "2020-01-01T10:00:00.000Z",
                json!({
                    "card": { "id": "C1" },
                    "attachment": { "id": "A1", "name": "deleted-later.png" },
                }),
            ),
            action(
                "addAttachmentToCard",
                "2020-01-01T11:00:00.000Z",
                json!({
                    "card": { "id": "C1" },
                    "attachment": {
                        "id": "A2",
                        "name": "kept.png",
                        "url": "https://example.com/kept.png",
                    },
                }),
            ),
        ];
        let digest = ActionDigest::replay(&log);
        let attachments = &digest.attachments["C1"];
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].id, "A2");
        assert_eq!(attachments[0].url, "https://example.com/kept.png");
    }

    #[test]
    fn unrecognized_types_are_ignored() {
        let log = [
            action("updateCard", "2020-01-01T10:00:00.000Z", json!({})),
            action("addMemberToBoard", "2020-01-01T10:00:00.000Z", json!({})),
        ];
        let digest = ActionDigest::replay(&log);
        assert!(digest.board_created_at.is_none());
        assert!(digest.comments.is_empty());
        assert!(digest.attachments.is_empty());
    }

    #[test]
    fn malformed_payload_degrades_to_unrecognized() {
        // createCard with no card id in data.
        let kind = ActionKind::parse(&action(
            "createCard",
            "2020-01-01T10:00:00.000Z",
            json!({}),
        ));
        assert_eq!(kind, ActionKind::Unrecognized);
    }
}
