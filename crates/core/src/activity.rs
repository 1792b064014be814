//! Activity kind constants and the provenance record attached to
//! imported entities.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the import materializer.

use serde::{Deserialize, Serialize};

/// Known activity kinds, as stored in `activities.activity_type`.
pub mod kinds {
    // Regular CRUD activities.
    pub const CREATE_BOARD: &str = "createBoard";
    pub const CREATE_LIST: &str = "createList";
    pub const CREATE_CARD: &str = "createCard";
    pub const ADD_COMMENT: &str = "addComment";
    pub const ADD_ATTACHMENT: &str = "addAttachment";

    // Import activities. One per materialized top-level entity.
    pub const IMPORT_BOARD: &str = "importBoard";
    pub const IMPORT_LIST: &str = "importList";
    pub const IMPORT_CARD: &str = "importCard";
}

/// Provenance of an imported entity: which foreign record it came from.
///
/// Stored as jsonb on the activity record of top-level imported entities
/// (board, list, card). Imported comments carry no provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// The entity's id in the foreign system.
    pub id: String,
    /// Name of the foreign system (e.g. `"Trello"`).
    pub system: String,
    /// URL of the foreign entity, when the export carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_without_null_url() {
        let source = Source {
            id: "abc123".to_string(),
            system: "Trello".to_string(),
            url: None,
        };
        let json = serde_json::to_value(&source).unwrap();
        assert!(json.get("url").is_none());
    }

    #[test]
    fn source_round_trips() {
        let source = Source {
            id: "abc123".to_string(),
            system: "Trello".to_string(),
            url: Some("https://trello.com/b/abc123".to_string()),
        };
        let json = serde_json::to_value(&source).unwrap();
        let back: Source = serde_json::from_value(json).unwrap();
        assert_eq!(back, source);
    }
}
