use kanban_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the append-only `activities` table.
///
/// Exactly one of `list_id`/`card_id`/`comment_id` is set depending on
/// which entity the record documents; `source` carries import
/// provenance for top-level imported entities.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Activity {
    pub id: DbId,
    pub activity_type: String,
    pub user_id: Option<DbId>,
    pub board_id: DbId,
    pub list_id: Option<DbId>,
    pub card_id: Option<DbId>,
    pub comment_id: Option<DbId>,
    pub source: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for appending an activity record.
#[derive(Debug, Clone, Default)]
pub struct CreateActivity {
    pub activity_type: String,
    pub user_id: Option<DbId>,
    pub board_id: DbId,
    pub list_id: Option<DbId>,
    pub card_id: Option<DbId>,
    pub comment_id: Option<DbId>,
    pub source: Option<serde_json::Value>,
    /// Backdated for imported entities; `None` means now.
    pub created_at: Option<Timestamp>,
}
