use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `attachments` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attachment {
    pub id: DbId,
    pub board_id: DbId,
    pub card_id: DbId,
    pub user_id: Option<DbId>,
    pub name: String,
    /// Source URL for imported attachments.
    pub url: Option<String>,
    pub file_path: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

/// DTO for creating an attachment record (the file bytes are already on
/// disk at `file_path`).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAttachment {
    pub board_id: DbId,
    pub card_id: DbId,
    pub user_id: Option<DbId>,
    pub name: String,
    pub url: Option<String>,
    pub file_path: String,
    pub size_bytes: i64,
}
