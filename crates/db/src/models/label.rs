use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `board_labels` table. Labels are owned by one board
/// and referenced by id from cards on the same board.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoardLabel {
    pub id: DbId,
    pub board_id: DbId,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
}

/// DTO for creating a board label.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLabel {
    pub board_id: DbId,
    pub name: String,
    pub color: String,
}
