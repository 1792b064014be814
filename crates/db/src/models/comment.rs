use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `card_comments` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub board_id: DbId,
    pub card_id: DbId,
    pub user_id: Option<DbId>,
    pub text: String,
    pub created_at: Timestamp,
}

/// DTO for creating a comment. Imported comments are backdated to the
/// foreign comment action's date.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub board_id: DbId,
    pub card_id: DbId,
    pub user_id: Option<DbId>,
    pub text: String,
    pub created_at: Option<Timestamp>,
}
