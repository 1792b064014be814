use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `boards` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Board {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub color: String,
    /// `public` or `private`.
    pub permission: String,
    pub archived: bool,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

/// DTO for creating a board.
///
/// `created_at` is `None` for regular creation; imports pass the
/// backdated foreign creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoard {
    pub title: String,
    pub slug: String,
    pub color: String,
    pub permission: String,
    pub archived: bool,
    pub created_at: Option<Timestamp>,
}

/// A row from the `board_members` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoardMember {
    pub board_id: DbId,
    pub user_id: DbId,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
}
