use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lists` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct List {
    pub id: DbId,
    pub board_id: DbId,
    pub title: String,
    pub archived: bool,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a list. Imports pass a backdated `created_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateList {
    pub board_id: DbId,
    pub title: String,
    pub archived: bool,
    pub user_id: Option<DbId>,
    pub created_at: Option<Timestamp>,
}
