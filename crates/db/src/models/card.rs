use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cards` table.
///
/// `label_ids` elements are nullable: an imported card keeps a `None`
/// slot for each foreign label reference that had no local mapping, so
/// the array shape matches the foreign card's.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Card {
    pub id: DbId,
    pub board_id: DbId,
    pub list_id: DbId,
    pub title: String,
    pub description: String,
    pub sort: f64,
    pub archived: bool,
    pub label_ids: Vec<Option<DbId>>,
    pub member_ids: Vec<DbId>,
    pub cover_attachment_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub date_last_activity: Timestamp,
}

/// DTO for creating a card. Imports pass a backdated `created_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCard {
    pub board_id: DbId,
    pub list_id: DbId,
    pub title: String,
    pub description: String,
    pub sort: f64,
    pub archived: bool,
    pub label_ids: Vec<Option<DbId>>,
    pub member_ids: Vec<DbId>,
    pub user_id: Option<DbId>,
    pub created_at: Option<Timestamp>,
}
