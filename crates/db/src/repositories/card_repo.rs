//! Repository for cards.

use kanban_core::types::DbId;
use sqlx::PgPool;

use crate::models::card::{Card, CreateCard};

/// Column list for `cards`.
const CARD_COLUMNS: &str =
    "id, board_id, list_id, title, description, sort, archived, label_ids, \
     member_ids, cover_attachment_id, user_id, created_at, date_last_activity";

/// Provides CRUD operations for cards.
pub struct CardRepo;

impl CardRepo {
    /// Create a card. A `None` creation time means now; `date_last_activity`
    /// always starts at now.
    pub async fn create(pool: &PgPool, input: &CreateCard) -> Result<Card, sqlx::Error> {
        let sql = format!(
            "INSERT INTO cards \
                (board_id, list_id, title, description, sort, archived, \
                 label_ids, member_ids, user_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, now())) \
             RETURNING {CARD_COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&sql)
            .bind(input.board_id)
            .bind(input.list_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.sort)
            .bind(input.archived)
            .bind(&input.label_ids)
            .bind(&input.member_ids)
            .bind(input.user_id)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a card by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Card>, sqlx::Error> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1");
        sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a list's cards by sort position.
    pub async fn list_by_list(pool: &PgPool, list_id: DbId) -> Result<Vec<Card>, sqlx::Error> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE list_id = $1 ORDER BY sort, id");
        sqlx::query_as::<_, Card>(&sql)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    /// List all cards on a board.
    pub async fn list_by_board(pool: &PgPool, board_id: DbId) -> Result<Vec<Card>, sqlx::Error> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE board_id = $1 ORDER BY id");
        sqlx::query_as::<_, Card>(&sql)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    /// Promote an attachment to the card's cover.
    pub async fn set_cover(
        pool: &PgPool,
        id: DbId,
        attachment_id: DbId,
    ) -> Result<Option<Card>, sqlx::Error> {
        let sql = format!(
            "UPDATE cards SET cover_attachment_id = $2 WHERE id = $1 RETURNING {CARD_COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .bind(attachment_id)
            .fetch_optional(pool)
            .await
    }

    /// Archive or unarchive a card.
    pub async fn set_archived(
        pool: &PgPool,
        id: DbId,
        archived: bool,
    ) -> Result<Option<Card>, sqlx::Error> {
        let sql = format!(
            "UPDATE cards SET archived = $2, date_last_activity = now() \
             WHERE id = $1 RETURNING {CARD_COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .bind(archived)
            .fetch_optional(pool)
            .await
    }
}
