//! Repository for the append-only activity log.

use kanban_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, CreateActivity};

/// Column list for `activities`.
const ACTIVITY_COLUMNS: &str =
    "id, activity_type, user_id, board_id, list_id, card_id, comment_id, source, created_at";

/// Append and query activity records. There are deliberately no update
/// or delete operations.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Append one activity record. A `None` creation time means now;
    /// import activities are backdated to the entity's own creation
    /// time where the translator says so.
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let sql = format!(
            "INSERT INTO activities \
                (activity_type, user_id, board_id, list_id, card_id, comment_id, source, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, now())) \
             RETURNING {ACTIVITY_COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&sql)
            .bind(&input.activity_type)
            .bind(input.user_id)
            .bind(input.board_id)
            .bind(input.list_id)
            .bind(input.card_id)
            .bind(input.comment_id)
            .bind(&input.source)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// List a board's activity feed, newest first.
    pub async fn list_by_board(
        pool: &PgPool,
        board_id: DbId,
        limit: i64,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities \
             WHERE board_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        );
        sqlx::query_as::<_, Activity>(&sql)
            .bind(board_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List a card's activity feed, oldest first.
    pub async fn list_by_card(pool: &PgPool, card_id: DbId) -> Result<Vec<Activity>, sqlx::Error> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities \
             WHERE card_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Activity>(&sql)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }

    /// List every activity on a board in insertion order (used by export).
    pub async fn list_all_by_board(
        pool: &PgPool,
        board_id: DbId,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE board_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, Activity>(&sql)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }
}
