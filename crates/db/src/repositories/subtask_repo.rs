//! Repository for card subtasks.

use kanban_core::types::DbId;
use sqlx::PgPool;

use crate::models::subtask::{CreateSubtask, Subtask, UpdateSubtask};

/// Column list for `subtasks`.
const SUBTASK_COLUMNS: &str = "id, card_id, title, sort, is_finished, finished_at, created_at";

/// Provides CRUD operations for subtasks.
pub struct SubtaskRepo;

impl SubtaskRepo {
    /// Create a subtask on a card.
    pub async fn create(
        pool: &PgPool,
        card_id: DbId,
        input: &CreateSubtask,
    ) -> Result<Subtask, sqlx::Error> {
        let sql = format!(
            "INSERT INTO subtasks (card_id, title, sort) \
             VALUES ($1, $2, $3) \
             RETURNING {SUBTASK_COLUMNS}"
        );
        sqlx::query_as::<_, Subtask>(&sql)
            .bind(card_id)
            .bind(&input.title)
            .bind(input.sort)
            .fetch_one(pool)
            .await
    }

    /// List a card's subtasks by sort position.
    pub async fn list_by_card(pool: &PgPool, card_id: DbId) -> Result<Vec<Subtask>, sqlx::Error> {
        let sql = format!("SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE card_id = $1 ORDER BY sort, id");
        sqlx::query_as::<_, Subtask>(&sql)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }

    /// Update a subtask. Finishing stamps `finished_at`; un-finishing
    /// clears it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubtask,
    ) -> Result<Option<Subtask>, sqlx::Error> {
        let sql = format!(
            "UPDATE subtasks SET \
                title = COALESCE($2, title), \
                sort = COALESCE($3, sort), \
                is_finished = COALESCE($4, is_finished), \
                finished_at = CASE \
                    WHEN $4 IS TRUE THEN now() \
                    WHEN $4 IS FALSE THEN NULL \
                    ELSE finished_at \
                END \
             WHERE id = $1 \
             RETURNING {SUBTASK_COLUMNS}"
        );
        sqlx::query_as::<_, Subtask>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(input.sort)
            .bind(input.is_finished)
            .fetch_optional(pool)
            .await
    }

    /// Delete a subtask. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
