//! Repository for lists.

use kanban_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::list::{CreateList, List};

/// Column list for `lists`.
const LIST_COLUMNS: &str = "id, board_id, title, archived, user_id, created_at, updated_at";

/// Provides CRUD operations for lists.
pub struct ListRepo;

impl ListRepo {
    /// Create a list. A `None` creation time means now.
    pub async fn create(pool: &PgPool, input: &CreateList) -> Result<List, sqlx::Error> {
        let sql = format!(
            "INSERT INTO lists (board_id, title, archived, user_id, created_at) \
             VALUES ($1, $2, $3, $4, COALESCE($5, now())) \
             RETURNING {LIST_COLUMNS}"
        );
        sqlx::query_as::<_, List>(&sql)
            .bind(input.board_id)
            .bind(&input.title)
            .bind(input.archived)
            .bind(input.user_id)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a list by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<List>, sqlx::Error> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = $1");
        sqlx::query_as::<_, List>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a board's lists in creation order.
    pub async fn list_by_board(pool: &PgPool, board_id: DbId) -> Result<Vec<List>, sqlx::Error> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM lists WHERE board_id = $1 ORDER BY id");
        sqlx::query_as::<_, List>(&sql)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    /// Set a list's `updated_at` timestamp.
    pub async fn touch_updated_at(
        pool: &PgPool,
        id: DbId,
        updated_at: Timestamp,
    ) -> Result<Option<List>, sqlx::Error> {
        let sql =
            format!("UPDATE lists SET updated_at = $2 WHERE id = $1 RETURNING {LIST_COLUMNS}");
        sqlx::query_as::<_, List>(&sql)
            .bind(id)
            .bind(updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Archive or unarchive a list.
    pub async fn set_archived(
        pool: &PgPool,
        id: DbId,
        archived: bool,
    ) -> Result<Option<List>, sqlx::Error> {
        let sql = format!(
            "UPDATE lists SET archived = $2, updated_at = now() \
             WHERE id = $1 RETURNING {LIST_COLUMNS}"
        );
        sqlx::query_as::<_, List>(&sql)
            .bind(id)
            .bind(archived)
            .fetch_optional(pool)
            .await
    }
}
