//! Repository for board labels.

use kanban_core::types::DbId;
use sqlx::PgPool;

use crate::models::label::{BoardLabel, CreateLabel};

/// Column list for `board_labels`.
const LABEL_COLUMNS: &str = "id, board_id, name, color, created_at";

/// Provides CRUD operations for board labels.
pub struct LabelRepo;

impl LabelRepo {
    /// Create a label on a board.
    pub async fn create(pool: &PgPool, input: &CreateLabel) -> Result<BoardLabel, sqlx::Error> {
        let sql = format!(
            "INSERT INTO board_labels (board_id, name, color) \
             VALUES ($1, $2, $3) \
             RETURNING {LABEL_COLUMNS}"
        );
        sqlx::query_as::<_, BoardLabel>(&sql)
            .bind(input.board_id)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Find a board's label with a matching name and color. Used by the
    /// single-card import path to reuse existing labels.
    pub async fn find_by_name_color(
        pool: &PgPool,
        board_id: DbId,
        name: &str,
        color: &str,
    ) -> Result<Option<BoardLabel>, sqlx::Error> {
        let sql = format!(
            "SELECT {LABEL_COLUMNS} FROM board_labels \
             WHERE board_id = $1 AND name = $2 AND color = $3 \
             LIMIT 1"
        );
        sqlx::query_as::<_, BoardLabel>(&sql)
            .bind(board_id)
            .bind(name)
            .bind(color)
            .fetch_optional(pool)
            .await
    }

    /// List a board's labels in creation order.
    pub async fn list_by_board(
        pool: &PgPool,
        board_id: DbId,
    ) -> Result<Vec<BoardLabel>, sqlx::Error> {
        let sql = format!("SELECT {LABEL_COLUMNS} FROM board_labels WHERE board_id = $1 ORDER BY id");
        sqlx::query_as::<_, BoardLabel>(&sql)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }
}
