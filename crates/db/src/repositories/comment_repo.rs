//! Repository for card comments.

use kanban_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};

/// Column list for `card_comments`.
const COMMENT_COLUMNS: &str = "id, board_id, card_id, user_id, text, created_at";

/// Provides CRUD operations for card comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Create a comment. A `None` creation time means now; imported
    /// comments are backdated to the foreign comment's date.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let sql = format!(
            "INSERT INTO card_comments (board_id, card_id, user_id, text, created_at) \
             VALUES ($1, $2, $3, $4, COALESCE($5, now())) \
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(input.board_id)
            .bind(input.card_id)
            .bind(input.user_id)
            .bind(&input.text)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// List a card's comments in chronological order. Insertion id
    /// breaks ties so replayed comments keep their log order.
    pub async fn list_by_card(pool: &PgPool, card_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM card_comments \
             WHERE card_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }

    /// List all comments on a board (used by export).
    pub async fn list_by_board(pool: &PgPool, board_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM card_comments \
             WHERE board_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }
}
