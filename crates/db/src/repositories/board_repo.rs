//! Repository for boards and board memberships.

use kanban_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::board::{Board, BoardMember, CreateBoard};

/// Column list for `boards`.
const BOARD_COLUMNS: &str =
    "id, title, slug, color, permission, archived, created_at, modified_at";

/// Column list for `board_members`.
const MEMBER_COLUMNS: &str = "board_id, user_id, is_admin, is_active, created_at";

/// Provides CRUD operations for boards.
pub struct BoardRepo;

impl BoardRepo {
    /// Create a board. A `None` creation time means now; imports pass
    /// the backdated foreign creation time.
    pub async fn create(pool: &PgPool, input: &CreateBoard) -> Result<Board, sqlx::Error> {
        let sql = format!(
            "INSERT INTO boards (title, slug, color, permission, archived, created_at) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, now())) \
             RETURNING {BOARD_COLUMNS}"
        );
        sqlx::query_as::<_, Board>(&sql)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.color)
            .bind(&input.permission)
            .bind(input.archived)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a board by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Board>, sqlx::Error> {
        let sql = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1");
        sqlx::query_as::<_, Board>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the boards a user is an active member of, most recently
    /// modified first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Board>, sqlx::Error> {
        let sql = format!(
            "SELECT b.{} FROM boards b \
             JOIN board_members m ON m.board_id = b.id \
             WHERE m.user_id = $1 AND m.is_active \
             ORDER BY b.modified_at DESC",
            BOARD_COLUMNS.replace(", ", ", b.")
        );
        sqlx::query_as::<_, Board>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Set the board's `modified_at` timestamp.
    pub async fn touch_modified_at(
        pool: &PgPool,
        id: DbId,
        modified_at: Timestamp,
    ) -> Result<Option<Board>, sqlx::Error> {
        let sql = format!(
            "UPDATE boards SET modified_at = $2 WHERE id = $1 RETURNING {BOARD_COLUMNS}"
        );
        sqlx::query_as::<_, Board>(&sql)
            .bind(id)
            .bind(modified_at)
            .fetch_optional(pool)
            .await
    }

    /// Archive or unarchive a board.
    pub async fn set_archived(
        pool: &PgPool,
        id: DbId,
        archived: bool,
    ) -> Result<Option<Board>, sqlx::Error> {
        let sql = format!(
            "UPDATE boards SET archived = $2, modified_at = now() \
             WHERE id = $1 RETURNING {BOARD_COLUMNS}"
        );
        sqlx::query_as::<_, Board>(&sql)
            .bind(id)
            .bind(archived)
            .fetch_optional(pool)
            .await
    }

    // ── Memberships ──────────────────────────────────────────────────

    /// Add a member to a board. Adding an existing member is a no-op.
    pub async fn add_member(
        pool: &PgPool,
        board_id: DbId,
        user_id: DbId,
        is_admin: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO board_members (board_id, user_id, is_admin) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (board_id, user_id) DO NOTHING",
        )
        .bind(board_id)
        .bind(user_id)
        .bind(is_admin)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether a user is an active member of a board.
    pub async fn is_member(
        pool: &PgPool,
        board_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
                SELECT 1 FROM board_members \
                WHERE board_id = $1 AND user_id = $2 AND is_active \
             )",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// List a board's memberships.
    pub async fn list_members(
        pool: &PgPool,
        board_id: DbId,
    ) -> Result<Vec<BoardMember>, sqlx::Error> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM board_members WHERE board_id = $1 ORDER BY user_id"
        );
        sqlx::query_as::<_, BoardMember>(&sql)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }
}
