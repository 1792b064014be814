//! Repository for card attachments.

use kanban_core::types::DbId;
use sqlx::PgPool;

use crate::models::attachment::{Attachment, CreateAttachment};

/// Column list for `attachments`.
const ATTACHMENT_COLUMNS: &str =
    "id, board_id, card_id, user_id, name, url, file_path, size_bytes, created_at";

/// Provides CRUD operations for attachments.
pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Record an attachment whose bytes are already stored on disk.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAttachment,
    ) -> Result<Attachment, sqlx::Error> {
        let sql = format!(
            "INSERT INTO attachments \
                (board_id, card_id, user_id, name, url, file_path, size_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ATTACHMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Attachment>(&sql)
            .bind(input.board_id)
            .bind(input.card_id)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.url)
            .bind(&input.file_path)
            .bind(input.size_bytes)
            .fetch_one(pool)
            .await
    }

    /// List a card's attachments in creation order.
    pub async fn list_by_card(
        pool: &PgPool,
        card_id: DbId,
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let sql =
            format!("SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE card_id = $1 ORDER BY id");
        sqlx::query_as::<_, Attachment>(&sql)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }
}
