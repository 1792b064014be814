//! Entity materializer for Trello exports.
//!
//! [`TrelloImporter`] drives one import run: it validates the raw
//! payload, replays the export's action log into an
//! [`ActionDigest`], then creates local rows oldest-entity-first
//! (board, labels, lists, cards, then per-card comments and
//! attachments) so that by the time a record is inserted every foreign
//! id it references already has a local counterpart in the
//! [`IdentityMaps`].
//!
//! Imports are not idempotent: re-importing the same export creates a
//! second, fully independent copy. There is no rollback either; a
//! mid-run failure (for example an attachment download error) leaves
//! the entities created so far in place.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use kanban_core::activity::{kinds, Source};
use kanban_core::error::CoreError;
use kanban_core::slug::slugify;
use kanban_core::trello::actions::{ActionDigest, PendingAttachment};
use kanban_core::trello::identity::IdentityMaps;
use kanban_core::trello::schema::{self, TrelloBoardExport, TrelloCard, TrelloLabel, TrelloList};
use kanban_core::trello::{board_color, board_permission, SYSTEM_NAME};
use kanban_core::types::DbId;
use kanban_db::models::activity::CreateActivity;
use kanban_db::models::attachment::CreateAttachment;
use kanban_db::models::board::{Board, CreateBoard};
use kanban_db::models::card::{Card, CreateCard};
use kanban_db::models::comment::CreateComment;
use kanban_db::models::label::CreateLabel;
use kanban_db::models::list::CreateList;
use kanban_db::repositories::{
    ActivityRepo, AttachmentRepo, BoardRepo, CardRepo, CommentRepo, LabelRepo, ListRepo,
};
use kanban_db::DbPool;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// One Trello import run, owned by the importing user.
///
/// Construct a fresh importer per request; the identity maps and action
/// digest accumulate state that must not leak across runs.
pub struct TrelloImporter<'a> {
    pool: &'a DbPool,
    http: &'a reqwest::Client,
    attachment_dir: PathBuf,
    user_id: DbId,
    maps: IdentityMaps,
    digest: ActionDigest,
}

impl<'a> TrelloImporter<'a> {
    pub fn new(
        pool: &'a DbPool,
        http: &'a reqwest::Client,
        attachment_dir: PathBuf,
        user_id: DbId,
        members_mapping: Option<HashMap<String, DbId>>,
    ) -> Self {
        Self {
            pool,
            http,
            attachment_dir,
            user_id,
            maps: IdentityMaps::new(members_mapping),
            digest: ActionDigest::default(),
        }
    }

    // ── Whole-board import ───────────────────────────────────────────

    /// Materialize an entire Trello board export as a new local board.
    ///
    /// Validates the payload collection by collection (actions, board,
    /// labels, lists, cards) before touching the database.
    pub async fn import_board(&mut self, payload: &Value) -> AppResult<Board> {
        schema::check_actions(payload.get("actions").unwrap_or(&Value::Null))?;
        schema::check_board(payload)?;
        schema::check_labels(payload.get("labels").unwrap_or(&Value::Null))?;
        schema::check_lists(payload.get("lists").unwrap_or(&Value::Null))?;
        schema::check_cards(payload.get("cards").unwrap_or(&Value::Null))?;

        let export: TrelloBoardExport = serde_json::from_value(payload.clone())
            .map_err(|e| AppError::InternalError(format!("validated payload failed to parse: {e}")))?;

        self.digest = ActionDigest::replay(&export.actions);

        let board = self.create_board(&export).await?;
        self.create_labels(&export.labels, board.id, false).await?;
        self.create_lists(&export.lists, board.id).await?;
        self.create_cards(&export.cards, board.id, None).await?;

        tracing::info!(
            board_id = board.id,
            user_id = self.user_id,
            lists = export.lists.len(),
            cards = export.cards.len(),
            "Imported Trello board"
        );
        Ok(board)
    }

    // ── Single-card import ───────────────────────────────────────────

    /// Materialize one Trello card into an existing local list.
    ///
    /// `options` is the request envelope carrying `listId`, `sortIndex`
    /// and the optional `membersMapping`. The caller must be a member
    /// of the target list's board. Labels embedded in the card are
    /// reused when the board already has a label with the same name and
    /// color, created otherwise.
    pub async fn import_card(&mut self, card: &Value, options: &Value) -> AppResult<Card> {
        schema::check_cards(&Value::Array(vec![card.clone()]))?;
        schema::check_labels(card.get("labels").unwrap_or(&Value::Null))?;
        schema::check_actions(card.get("actions").unwrap_or(&Value::Null))?;
        schema::check_card_options(options)?;

        let trello_card: TrelloCard = serde_json::from_value(card.clone())
            .map_err(|e| AppError::InternalError(format!("validated card failed to parse: {e}")))?;

        // The target list id arrives as a string. A non-numeric id can
        // never name a row, so it resolves like any other missing list.
        let list_id: DbId = options
            .get("listId")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);

        let list = ListRepo::find_by_id(self.pool, list_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "List",
                id: list_id,
            })?;

        if !BoardRepo::is_member(self.pool, list.board_id, self.user_id).await? {
            return Err(CoreError::Forbidden(
                "You are not a member of this board".into(),
            )
            .into());
        }

        // Seed the list map so the card's own idList resolves to the
        // target list.
        if let Some(foreign_list_id) = &trello_card.id_list {
            self.maps.lists.record(foreign_list_id.clone(), list.id);
        }

        self.digest = ActionDigest::replay(&trello_card.actions);
        self.create_labels(&trello_card.labels, list.board_id, true)
            .await?;

        let mut cards = self
            .create_cards(std::slice::from_ref(&trello_card), list.board_id, Some(list.id))
            .await?;
        // create_cards returned exactly one card for a one-card slice.
        let created = cards
            .pop()
            .ok_or_else(|| AppError::InternalError("card import produced no card".into()))?;

        tracing::info!(
            card_id = created.id,
            list_id = list.id,
            user_id = self.user_id,
            "Imported Trello card"
        );
        Ok(created)
    }

    // ── Materialization steps ────────────────────────────────────────

    /// Create the board row, its memberships, and its import activity.
    async fn create_board(&mut self, export: &TrelloBoardExport) -> AppResult<Board> {
        let board = BoardRepo::create(
            self.pool,
            &CreateBoard {
                title: export.name.clone(),
                slug: slugify(&export.name),
                color: board_color(&export.prefs.background).to_string(),
                permission: board_permission(&export.prefs.permission_level)
                    .as_str()
                    .to_string(),
                archived: export.closed,
                created_at: self.digest.board_created_at,
            },
        )
        .await?;

        // The importing user owns the new board. Mapped foreign members
        // join as regular members; the ON CONFLICT no-op keeps the
        // importer's admin row when a mapping points back at them.
        BoardRepo::add_member(self.pool, board.id, self.user_id, true).await?;
        for membership in &export.memberships {
            if let Some(local_id) = self.maps.members.resolve(&membership.id_member) {
                BoardRepo::add_member(self.pool, board.id, local_id, false).await?;
            }
        }

        let now = Utc::now();
        BoardRepo::touch_modified_at(self.pool, board.id, now).await?;
        ActivityRepo::create(
            self.pool,
            &CreateActivity {
                activity_type: kinds::IMPORT_BOARD.to_string(),
                user_id: Some(self.user_id),
                board_id: board.id,
                source: Some(self.source_json(&export.id, export.url.clone())?),
                created_at: Some(now),
                ..Default::default()
            },
        )
        .await?;

        Ok(board)
    }

    /// Create board labels and record their foreign ids in the label
    /// map. With `reuse_existing`, a label matching on name and color
    /// is mapped instead of duplicated (single-card path).
    async fn create_labels(
        &mut self,
        labels: &[TrelloLabel],
        board_id: DbId,
        reuse_existing: bool,
    ) -> AppResult<()> {
        for label in labels {
            if reuse_existing {
                if let Some(existing) =
                    LabelRepo::find_by_name_color(self.pool, board_id, &label.name, &label.color)
                        .await?
                {
                    self.maps.labels.record(label.id.clone(), existing.id);
                    continue;
                }
            }
            let created = LabelRepo::create(
                self.pool,
                &CreateLabel {
                    board_id,
                    name: label.name.clone(),
                    color: label.color.clone(),
                },
            )
            .await?;
            self.maps.labels.record(label.id.clone(), created.id);
        }
        Ok(())
    }

    /// Create lists in export order, backdated to their `createList`
    /// action when the log has one.
    async fn create_lists(&mut self, lists: &[TrelloList], board_id: DbId) -> AppResult<()> {
        for list in lists {
            let created = ListRepo::create(
                self.pool,
                &CreateList {
                    board_id,
                    title: list.name.clone(),
                    archived: list.closed,
                    user_id: Some(self.user_id),
                    created_at: self.digest.list_created_at(&list.id),
                },
            )
            .await?;
            self.maps.lists.record(list.id.clone(), created.id);

            // The list was touched now, regardless of its backdated
            // creation time, and its import activity says so.
            let now = Utc::now();
            ListRepo::touch_updated_at(self.pool, created.id, now).await?;
            ActivityRepo::create(
                self.pool,
                &CreateActivity {
                    activity_type: kinds::IMPORT_LIST.to_string(),
                    user_id: Some(self.user_id),
                    board_id,
                    list_id: Some(created.id),
                    source: Some(self.source_json(&list.id, None)?),
                    created_at: Some(now),
                    ..Default::default()
                },
            )
            .await?;
        }
        Ok(())
    }

    /// Create cards in export order, then each card's comments and
    /// attachments from the digest. Returns the created rows.
    ///
    /// `fallback_list` is the caller-chosen target on the single-card
    /// path; a card with no list reference of its own still lands there.
    async fn create_cards(
        &mut self,
        cards: &[TrelloCard],
        board_id: DbId,
        fallback_list: Option<DbId>,
    ) -> AppResult<Vec<Card>> {
        let mut created_cards = Vec::with_capacity(cards.len());

        for card in cards {
            let list_id = card
                .id_list
                .as_deref()
                .and_then(|foreign_id| self.maps.lists.resolve(foreign_id))
                .or(fallback_list)
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Card '{}' references a list this import does not know",
                        card.name
                    ))
                })?;

            let created = CardRepo::create(
                self.pool,
                &CreateCard {
                    board_id,
                    list_id,
                    title: card.name.clone(),
                    description: card.desc.clone(),
                    sort: card.pos,
                    archived: card.closed,
                    // Unmapped label references stay as empty slots so
                    // the array keeps the foreign card's shape.
                    label_ids: self.maps.resolve_labels(&card.id_labels),
                    member_ids: self.maps.resolve_members(&card.id_members),
                    user_id: Some(self.user_id),
                    created_at: self.digest.card_created_at(&card.id),
                },
            )
            .await?;

            ActivityRepo::create(
                self.pool,
                &CreateActivity {
                    activity_type: kinds::IMPORT_CARD.to_string(),
                    user_id: Some(self.user_id),
                    board_id,
                    card_id: Some(created.id),
                    list_id: Some(list_id),
                    source: Some(self.source_json(&card.id, card.url.clone())?),
                    ..Default::default()
                },
            )
            .await?;

            self.create_comments(&created, &card.id).await?;
            self.create_attachments(card, &created).await?;

            created_cards.push(created);
        }

        Ok(created_cards)
    }

    /// Create a card's imported comments in log order, each backdated
    /// to its foreign comment date along with its activity record.
    async fn create_comments(&self, card: &Card, foreign_card_id: &str) -> AppResult<()> {
        let Some(pending) = self.digest.comments.get(foreign_card_id) else {
            return Ok(());
        };
        for comment in pending {
            let created = CommentRepo::create(
                self.pool,
                &CreateComment {
                    board_id: card.board_id,
                    card_id: card.id,
                    user_id: Some(self.user_id),
                    text: comment.text.clone(),
                    created_at: Some(comment.date),
                },
            )
            .await?;
            ActivityRepo::create(
                self.pool,
                &CreateActivity {
                    activity_type: kinds::ADD_COMMENT.to_string(),
                    user_id: Some(self.user_id),
                    board_id: card.board_id,
                    card_id: Some(card.id),
                    comment_id: Some(created.id),
                    created_at: Some(comment.date),
                    ..Default::default()
                },
            )
            .await?;
        }
        Ok(())
    }

    /// Download and store a card's attachments sequentially. A fetch
    /// failure aborts the run; entities created so far stay in place.
    async fn create_attachments(&self, card: &TrelloCard, created: &Card) -> AppResult<()> {
        let Some(pending) = self.digest.attachments.get(&card.id) else {
            return Ok(());
        };
        for attachment in pending {
            let stored = self.fetch_and_store(created, attachment).await?;

            ActivityRepo::create(
                self.pool,
                &CreateActivity {
                    activity_type: kinds::ADD_ATTACHMENT.to_string(),
                    user_id: Some(self.user_id),
                    board_id: created.board_id,
                    card_id: Some(created.id),
                    ..Default::default()
                },
            )
            .await?;

            // Restore the cover the foreign card pointed at.
            if card.id_attachment_cover.as_deref() == Some(attachment.id.as_str()) {
                CardRepo::set_cover(self.pool, created.id, stored).await?;
            }
        }
        Ok(())
    }

    /// Fetch one attachment body, write it under the attachment
    /// directory, and record the row. Returns the attachment id.
    async fn fetch_and_store(&self, card: &Card, pending: &PendingAttachment) -> AppResult<DbId> {
        let body = self
            .http
            .get(&pending.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AppError::AttachmentFetch(format!("could not fetch {}: {e}", pending.url)))?
            .bytes()
            .await
            .map_err(|e| AppError::AttachmentFetch(format!("could not read {}: {e}", pending.url)))?;

        let file_name = attachment_file_name(pending);
        let dir = self
            .attachment_dir
            .join(card.board_id.to_string())
            .join(card.id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalError(format!("could not create {}: {e}", dir.display())))?;
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| AppError::InternalError(format!("could not write {}: {e}", path.display())))?;

        let row = AttachmentRepo::create(
            self.pool,
            &CreateAttachment {
                board_id: card.board_id,
                card_id: card.id,
                user_id: Some(self.user_id),
                name: pending
                    .name
                    .clone()
                    .unwrap_or_else(|| file_name.clone()),
                url: Some(pending.url.clone()),
                file_path: path.to_string_lossy().into_owned(),
                size_bytes: body.len() as i64,
            },
        )
        .await?;
        Ok(row.id)
    }

    /// Build the jsonb provenance value for an import activity.
    fn source_json(&self, foreign_id: &str, url: Option<String>) -> AppResult<Value> {
        let source = Source {
            id: foreign_id.to_string(),
            system: SYSTEM_NAME.to_string(),
            url,
        };
        serde_json::to_value(&source)
            .map_err(|e| AppError::InternalError(format!("could not serialize source: {e}")))
    }
}

/// Pick a stable on-disk file name for an imported attachment: the
/// foreign attachment id plus a sanitized display name (or the URL's
/// last path segment when the action carried no name).
fn attachment_file_name(pending: &PendingAttachment) -> String {
    let raw = pending
        .name
        .as_deref()
        .or_else(|| pending.url.rsplit('/').next())
        .unwrap_or("attachment");
    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{}_{}", pending.id, sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(id: &str, url: &str, name: Option<&str>) -> PendingAttachment {
        PendingAttachment {
            id: id.to_string(),
            url: url.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn file_name_sanitizes_display_name() {
        let p = pending("att1", "https://x.test/f", Some("weird name?.png"));
        assert_eq!(attachment_file_name(&p), "att1_weird-name-.png");
    }

    #[test]
    fn file_name_falls_back_to_url_segment() {
        let p = pending("att2", "https://x.test/files/photo.jpg", None);
        assert_eq!(attachment_file_name(&p), "att2_photo.jpg");
    }
}
