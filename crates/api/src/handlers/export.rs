//! Handler for whole-board export.
//!
//! The export bundles everything a board owns into one JSON document:
//! the board row, labels, lists, cards, comments, the full activity
//! log, and a whitelisted projection of every referenced user. It is
//! the local counterpart of the foreign exports the import pipeline
//! consumes.

use axum::extract::{Path, State};
use axum::Json;
use kanban_core::error::CoreError;
use kanban_core::types::DbId;
use kanban_db::models::activity::Activity;
use kanban_db::models::board::Board;
use kanban_db::models::card::Card;
use kanban_db::models::comment::Comment;
use kanban_db::models::label::BoardLabel;
use kanban_db::models::list::List;
use kanban_db::models::user::UserPublic;
use kanban_db::repositories::{
    ActivityRepo, BoardRepo, CardRepo, CommentRepo, LabelRepo, ListRepo, UserRepo,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::boards::require_member;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// A complete board export document.
#[derive(Debug, Serialize)]
pub struct BoardExport {
    pub board: Board,
    pub labels: Vec<BoardLabel>,
    pub lists: Vec<List>,
    pub cards: Vec<Card>,
    pub comments: Vec<Comment>,
    pub activities: Vec<Activity>,
    /// Every user referenced by the board, credentials stripped.
    pub users: Vec<UserPublic>,
}

/// GET /api/v1/boards/{id}/export
pub async fn export_board(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BoardExport>> {
    let board = BoardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Board",
            id,
        }))?;
    // Public boards export for any authenticated user.
    if board.permission != "public" {
        require_member(&state, id, user.user_id).await?;
    }

    let labels = LabelRepo::list_by_board(&state.pool, id).await?;
    let lists = ListRepo::list_by_board(&state.pool, id).await?;
    let cards = CardRepo::list_by_board(&state.pool, id).await?;
    let comments = CommentRepo::list_by_board(&state.pool, id).await?;
    let activities = ActivityRepo::list_all_by_board(&state.pool, id).await?;

    // Collect every user the document references: board members plus
    // card assignees. Duplicates collapse before the lookup.
    let mut user_ids: Vec<DbId> = BoardRepo::list_members(&state.pool, id)
        .await?
        .into_iter()
        .map(|m| m.user_id)
        .collect();
    for card in &cards {
        for member_id in &card.member_ids {
            if !user_ids.contains(member_id) {
                user_ids.push(*member_id);
            }
        }
    }
    let users = UserRepo::find_public_by_ids(&state.pool, &user_ids).await?;

    Ok(Json(BoardExport {
        board,
        labels,
        lists,
        cards,
        comments,
        activities,
        users,
    }))
}
