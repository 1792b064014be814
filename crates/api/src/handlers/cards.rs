//! Handlers for the `/cards` resource: cards, comments, subtasks, and
//! the per-card activity feed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kanban_core::activity::kinds;
use kanban_core::error::CoreError;
use kanban_core::types::DbId;
use kanban_db::models::activity::{Activity, CreateActivity};
use kanban_db::models::card::Card;
use kanban_db::models::comment::{Comment, CreateComment};
use kanban_db::models::subtask::{CreateSubtask, Subtask, UpdateSubtask};
use kanban_db::repositories::{ActivityRepo, CardRepo, CommentRepo, SubtaskRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::boards::require_member;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Request body for `POST /cards/{id}/comments`.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
}

/// Look up a card and check the caller's membership on its board.
async fn find_authorized(state: &AppState, id: DbId, user: &AuthUser) -> AppResult<Card> {
    let card = CardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Card", id }))?;
    require_member(state, card.board_id, user.user_id).await?;
    Ok(card)
}

/// GET /api/v1/cards/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Card>> {
    let card = find_authorized(&state, id, &user).await?;
    Ok(Json(card))
}

/// POST /api/v1/cards/{id}/archive
pub async fn archive(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Card>> {
    find_authorized(&state, id, &user).await?;
    let card = CardRepo::set_archived(&state.pool, id, true)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Card", id }))?;
    Ok(Json(card))
}

// ── Comments ─────────────────────────────────────────────────────────

/// GET /api/v1/cards/{id}/comments
pub async fn comments(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Comment>>> {
    find_authorized(&state, id, &user).await?;
    let comments = CommentRepo::list_by_card(&state.pool, id).await?;
    Ok(Json(comments))
}

/// POST /api/v1/cards/{id}/comments
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let card = find_authorized(&state, id, &user).await?;
    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            board_id: card.board_id,
            card_id: card.id,
            user_id: Some(user.user_id),
            text: input.text,
            created_at: None,
        },
    )
    .await?;
    ActivityRepo::create(
        &state.pool,
        &CreateActivity {
            activity_type: kinds::ADD_COMMENT.to_string(),
            user_id: Some(user.user_id),
            board_id: card.board_id,
            card_id: Some(card.id),
            comment_id: Some(comment.id),
            ..Default::default()
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// ── Subtasks ─────────────────────────────────────────────────────────

/// GET /api/v1/cards/{id}/subtasks
pub async fn subtasks(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Subtask>>> {
    find_authorized(&state, id, &user).await?;
    let subtasks = SubtaskRepo::list_by_card(&state.pool, id).await?;
    Ok(Json(subtasks))
}

/// POST /api/v1/cards/{id}/subtasks
pub async fn create_subtask(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateSubtask>,
) -> AppResult<(StatusCode, Json<Subtask>)> {
    let card = find_authorized(&state, id, &user).await?;
    let subtask = SubtaskRepo::create(&state.pool, card.id, &input).await?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

/// PUT /api/v1/cards/{id}/subtasks/{subtask_id}
pub async fn update_subtask(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, subtask_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSubtask>,
) -> AppResult<Json<Subtask>> {
    find_authorized(&state, id, &user).await?;
    let subtask = SubtaskRepo::update(&state.pool, subtask_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subtask",
            id: subtask_id,
        }))?;
    Ok(Json(subtask))
}

/// DELETE /api/v1/cards/{id}/subtasks/{subtask_id}
pub async fn delete_subtask(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, subtask_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_authorized(&state, id, &user).await?;
    let deleted = SubtaskRepo::delete(&state.pool, subtask_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Subtask",
            id: subtask_id,
        }))
    }
}

// ── Activity feed ────────────────────────────────────────────────────

/// GET /api/v1/cards/{id}/activities
///
/// The card's history, oldest first.
pub async fn activities(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Activity>>> {
    find_authorized(&state, id, &user).await?;
    let feed = ActivityRepo::list_by_card(&state.pool, id).await?;
    Ok(Json(feed))
}
