//! Handlers for the `/boards` resource: boards, memberships, labels,
//! nested list creation, and the board activity feed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanban_core::activity::kinds;
use kanban_core::error::CoreError;
use kanban_core::slug::slugify;
use kanban_core::trello::BOARD_COLORS;
use kanban_core::types::DbId;
use kanban_db::models::activity::{Activity, CreateActivity};
use kanban_db::models::board::{Board, BoardMember, CreateBoard};
use kanban_db::models::label::BoardLabel;
use kanban_db::models::list::{CreateList, List};
use kanban_db::repositories::{ActivityRepo, BoardRepo, LabelRepo, ListRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Default number of activity records returned by the board feed.
const DEFAULT_ACTIVITY_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /boards`.
#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub title: String,
    /// `public` or `private`; defaults to private.
    pub permission: Option<String>,
    /// One of the board palette colors; defaults to the first entry.
    pub color: Option<String>,
}

/// Request body for `POST /boards/{id}/lists`.
#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub title: String,
}

/// Query parameters for the activity feed.
#[derive(Debug, Deserialize)]
pub struct ActivityFeedParams {
    pub limit: Option<i64>,
}

/// Ensure the caller is an active member of the board.
pub async fn require_member(state: &AppState, board_id: DbId, user_id: DbId) -> AppResult<()> {
    if BoardRepo::is_member(&state.pool, board_id, user_id).await? {
        Ok(())
    } else {
        Err(CoreError::Forbidden("You are not a member of this board".into()).into())
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/boards
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBoardRequest>,
) -> AppResult<(StatusCode, Json<Board>)> {
    let permission = match input.permission.as_deref() {
        None => "private",
        Some(p @ ("public" | "private")) => p,
        Some(other) => {
            return Err(CoreError::Validation(format!(
                "Unknown board permission: {other}"
            ))
            .into())
        }
    };
    let color = match input.color.as_deref() {
        None => BOARD_COLORS[0],
        Some(c) => BOARD_COLORS
            .iter()
            .find(|known| **known == c)
            .copied()
            .ok_or_else(|| CoreError::Validation(format!("Unknown board color: {c}")))?,
    };

    let board = BoardRepo::create(
        &state.pool,
        &CreateBoard {
            title: input.title.clone(),
            slug: slugify(&input.title),
            color: color.to_string(),
            permission: permission.to_string(),
            archived: false,
            created_at: None,
        },
    )
    .await?;

    BoardRepo::add_member(&state.pool, board.id, user.user_id, true).await?;
    ActivityRepo::create(
        &state.pool,
        &CreateActivity {
            activity_type: kinds::CREATE_BOARD.to_string(),
            user_id: Some(user.user_id),
            board_id: board.id,
            ..Default::default()
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /api/v1/boards
pub async fn list(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Board>>> {
    let boards = BoardRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(boards))
}

/// GET /api/v1/boards/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Board>> {
    let board = BoardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Board",
            id,
        }))?;
    // Public boards are readable by any authenticated user.
    if board.permission != "public" {
        require_member(&state, id, user.user_id).await?;
    }
    Ok(Json(board))
}

/// POST /api/v1/boards/{id}/archive
pub async fn archive(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Board>> {
    require_member(&state, id, user.user_id).await?;
    let board = BoardRepo::set_archived(&state.pool, id, true)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Board",
            id,
        }))?;
    Ok(Json(board))
}

/// GET /api/v1/boards/{id}/members
pub async fn members(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<BoardMember>>> {
    require_member(&state, id, user.user_id).await?;
    let members = BoardRepo::list_members(&state.pool, id).await?;
    Ok(Json(members))
}

/// GET /api/v1/boards/{id}/labels
pub async fn labels(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<BoardLabel>>> {
    require_member(&state, id, user.user_id).await?;
    let labels = LabelRepo::list_by_board(&state.pool, id).await?;
    Ok(Json(labels))
}

/// GET /api/v1/boards/{id}/activities
///
/// Newest-first activity feed, capped at `limit` records.
pub async fn activities(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ActivityFeedParams>,
) -> AppResult<Json<Vec<Activity>>> {
    require_member(&state, id, user.user_id).await?;
    let limit = params.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, 500);
    let feed = ActivityRepo::list_by_board(&state.pool, id, limit).await?;
    Ok(Json(feed))
}

/// GET /api/v1/boards/{id}/lists
pub async fn lists(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<List>>> {
    require_member(&state, id, user.user_id).await?;
    let lists = ListRepo::list_by_board(&state.pool, id).await?;
    Ok(Json(lists))
}

/// POST /api/v1/boards/{id}/lists
pub async fn create_list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateListRequest>,
) -> AppResult<(StatusCode, Json<List>)> {
    require_member(&state, id, user.user_id).await?;
    let list = ListRepo::create(
        &state.pool,
        &CreateList {
            board_id: id,
            title: input.title,
            archived: false,
            user_id: Some(user.user_id),
            created_at: None,
        },
    )
    .await?;
    ActivityRepo::create(
        &state.pool,
        &CreateActivity {
            activity_type: kinds::CREATE_LIST.to_string(),
            user_id: Some(user.user_id),
            board_id: id,
            list_id: Some(list.id),
            ..Default::default()
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(list)))
}
