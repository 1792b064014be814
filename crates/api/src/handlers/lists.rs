//! Handlers for the `/lists` resource and nested card creation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kanban_core::activity::kinds;
use kanban_core::error::CoreError;
use kanban_core::types::DbId;
use kanban_db::models::activity::CreateActivity;
use kanban_db::models::card::{Card, CreateCard};
use kanban_db::models::list::List;
use kanban_db::repositories::{ActivityRepo, CardRepo, ListRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::boards::require_member;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Request body for `POST /lists/{id}/cards`.
#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Position within the list; appended at 0 when omitted.
    pub sort: Option<f64>,
}

/// Look up a list and check the caller's membership on its board.
async fn find_authorized(state: &AppState, id: DbId, user: &AuthUser) -> AppResult<List> {
    let list = ListRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "List", id }))?;
    require_member(state, list.board_id, user.user_id).await?;
    Ok(list)
}

/// GET /api/v1/lists/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<List>> {
    let list = find_authorized(&state, id, &user).await?;
    Ok(Json(list))
}

/// POST /api/v1/lists/{id}/archive
pub async fn archive(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<List>> {
    find_authorized(&state, id, &user).await?;
    let list = ListRepo::set_archived(&state.pool, id, true)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "List", id }))?;
    Ok(Json(list))
}

/// GET /api/v1/lists/{id}/cards
pub async fn cards(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Card>>> {
    find_authorized(&state, id, &user).await?;
    let cards = CardRepo::list_by_list(&state.pool, id).await?;
    Ok(Json(cards))
}

/// POST /api/v1/lists/{id}/cards
pub async fn create_card(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateCardRequest>,
) -> AppResult<(StatusCode, Json<Card>)> {
    let list = find_authorized(&state, id, &user).await?;
    let card = CardRepo::create(
        &state.pool,
        &CreateCard {
            board_id: list.board_id,
            list_id: list.id,
            title: input.title,
            description: input.description,
            sort: input.sort.unwrap_or(0.0),
            archived: false,
            label_ids: Vec::new(),
            member_ids: Vec::new(),
            user_id: Some(user.user_id),
            created_at: None,
        },
    )
    .await?;
    ActivityRepo::create(
        &state.pool,
        &CreateActivity {
            activity_type: kinds::CREATE_CARD.to_string(),
            user_id: Some(user.user_id),
            board_id: list.board_id,
            list_id: Some(list.id),
            card_id: Some(card.id),
            ..Default::default()
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(card)))
}
