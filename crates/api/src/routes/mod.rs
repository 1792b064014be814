pub mod auth;
pub mod boards;
pub mod cards;
pub mod health;
pub mod import;
pub mod lists;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                        register (public)
/// /auth/login                           login (public)
///
/// /boards                               list, create
/// /boards/{id}                          get
/// /boards/{id}/archive                  archive (POST)
/// /boards/{id}/members                  list memberships
/// /boards/{id}/labels                   list labels
/// /boards/{id}/activities               activity feed (newest first)
/// /boards/{id}/lists                    list, create
/// /boards/{id}/export                   whole-board export (GET)
///
/// /lists/{id}                           get
/// /lists/{id}/archive                   archive (POST)
/// /lists/{id}/cards                     list, create
///
/// /cards/{id}                           get
/// /cards/{id}/archive                   archive (POST)
/// /cards/{id}/comments                  list, add
/// /cards/{id}/subtasks                  list, create
/// /cards/{id}/subtasks/{subtask_id}     update (PUT), delete
/// /cards/{id}/activities                card history (oldest first)
///
/// /import/trello/board                  whole-board Trello import (POST)
/// /import/trello/card                   single-card Trello import (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/boards", boards::router())
        .nest("/lists", lists::router())
        .nest("/cards", cards::router())
        .nest("/import", import::router())
}
