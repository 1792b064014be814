//! Route definitions for the `/cards` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::cards;
use crate::state::AppState;

/// Routes mounted at `/cards`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(cards::get_by_id))
        .route("/{id}/archive", post(cards::archive))
        .route("/{id}/comments", get(cards::comments).post(cards::add_comment))
        .route(
            "/{id}/subtasks",
            get(cards::subtasks).post(cards::create_subtask),
        )
        .route(
            "/{id}/subtasks/{subtask_id}",
            put(cards::update_subtask).delete(cards::delete_subtask),
        )
        .route("/{id}/activities", get(cards::activities))
}
