//! Route definitions for the `/boards` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{boards, export};
use crate::state::AppState;

/// Routes mounted at `/boards`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(boards::list).post(boards::create))
        .route("/{id}", get(boards::get_by_id))
        .route("/{id}/archive", post(boards::archive))
        .route("/{id}/members", get(boards::members))
        .route("/{id}/labels", get(boards::labels))
        .route("/{id}/activities", get(boards::activities))
        .route("/{id}/lists", get(boards::lists).post(boards::create_list))
        .route("/{id}/export", get(export::export_board))
}
