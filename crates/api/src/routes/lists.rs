//! Route definitions for the `/lists` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lists;
use crate::state::AppState;

/// Routes mounted at `/lists`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(lists::get_by_id))
        .route("/{id}/archive", post(lists::archive))
        .route("/{id}/cards", get(lists::cards).post(lists::create_card))
}
