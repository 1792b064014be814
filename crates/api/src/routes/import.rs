//! Route definitions for the `/import` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::import;
use crate::state::AppState;

/// Routes mounted at `/import`.
///
/// ```text
/// POST /trello/board -> import a whole Trello board export
/// POST /trello/card  -> import one Trello card into a local list
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trello/board", post(import::import_trello_board))
        .route("/trello/card", post(import::import_trello_card))
}
