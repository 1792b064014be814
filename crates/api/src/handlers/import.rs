//! Handlers for the `/import` resource.
//!
//! Both endpoints accept untrusted foreign JSON. Validation failures
//! collapse to an opaque schema error in the response; the field-level
//! detail only reaches the server logs (see
//! [`AppError::Schema`](crate::error::AppError)).

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kanban_core::trello::schema::{self, SchemaViolation};
use kanban_core::types::DbId;
use kanban_db::models::board::Board;
use kanban_db::models::card::Card;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::import::trello::TrelloImporter;
use crate::middleware::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Parse the optional `membersMapping` envelope field: foreign member
/// ids to local user ids.
fn parse_members_mapping(value: Option<&Value>) -> AppResult<Option<HashMap<String, DbId>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(mapping) => serde_json::from_value(mapping.clone()).map(Some).map_err(|_| {
            AppError::Schema(SchemaViolation {
                collection: "options",
                index: None,
                field: "membersMapping".to_string(),
                expected: "a map of foreign member ids to local user ids",
            })
        }),
    }
}

/// POST /api/v1/import/trello/board
///
/// Materialize a whole Trello board export as a new local board. The
/// body is `{ "board": <export>, "membersMapping": { ... } }`. Imports
/// are not idempotent: repeating the request creates another copy.
pub async fn import_trello_board(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<Board>>)> {
    schema::check_board_options(&body)?;
    let members_mapping = parse_members_mapping(body.get("membersMapping"))?;

    let mut importer = TrelloImporter::new(
        &state.pool,
        &state.http,
        state.config.attachment_dir.clone(),
        user.user_id,
        members_mapping,
    );
    let board = importer
        .import_board(body.get("board").unwrap_or(&Value::Null))
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: board })))
}

/// POST /api/v1/import/trello/card
///
/// Materialize one Trello card into an existing local list. The body is
/// `{ "card": <card>, "listId": "<local id>", "sortIndex": n,
/// "membersMapping": { ... } }`.
pub async fn import_trello_card(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<Card>>)> {
    let members_mapping = parse_members_mapping(body.get("membersMapping"))?;

    let mut importer = TrelloImporter::new(
        &state.pool,
        &state.http,
        state.config.attachment_dir.clone(),
        user.user_id,
        members_mapping,
    );
    let card = importer
        .import_card(body.get("card").unwrap_or(&Value::Null), &body)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: card })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn members_mapping_absent_or_null_is_none() {
        assert_matches!(parse_members_mapping(None), Ok(None));
        assert_matches!(parse_members_mapping(Some(&Value::Null)), Ok(None));
    }

    #[test]
    fn members_mapping_parses_numeric_ids() {
        let value = json!({ "tm1": 7, "tm2": 9 });
        let mapping = parse_members_mapping(Some(&value)).unwrap().unwrap();
        assert_eq!(mapping.get("tm1"), Some(&7));
        assert_eq!(mapping.get("tm2"), Some(&9));
    }

    #[test]
    fn members_mapping_with_non_numeric_values_is_a_schema_error() {
        let value = json!({ "tm1": "bob" });
        assert_matches!(
            parse_members_mapping(Some(&value)),
            Err(AppError::Schema(_))
        );
    }
}
