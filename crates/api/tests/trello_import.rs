//! End-to-end tests for the Trello import materializer, run against a
//! real Postgres database via `sqlx::test`.

use std::collections::HashMap;

use assert_matches::assert_matches;
use chrono::{DateTime, Utc};
use kanban_api::error::AppError;
use kanban_api::import::trello::TrelloImporter;
use kanban_core::error::CoreError;
use kanban_core::types::DbId;
use kanban_db::models::user::{CreateUser, User};
use kanban_db::repositories::{
    ActivityRepo, AttachmentRepo, BoardRepo, CardRepo, CommentRepo, LabelRepo, ListRepo, UserRepo,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;

async fn seed_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: "x".to_string(),
            is_admin: false,
        },
    )
    .await
    .expect("seed user")
}

/// A small but complete board export: two lists, two cards, one label,
/// one foreign member, and an action log with creation dates and a
/// comment.
fn board_export() -> Value {
    json!({
        "id": "tb1",
        "name": "Release planning",
        "closed": false,
        "url": "https://trello.com/b/tb1",
        "prefs": { "background": "blue", "permissionLevel": "private" },
        "memberships": [ { "idMember": "tm1" } ],
        "labels": [
            { "id": "tl1", "name": "Urgent", "color": "red" }
        ],
        "lists": [
            { "id": "list-a", "name": "Backlog", "closed": false },
            { "id": "list-b", "name": "Done", "closed": true }
        ],
        "cards": [
            {
                "id": "card-1",
                "name": "Ship it",
                "desc": "the big one",
                "closed": false,
                "dateLastActivity": "2019-01-05T08:00:00.000Z",
                "pos": 1.0,
                "idList": "list-a",
                "idLabels": ["tl1"],
                "idMembers": ["tm1", "tm-unknown"]
            },
            {
                "id": "card-2",
                "name": "Archive me",
                "desc": "",
                "closed": true,
                "dateLastActivity": "2019-01-02T08:00:00.000Z",
                "pos": 2.0,
                "idList": "list-b",
                "idLabels": [],
                "idMembers": []
            }
        ],
        "actions": [
            {
                "type": "createBoard",
                "date": "2019-01-01T08:00:00.000Z",
                "data": { "board": { "id": "tb1" } }
            },
            {
                "type": "createList",
                "date": "2019-01-02T08:00:00.000Z",
                "data": { "list": { "id": "list-a" } }
            },
            {
                "type": "createCard",
                "date": "2019-01-03T08:00:00.000Z",
                "data": { "card": { "id": "card-1" } }
            },
            {
                "type": "commentCard",
                "date": "2019-01-04T08:00:00.000Z",
                "data": { "card": { "id": "card-1" }, "text": "first!" }
            },
            {
                "type": "commentCard",
                "date": "2019-01-05T08:00:00.000Z",
                "data": { "card": { "id": "card-1" }, "text": "second" }
            }
        ]
    })
}

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn importer<'a>(
    pool: &'a PgPool,
    http: &'a reqwest::Client,
    dir: &TempDir,
    user_id: DbId,
    mapping: Option<HashMap<String, DbId>>,
) -> TrelloImporter<'a> {
    TrelloImporter::new(pool, http, dir.path().to_path_buf(), user_id, mapping)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn board_import_materializes_hierarchy(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .expect("import should succeed");

    assert_eq!(board.title, "Release planning");
    assert_eq!(board.slug, "release-planning");
    assert_eq!(board.color, "belize");
    assert_eq!(board.permission, "private");
    assert!(!board.archived);
    // Backdated to the createBoard action.
    assert_eq!(board.created_at, ts("2019-01-01T08:00:00Z"));

    let lists = ListRepo::list_by_board(&pool, board.id).await.unwrap();
    assert_eq!(lists.len(), 2);
    let backlog = lists.iter().find(|l| l.title == "Backlog").unwrap();
    let done = lists.iter().find(|l| l.title == "Done").unwrap();
    assert!(!backlog.archived);
    assert!(done.archived);
    assert_eq!(backlog.created_at, ts("2019-01-02T08:00:00Z"));

    // Every card must land in the list its export referenced.
    let cards = CardRepo::list_by_board(&pool, board.id).await.unwrap();
    assert_eq!(cards.len(), 2);
    let ship = cards.iter().find(|c| c.title == "Ship it").unwrap();
    let archived = cards.iter().find(|c| c.title == "Archive me").unwrap();
    assert_eq!(ship.list_id, backlog.id);
    assert_eq!(archived.list_id, done.id);
    assert!(archived.archived);
    assert_eq!(ship.created_at, ts("2019-01-03T08:00:00Z"));

    // The label was created on the board and resolved onto the card.
    let labels = LabelRepo::list_by_board(&pool, board.id).await.unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(ship.label_ids, vec![Some(labels[0].id)]);

    // The importing user owns the new board.
    let members = BoardRepo::list_members(&pool, board.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, user.id);
    assert!(members[0].is_admin);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_log_covers_every_entity(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .unwrap();

    let activities = ActivityRepo::list_all_by_board(&pool, board.id).await.unwrap();
    let count = |kind: &str| activities.iter().filter(|a| a.activity_type == kind).count();

    assert_eq!(count("importBoard"), 1);
    assert_eq!(count("importList"), 2);
    assert_eq!(count("importCard"), 2);
    assert_eq!(count("addComment"), 2);

    // Import provenance names the foreign record.
    let board_activity = activities
        .iter()
        .find(|a| a.activity_type == "importBoard")
        .unwrap();
    let source = board_activity.source.as_ref().expect("board source");
    assert_eq!(source["id"], "tb1");
    assert_eq!(source["system"], "Trello");
    assert_eq!(source["url"], "https://trello.com/b/tb1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn comments_kept_in_log_order_and_backdated(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .unwrap();

    let cards = CardRepo::list_by_board(&pool, board.id).await.unwrap();
    let ship = cards.iter().find(|c| c.title == "Ship it").unwrap();

    let comments = CommentRepo::list_by_card(&pool, ship.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "first!");
    assert_eq!(comments[1].text, "second");
    assert_eq!(comments[0].created_at, ts("2019-01-04T08:00:00Z"));
    assert_eq!(comments[1].created_at, ts("2019-01-05T08:00:00Z"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn members_mapping_resolves_and_drops(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let mapping = HashMap::from([("tm1".to_string(), bob.id)]);
    let board = importer(&pool, &http, &dir, alice.id, Some(mapping))
        .import_board(&board_export())
        .await
        .unwrap();

    // Mapped foreign member joined as a regular member.
    let members = BoardRepo::list_members(&pool, board.id).await.unwrap();
    assert_eq!(members.len(), 2);
    let bob_row = members.iter().find(|m| m.user_id == bob.id).unwrap();
    assert!(!bob_row.is_admin);

    // On the card, tm1 resolved to bob and tm-unknown was dropped.
    let cards = CardRepo::list_by_board(&pool, board.id).await.unwrap();
    let ship = cards.iter().find(|c| c.title == "Ship it").unwrap();
    assert_eq!(ship.member_ids, vec![bob.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unmapped_label_keeps_empty_slot(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let mut export = board_export();
    export["cards"][0]["idLabels"] = json!(["tl1", "tl-ghost"]);

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&export)
        .await
        .unwrap();

    let labels = LabelRepo::list_by_board(&pool, board.id).await.unwrap();
    let cards = CardRepo::list_by_board(&pool, board.id).await.unwrap();
    let ship = cards.iter().find(|c| c.title == "Ship it").unwrap();
    assert_eq!(ship.label_ids, vec![Some(labels[0].id), None]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reimport_creates_an_independent_copy(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let first = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .unwrap();
    let second = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    let boards = BoardRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(boards.len(), 2);
    assert_eq!(
        ListRepo::list_by_board(&pool, second.id).await.unwrap().len(),
        2
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_payload_creates_nothing(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let mut export = board_export();
    export["prefs"] = json!({ "background": "blue" }); // permissionLevel gone

    let result = importer(&pool, &http, &dir, user.id, None)
        .import_board(&export)
        .await;
    assert_matches!(result, Err(AppError::Schema(_)));

    let boards = BoardRepo::list_for_user(&pool, user.id).await.unwrap();
    assert!(boards.is_empty(), "validation must run before any insert");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn attachment_fetch_failure_keeps_created_entities(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let mut export = board_export();
    // Nothing listens on port 9; the fetch fails after the card exists.
    export["actions"].as_array_mut().unwrap().push(json!({
        "type": "addAttachmentToCard",
        "date": "2019-01-06T08:00:00.000Z",
        "data": {
            "card": { "id": "card-1" },
            "attachment": {
                "id": "att1",
                "url": "http://127.0.0.1:9/missing.png",
                "name": "missing.png"
            }
        }
    }));

    let result = importer(&pool, &http, &dir, user.id, None)
        .import_board(&export)
        .await;
    assert_matches!(result, Err(AppError::AttachmentFetch(_)));

    // No rollback: the board and its cards created so far stay.
    let boards = BoardRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(boards.len(), 1);
    let cards = CardRepo::list_by_board(&pool, boards[0].id).await.unwrap();
    assert!(cards.iter().any(|c| c.title == "Ship it"));
}

/// Serve one HTTP response with the given body on an ephemeral local
/// port and return its base URL.
async fn one_shot_file_server(body: &'static [u8]) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let header = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes()).await;
            let _ = stream.write_all(body).await;
            let _ = stream.shutdown().await;
        }
    });
    format!("http://{addr}")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fetched_attachment_is_stored_and_promoted_to_cover(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let base = one_shot_file_server(b"png-bytes").await;
    let mut export = board_export();
    export["cards"][0]["idAttachmentCover"] = json!("att1");
    export["actions"].as_array_mut().unwrap().push(json!({
        "type": "addAttachmentToCard",
        "date": "2019-01-06T08:00:00.000Z",
        "data": {
            "card": { "id": "card-1" },
            "attachment": {
                "id": "att1",
                "url": format!("{base}/cover.png"),
                "name": "cover.png"
            }
        }
    }));

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&export)
        .await
        .expect("import should succeed");

    let cards = CardRepo::list_by_board(&pool, board.id).await.unwrap();
    let ship = cards.iter().find(|c| c.title == "Ship it").unwrap();

    let attachments = AttachmentRepo::list_by_card(&pool, ship.id).await.unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].name, "cover.png");
    assert_eq!(attachments[0].size_bytes, 9);
    let stored = std::fs::read(&attachments[0].file_path).unwrap();
    assert_eq!(stored, b"png-bytes");

    // The card fetched fresh shows the promoted cover.
    let refreshed = CardRepo::find_by_id(&pool, ship.id).await.unwrap().unwrap();
    assert_eq!(refreshed.cover_attachment_id, Some(attachments[0].id));
}

// ── Single-card path ─────────────────────────────────────────────────

/// A single exported card with its own labels and actions embedded.
fn card_export() -> Value {
    json!({
        "id": "card-9",
        "name": "Imported alone",
        "desc": "one card",
        "closed": false,
        "dateLastActivity": "2020-06-02T12:00:00.000Z",
        "pos": 5.0,
        "idList": "list-z",
        "idLabels": ["tl9"],
        "idMembers": [],
        "labels": [
            { "id": "tl9", "name": "Urgent", "color": "red" }
        ],
        "actions": [
            {
                "type": "createCard",
                "date": "2020-06-01T12:00:00.000Z",
                "data": { "card": { "id": "card-9" } }
            }
        ]
    })
}

fn card_options(list_id: DbId) -> Value {
    json!({ "listId": list_id.to_string(), "sortIndex": 3 })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_card_lands_in_target_list(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .unwrap();
    let lists = ListRepo::list_by_board(&pool, board.id).await.unwrap();
    let backlog = lists.iter().find(|l| l.title == "Backlog").unwrap();

    let card = importer(&pool, &http, &dir, user.id, None)
        .import_card(&card_export(), &card_options(backlog.id))
        .await
        .expect("card import should succeed");

    assert_eq!(card.list_id, backlog.id);
    assert_eq!(card.board_id, board.id);
    assert_eq!(card.created_at, ts("2020-06-01T12:00:00Z"));

    // "Urgent"/"red" already exists on the board; it must be reused,
    // not duplicated.
    let labels = LabelRepo::list_by_board(&pool, board.id).await.unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(card.label_ids, vec![Some(labels[0].id)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_card_without_list_reference_uses_target(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .unwrap();
    let lists = ListRepo::list_by_board(&pool, board.id).await.unwrap();
    let done = lists.iter().find(|l| l.title == "Done").unwrap();

    // Some exports omit idList on the card itself; the request's listId
    // decides where it lands.
    let mut card = card_export();
    card.as_object_mut().unwrap().remove("idList");

    let created = importer(&pool, &http, &dir, user.id, None)
        .import_card(&card, &card_options(done.id))
        .await
        .expect("card without idList should still import");

    assert_eq!(created.list_id, done.id);
    assert_eq!(created.board_id, board.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_card_unknown_list_is_not_found(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let result = importer(&pool, &http, &dir, user.id, None)
        .import_card(&card_export(), &card_options(999_999))
        .await;
    assert_matches!(
        result,
        Err(AppError::Core(CoreError::NotFound { entity: "List", .. }))
    );

    // A listId that is not even numeric cannot name a list either; it
    // gets the same not-found treatment, not a validation error.
    let options = json!({ "listId": "not-a-number", "sortIndex": 1 });
    let result = importer(&pool, &http, &dir, user.id, None)
        .import_card(&card_export(), &options)
        .await;
    assert_matches!(
        result,
        Err(AppError::Core(CoreError::NotFound { entity: "List", .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_card_requires_board_membership(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let mallory = seed_user(&pool, "mallory").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let board = importer(&pool, &http, &dir, alice.id, None)
        .import_board(&board_export())
        .await
        .unwrap();
    let lists = ListRepo::list_by_board(&pool, board.id).await.unwrap();

    let result = importer(&pool, &http, &dir, mallory.id, None)
        .import_card(&card_export(), &card_options(lists[0].id))
        .await;
    assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_card_rejects_malformed_card(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let http = reqwest::Client::new();
    let dir = TempDir::new().unwrap();

    let board = importer(&pool, &http, &dir, user.id, None)
        .import_board(&board_export())
        .await
        .unwrap();
    let lists = ListRepo::list_by_board(&pool, board.id).await.unwrap();

    let mut card = card_export();
    card.as_object_mut().unwrap().remove("pos");

    let result = importer(&pool, &http, &dir, user.id, None)
        .import_card(&card, &card_options(lists[0].id))
        .await;
    assert_matches!(result, Err(AppError::Schema(_)));
}
