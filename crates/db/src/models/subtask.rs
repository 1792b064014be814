use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subtasks` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subtask {
    pub id: DbId,
    pub card_id: DbId,
    pub title: String,
    pub sort: f64,
    pub is_finished: bool,
    /// When the subtask was marked done.
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a subtask.
#[derive(Debug, Deserialize)]
pub struct CreateSubtask {
    pub title: String,
    pub sort: f64,
}

/// DTO for updating a subtask. `None` fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateSubtask {
    pub title: Option<String>,
    pub sort: Option<f64>,
    pub is_finished: Option<bool>,
}
