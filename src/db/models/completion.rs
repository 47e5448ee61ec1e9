//! Per-day habit completion models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One completed calendar day for a habit. `date` is the normalized day
/// (`YYYY-MM-DD`); `user_id` is a denormalized copy of the habit's owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletion {
    pub id: String,
    pub habit_id: String,
    pub user_id: String,
    pub date: String,
    pub created_at: String,
}

// Both fields are Options so a missing field maps to a 400 validation error
// rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkCompletionRequest {
    pub user_id: Option<String>,
    /// ISO-8601 date or datetime; normalized to its calendar day.
    pub date: Option<String>,
}

// Options for the same reason: a missing query param gets the JSON error
// envelope, not the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmarkCompletionQuery {
    pub user_id: Option<String>,
    pub date: Option<String>,
}
