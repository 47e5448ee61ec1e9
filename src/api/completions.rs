//! Per-day completion endpoints: mark and unmark a habit for a calendar day.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::db::{HabitCompletion, MarkCompletionRequest, UnmarkCompletionQuery, User};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::habits::authorize_owner;
use super::validation::validate_uuid;

/// Mark a habit complete for a date. The date is normalized to its calendar
/// day; marking the same day twice yields a 409.
///
/// POST /api/habits/:id/completions
pub async fn mark_complete(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(habit_id): Path<String>,
    Json(req): Json<MarkCompletionRequest>,
) -> Result<(StatusCode, Json<HabitCompletion>), ApiError> {
    let user_id = req.user_id.unwrap_or_default();
    let date = req.date.unwrap_or_default();

    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_uuid(&user_id, "userId") {
        errors.add("userId", e);
    }
    if date.is_empty() {
        errors.add("date", "Date is required");
    }
    errors.finish()?;

    if user_id != user.id {
        return Err(ApiError::forbidden(
            "You may only mark completions for your own habits",
        ));
    }

    let habit = state.store.get_habit(&habit_id).await?;
    authorize_owner(&user, &habit)?;

    let completion = state
        .store
        .mark_complete(&habit_id, &user_id, &date)
        .await?;

    Ok((StatusCode::CREATED, Json(completion)))
}

/// Remove the completion for a date
///
/// DELETE /api/habits/:id/completions?userId=&date=
pub async fn unmark_complete(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(habit_id): Path<String>,
    Query(query): Query<UnmarkCompletionQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = query.user_id.unwrap_or_default();
    let date = query.date.unwrap_or_default();

    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_uuid(&user_id, "userId") {
        errors.add("userId", e);
    }
    if date.is_empty() {
        errors.add("date", "Date is required");
    }
    errors.finish()?;

    if user_id != user.id {
        return Err(ApiError::forbidden(
            "You may only unmark completions for your own habits",
        ));
    }

    state
        .store
        .unmark_complete(&habit_id, &user_id, &date)
        .await?;

    Ok(Json(
        json!({ "message": "Habit completion removed successfully" }),
    ))
}
