//! Derived streak and weekly statistics for a habit.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::User;
use crate::store::{calendar, HabitStats};
use crate::AppState;

use super::error::ApiError;
use super::habits::authorize_owner;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Reference day (ISO-8601 date or datetime). Defaults to today (UTC).
    pub date: Option<String>,
}

/// Current/longest streak, weekly and monthly counts, and the Monday-Sunday
/// grid for the reference week
///
/// GET /api/habits/:id/stats?date=
pub async fn habit_stats(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(habit_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<HabitStats>, ApiError> {
    let reference = match query.date {
        Some(ref raw) => calendar::normalize_day(raw)
            .map_err(|e| ApiError::validation_field("date", e))?,
        None => calendar::today(),
    };

    let habit = state.store.get_habit(&habit_id).await?;
    authorize_owner(&user, &habit)?;

    let stats = state.store.habit_stats(&habit_id, reference).await?;
    Ok(Json(stats))
}
