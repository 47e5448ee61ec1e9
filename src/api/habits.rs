//! Habit CRUD API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::{CreateHabitRequest, HabitWithCompletions, UpdateHabitRequest, User};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_description, validate_title, validate_uuid};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHabitsQuery {
    pub user_id: Option<String>,
}

/// List all habits for a user, newest-created first
///
/// GET /api/habits?userId=
pub async fn list_habits(
    State(state): State<Arc<AppState>>,
    user: User,
    Query(query): Query<ListHabitsQuery>,
) -> Result<Json<Vec<HabitWithCompletions>>, ApiError> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::validation_field("userId", "User ID is required"))?;

    if user_id != user.id {
        return Err(ApiError::forbidden("You may only list your own habits"));
    }

    let habits = state.store.list_habits(&user_id).await?;
    Ok(Json(habits))
}

/// Create a new habit
///
/// POST /api/habits
pub async fn create_habit(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitWithCompletions>), ApiError> {
    let title = req.title.unwrap_or_default();
    let user_id = req.user_id.unwrap_or_default();

    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_title(&title) {
        errors.add("title", e);
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", e);
    }
    if let Err(e) = validate_uuid(&user_id, "userId") {
        errors.add("userId", e);
    }
    errors.finish()?;

    if user_id != user.id {
        return Err(ApiError::forbidden(
            "You may only create habits for your own account",
        ));
    }

    let habit = state
        .store
        .create_habit(&user_id, &title, req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(habit)))
}

/// Get a habit with its completions
///
/// GET /api/habits/:id
pub async fn get_habit(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<HabitWithCompletions>, ApiError> {
    let habit = state.store.get_habit(&id).await?;
    authorize_owner(&user, &habit)?;
    Ok(Json(habit))
}

/// Update a habit (partial)
///
/// PATCH /api/habits/:id
pub async fn update_habit(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(req): Json<UpdateHabitRequest>,
) -> Result<Json<HabitWithCompletions>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(ref title) = req.title {
        if let Err(e) = validate_title(title) {
            errors.add("title", e);
        }
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", e);
    }
    errors.finish()?;

    let existing = state.store.get_habit(&id).await?;
    authorize_owner(&user, &existing)?;

    let habit = state.store.update_habit(&id, &req).await?;
    Ok(Json(habit))
}

/// Delete a habit; its completions are removed by the cascade
///
/// DELETE /api/habits/:id
pub async fn delete_habit(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let existing = state.store.get_habit(&id).await?;
    authorize_owner(&user, &existing)?;

    state.store.delete_habit(&id).await?;

    tracing::info!("Deleted habit {}", id);
    Ok(Json(json!({ "message": "Habit deleted successfully" })))
}

/// Callers may only operate on habits they own.
pub(super) fn authorize_owner(user: &User, habit: &HabitWithCompletions) -> Result<(), ApiError> {
    if habit.user_id != user.id {
        return Err(ApiError::forbidden("You may only access your own habits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db;

    async fn test_state() -> Arc<AppState> {
        let pool = db::init_in_memory().await.unwrap();
        Arc::new(AppState::new(Config::default(), pool))
    }

    #[tokio::test]
    async fn test_get_habit_rejects_other_owner() {
        let state = test_state().await;
        let ada = state
            .store
            .create_user("Ada", "ada@example.com")
            .await
            .unwrap();
        let grace = state
            .store
            .create_user("Grace", "grace@example.com")
            .await
            .unwrap();
        let habit = state.store.create_habit(&ada.id, "Read", None).await.unwrap();

        let err = get_habit(State(state.clone()), grace, Path(habit.id.clone()))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("[forbidden]"));

        let own = get_habit(State(state), ada, Path(habit.id.clone()))
            .await
            .unwrap();
        assert_eq!(own.0.id, habit.id);
    }

    #[tokio::test]
    async fn test_list_habits_requires_matching_user_id() {
        let state = test_state().await;
        let ada = state
            .store
            .create_user("Ada", "ada@example.com")
            .await
            .unwrap();
        let grace = state
            .store
            .create_user("Grace", "grace@example.com")
            .await
            .unwrap();

        // Another user's habits are off limits.
        let err = list_habits(
            State(state.clone()),
            ada.clone(),
            Query(ListHabitsQuery {
                user_id: Some(grace.id.clone()),
            }),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("[forbidden]"));

        // Missing userId is a validation error, not a rejection.
        let err = list_habits(
            State(state),
            ada,
            Query(ListHabitsQuery { user_id: None }),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("[validation_error]"));
    }
}
