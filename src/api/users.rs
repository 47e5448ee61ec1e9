//! User API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::db::{CreateUserRequest, UpdateUserRequest, User, UserWithHabits};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name};

/// Create a new user
///
/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let name = req.name.unwrap_or_default();
    let email = req.email.unwrap_or_default();

    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_name(&name) {
        errors.add("name", e);
    }
    if let Err(e) = validate_email(&email) {
        errors.add("email", e);
    }
    errors.finish()?;

    let user = state.store.create_user(&name, &email).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user with their habits and completions
///
/// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<UserWithHabits>, ApiError> {
    authorize_self(&user, &id)?;
    let result = state.store.get_user_with_habits(&id).await?;
    Ok(Json(result))
}

/// Update a user (partial)
///
/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    authorize_self(&user, &id)?;

    let mut errors = ValidationErrorBuilder::new();
    if let Some(ref name) = req.name {
        if let Err(e) = validate_name(name) {
            errors.add("name", e);
        }
    }
    if let Some(ref email) = req.email {
        if let Err(e) = validate_email(email) {
            errors.add("email", e);
        }
    }
    errors.finish()?;

    let updated = state.store.update_user(&id, &req).await?;
    Ok(Json(updated))
}

/// Delete a user and, through the cascade, all their habits and completions
///
/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize_self(&user, &id)?;
    state.store.delete_user(&id).await?;

    tracing::info!("Deleted user {}", id);
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// Callers may only operate on their own user record.
fn authorize_self(user: &User, id: &str) -> Result<(), ApiError> {
    if user.id != id {
        return Err(ApiError::forbidden(
            "You may only access your own account",
        ));
    }
    Ok(())
}
