//! User and session models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::habit::HabitWithCompletions;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A user together with their habits, habits newest-created first and each
/// habit's completions newest-first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithHabits {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    pub habits: Vec<HabitWithCompletions>,
}

impl UserWithHabits {
    pub fn new(user: User, habits: Vec<HabitWithCompletions>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            habits,
        }
    }
}

// Required fields are Options so a missing field surfaces as a 400
// validation error rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}

/// Credentials sign-in: finds the user by email or registers them on the
/// spot, the same flow the web client's sign-in form uses.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
