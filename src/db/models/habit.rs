//! Habit models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::completion::HabitCompletion;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A habit with its completions, ordered newest-first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitWithCompletions {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub completions: Vec<HabitCompletion>,
}

impl HabitWithCompletions {
    pub fn new(habit: Habit, completions: Vec<HabitCompletion>) -> Self {
        Self {
            id: habit.id,
            title: habit.title,
            description: habit.description,
            user_id: habit.user_id,
            created_at: habit.created_at,
            updated_at: habit.updated_at,
            completions,
        }
    }
}

// DTOs for API

// title and userId are Options so a missing field maps to a 400 validation
// error rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}
