//! The habit store: owns users, habits and per-day completions and enforces
//! their invariants. HTTP handlers delegate here and perform no business
//! logic of their own.
//!
//! Uniqueness rules (one user per email, one completion per habit/user/day)
//! are enforced by the database's UNIQUE constraints: inserts go straight to
//! the database and constraint violations are mapped to [`StoreError::Conflict`],
//! so concurrent duplicate writes linearize in SQLite rather than racing an
//! application-level pre-check.

pub mod calendar;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{
    DbPool, Habit, HabitCompletion, HabitWithCompletions, UpdateHabitRequest, UpdateUserRequest,
    User, UserWithHabits,
};

use calendar::WeekDay;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or malformed required fields. Client-caused, never retried.
    #[error("{0}")]
    Validation(String),
    /// The referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation: duplicate email or duplicate completion day.
    #[error("{0}")]
    Conflict(String),
    /// Unexpected persistence-layer failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Classify a constraint violation from an insert/update. UNIQUE failures
/// become conflicts, FOREIGN KEY failures mean a referenced row is missing.
fn constraint_error(err: sqlx::Error, conflict_msg: &str, fk_msg: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        let msg = db_err.message();
        if msg.contains("UNIQUE constraint failed") {
            return StoreError::conflict(conflict_msg);
        }
        if msg.contains("FOREIGN KEY constraint failed") {
            return StoreError::validation(fk_msg);
        }
    }
    StoreError::Database(err)
}

/// Derived per-habit statistics. Never persisted; recomputed per request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub habit_id: String,
    /// The reference day the streak and week are computed against.
    pub date: NaiveDate,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub weekly_count: u32,
    pub monthly_count: u32,
    /// Monday through Sunday of the reference week.
    pub week: Vec<WeekDay>,
}

#[derive(Clone)]
pub struct HabitStore {
    pool: DbPool,
}

impl HabitStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub async fn create_user(&self, name: &str, email: &str) -> Result<User, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::validation("Name is required"));
        }
        if email.trim().is_empty() {
            return Err(StoreError::validation("Email is required"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, name, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            constraint_error(
                e,
                "A user with this email already exists",
                "Referenced resource does not exist",
            )
        })?;

        self.get_user(&id).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("User not found"))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// A user plus all of their habits (newest-created first), each habit
    /// carrying its completions newest-first.
    pub async fn get_user_with_habits(&self, user_id: &str) -> Result<UserWithHabits, StoreError> {
        let user = self.get_user(user_id).await?;
        let habits = self.list_habits(user_id).await?;
        Ok(UserWithHabits::new(user, habits))
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        req: &UpdateUserRequest,
    ) -> Result<User, StoreError> {
        // Existence check first so an absent user is a 404, not a no-op.
        let _existing = self.get_user(user_id).await?;

        if let Some(ref name) = req.name {
            if name.trim().is_empty() {
                return Err(StoreError::validation("Name cannot be empty"));
            }
        }
        if let Some(ref email) = req.email {
            if email.trim().is_empty() {
                return Err(StoreError::validation("Email cannot be empty"));
            }
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&now)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            constraint_error(
                e,
                "A user with this email already exists",
                "Referenced resource does not exist",
            )
        })?;

        self.get_user(user_id).await
    }

    /// Delete a user. The schema's ON DELETE CASCADE rules remove their
    /// habits and all completions in the same transaction.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User not found"));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Habits
    // -------------------------------------------------------------------------

    pub async fn create_habit(
        &self,
        user_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<HabitWithCompletions, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::validation("Title is required"));
        }
        if user_id.trim().is_empty() {
            return Err(StoreError::validation("User ID is required"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO habits (id, title, description, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(title)
        .bind(description)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            constraint_error(
                e,
                "Habit already exists",
                "User does not exist",
            )
        })?;

        self.get_habit(&id).await
    }

    /// All habits for a user, newest-created first. An unknown or habit-less
    /// user yields an empty list, not an error.
    pub async fn list_habits(&self, user_id: &str) -> Result<Vec<HabitWithCompletions>, StoreError> {
        let habits = sqlx::query_as::<_, Habit>(
            "SELECT * FROM habits WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut results = Vec::with_capacity(habits.len());
        for habit in habits {
            let completions = self.completions_for_habit(&habit.id).await?;
            results.push(HabitWithCompletions::new(habit, completions));
        }
        Ok(results)
    }

    pub async fn get_habit(&self, habit_id: &str) -> Result<HabitWithCompletions, StoreError> {
        let habit = sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = ?")
            .bind(habit_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Habit not found"))?;

        let completions = self.completions_for_habit(habit_id).await?;
        Ok(HabitWithCompletions::new(habit, completions))
    }

    pub async fn update_habit(
        &self,
        habit_id: &str,
        req: &UpdateHabitRequest,
    ) -> Result<HabitWithCompletions, StoreError> {
        let _existing = self.get_habit(habit_id).await?;

        if let Some(ref title) = req.title {
            if title.trim().is_empty() {
                return Err(StoreError::validation("Title cannot be empty"));
            }
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE habits SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&now)
        .bind(habit_id)
        .execute(&self.pool)
        .await?;

        self.get_habit(habit_id).await
    }

    /// Delete a habit; its completions go with it via ON DELETE CASCADE.
    pub async fn delete_habit(&self, habit_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM habits WHERE id = ?")
            .bind(habit_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Habit not found"));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Completions
    // -------------------------------------------------------------------------

    /// Mark a habit complete for a calendar day. The input date is normalized
    /// to its day before storage; marking the same day twice is a conflict,
    /// guaranteed by the (habit_id, user_id, date) UNIQUE constraint even
    /// under concurrent inserts.
    pub async fn mark_complete(
        &self,
        habit_id: &str,
        user_id: &str,
        date: &str,
    ) -> Result<HabitCompletion, StoreError> {
        if habit_id.trim().is_empty() {
            return Err(StoreError::validation("Habit ID is required"));
        }
        if user_id.trim().is_empty() {
            return Err(StoreError::validation("User ID is required"));
        }

        let day = calendar::normalize_day(date).map_err(StoreError::Validation)?;
        let day = day.format(calendar::DAY_FORMAT).to_string();

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO habit_completions (id, habit_id, user_id, date, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(habit_id)
        .bind(user_id)
        .bind(&day)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            constraint_error(
                e,
                "Habit already completed for this date",
                "Habit or user does not exist",
            )
        })?;

        let completion =
            sqlx::query_as::<_, HabitCompletion>("SELECT * FROM habit_completions WHERE id = ?")
                .bind(&id)
                .fetch_one(&self.pool)
                .await?;

        Ok(completion)
    }

    /// Remove the completion for a calendar day. The date is normalized the
    /// same way as in [`mark_complete`], so any instant during the day
    /// addresses the same stored row.
    pub async fn unmark_complete(
        &self,
        habit_id: &str,
        user_id: &str,
        date: &str,
    ) -> Result<(), StoreError> {
        let day = calendar::normalize_day(date).map_err(StoreError::Validation)?;
        let day = day.format(calendar::DAY_FORMAT).to_string();

        let result = sqlx::query(
            "DELETE FROM habit_completions WHERE habit_id = ? AND user_id = ? AND date = ?",
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(&day)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Habit completion not found"));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Derived statistics
    // -------------------------------------------------------------------------

    /// Streak and weekly statistics for a habit as of `reference`.
    pub async fn habit_stats(
        &self,
        habit_id: &str,
        reference: NaiveDate,
    ) -> Result<HabitStats, StoreError> {
        // 404 for an unknown habit, before any computation.
        let habit = sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = ?")
            .bind(habit_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Habit not found"))?;

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT date FROM habit_completions WHERE habit_id = ?")
                .bind(&habit.id)
                .fetch_all(&self.pool)
                .await?;

        let completed: HashSet<NaiveDate> = rows
            .iter()
            .filter_map(|(d,)| NaiveDate::parse_from_str(d, calendar::DAY_FORMAT).ok())
            .collect();

        Ok(HabitStats {
            habit_id: habit.id,
            date: reference,
            current_streak: calendar::current_streak(&completed, reference),
            longest_streak: calendar::longest_streak(&completed),
            weekly_count: calendar::weekly_count(&completed, reference),
            monthly_count: calendar::monthly_count(&completed, reference),
            week: calendar::weekly_view(&completed, reference),
        })
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    async fn completions_for_habit(
        &self,
        habit_id: &str,
    ) -> Result<Vec<HabitCompletion>, StoreError> {
        let completions = sqlx::query_as::<_, HabitCompletion>(
            "SELECT * FROM habit_completions WHERE habit_id = ? ORDER BY date DESC",
        )
        .bind(habit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(completions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn test_store() -> HabitStore {
        let pool = db::init_in_memory().await.unwrap();
        HabitStore::new(pool)
    }

    async fn completion_count(store: &HabitStore) -> i64 {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM habit_completions")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        count.0
    }

    async fn habit_count(store: &HabitStore) -> i64 {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM habits")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        count.0
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, calendar::DAY_FORMAT).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_and_fetch() {
        let store = test_store().await;

        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");

        let fetched = store.get_user(&user.id).await.unwrap();
        assert_eq!(fetched.id, user.id);

        let with_habits = store.get_user_with_habits(&user.id).await.unwrap();
        assert!(with_habits.habits.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_and_keeps_original() {
        let store = test_store().await;

        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let err = store
            .create_user("Not Ada", "ada@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The original record is untouched.
        let fetched = store.get_user(&user.id).await.unwrap();
        assert_eq!(fetched.name, "Ada");
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let store = test_store().await;

        assert!(matches!(
            store.create_user("", "ada@example.com").await.unwrap_err(),
            StoreError::Validation(_)
        ));
        assert!(matches!(
            store.create_user("Ada", "").await.unwrap_err(),
            StoreError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();

        let updated = store
            .update_user(
                &user.id,
                &UpdateUserRequest {
                    name: Some("Ada Lovelace".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_update_user_email_collision() {
        let store = test_store().await;
        store.create_user("Ada", "ada@example.com").await.unwrap();
        let grace = store
            .create_user("Grace", "grace@example.com")
            .await
            .unwrap();

        let err = store
            .update_user(
                &grace.id,
                &UpdateUserRequest {
                    name: None,
                    email: Some("ada@example.com".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let store = test_store().await;

        assert!(matches!(
            store.get_user("nope").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            store.delete_user("nope").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            store
                .update_user("nope", &UpdateUserRequest::default())
                .await
                .unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_create_and_list_habits_ordering() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();

        let first = store
            .create_habit(&user.id, "Read", Some("30 minutes"))
            .await
            .unwrap();
        let second = store.create_habit(&user.id, "Run", None).await.unwrap();

        assert!(first.completions.is_empty());

        let habits = store.list_habits(&user.id).await.unwrap();
        assert_eq!(habits.len(), 2);
        // Newest-created first.
        assert_eq!(habits[0].id, second.id);
        assert_eq!(habits[1].id, first.id);
    }

    #[tokio::test]
    async fn test_list_habits_empty_for_habitless_user() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();

        let habits = store.list_habits(&user.id).await.unwrap();
        assert!(habits.is_empty());
    }

    #[tokio::test]
    async fn test_create_habit_validation() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();

        assert!(matches!(
            store.create_habit(&user.id, "", None).await.unwrap_err(),
            StoreError::Validation(_)
        ));
        // Unknown user trips the foreign key, which surfaces as validation.
        assert!(matches!(
            store.create_habit("ghost", "Read", None).await.unwrap_err(),
            StoreError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_update_habit_partial() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store
            .create_habit(&user.id, "Read", Some("30 minutes"))
            .await
            .unwrap();

        let updated = store
            .update_habit(
                &habit.id,
                &UpdateHabitRequest {
                    title: Some("Read more".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Read more");
        assert_eq!(updated.description.as_deref(), Some("30 minutes"));
    }

    #[tokio::test]
    async fn test_mark_twice_conflicts_with_one_row() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        let completion = store
            .mark_complete(&habit.id, &user.id, "2024-01-05")
            .await
            .unwrap();
        assert_eq!(completion.date, "2024-01-05");

        let err = store
            .mark_complete(&habit.id, &user.id, "2024-01-05")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(completion_count(&store).await, 1);
    }

    #[tokio::test]
    async fn test_mark_unmark_round_trip() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        assert_eq!(completion_count(&store).await, 0);

        store
            .mark_complete(&habit.id, &user.id, "2024-01-05")
            .await
            .unwrap();
        assert_eq!(completion_count(&store).await, 1);

        store
            .unmark_complete(&habit.id, &user.id, "2024-01-05")
            .await
            .unwrap();
        assert_eq!(completion_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_datetime_inputs_normalize_to_same_day() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        let completion = store
            .mark_complete(&habit.id, &user.id, "2024-01-05T23:59:00Z")
            .await
            .unwrap();
        assert_eq!(completion.date, "2024-01-05");

        // A different instant on the same day addresses the same row.
        let err = store
            .mark_complete(&habit.id, &user.id, "2024-01-05T00:00:01Z")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store
            .unmark_complete(&habit.id, &user.id, "2024-01-05T00:00:01Z")
            .await
            .unwrap();
        assert_eq!(completion_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_unmark_missing_is_not_found() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        let err = store
            .unmark_complete(&habit.id, &user.id, "2024-01-05")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_complete_invalid_date() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        let err = store
            .mark_complete(&habit.id, &user.id, "yesterday")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_completions_ordered_newest_first() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        for day in ["2024-01-03", "2024-01-05", "2024-01-04"] {
            store.mark_complete(&habit.id, &user.id, day).await.unwrap();
        }

        let fetched = store.get_habit(&habit.id).await.unwrap();
        let dates: Vec<&str> = fetched.completions.iter().map(|c| c.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-04", "2024-01-03"]);
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();
        store
            .mark_complete(&habit.id, &user.id, "2024-01-05")
            .await
            .unwrap();

        store.delete_user(&user.id).await.unwrap();

        assert_eq!(habit_count(&store).await, 0);
        assert_eq!(completion_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_delete_habit_cascades_completions() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();
        store
            .mark_complete(&habit.id, &user.id, "2024-01-04")
            .await
            .unwrap();
        store
            .mark_complete(&habit.id, &user.id, "2024-01-05")
            .await
            .unwrap();

        store.delete_habit(&habit.id).await.unwrap();

        assert_eq!(completion_count(&store).await, 0);
        // The user survives.
        assert!(store.get_user(&user.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_habit_stats_streak() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        for day in ["2024-01-03", "2024-01-04", "2024-01-05"] {
            store.mark_complete(&habit.id, &user.id, day).await.unwrap();
        }

        let stats = store
            .habit_stats(&habit.id, date("2024-01-05"))
            .await
            .unwrap();
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
    }

    #[tokio::test]
    async fn test_habit_stats_week_grid() {
        let store = test_store().await;
        let user = store.create_user("Ada", "ada@example.com").await.unwrap();
        let habit = store.create_habit(&user.id, "Read", None).await.unwrap();

        store
            .mark_complete(&habit.id, &user.id, "2024-01-10")
            .await
            .unwrap();

        // Wednesday 2024-01-10 lives in the week Mon 01-08 .. Sun 01-14.
        let stats = store
            .habit_stats(&habit.id, date("2024-01-10"))
            .await
            .unwrap();
        assert_eq!(stats.week.len(), 7);
        assert_eq!(stats.week[0].date, date("2024-01-08"));
        assert_eq!(stats.week[6].date, date("2024-01-14"));
        assert!(stats.week[2].completed);
        assert_eq!(stats.weekly_count, 1);
        assert_eq!(stats.monthly_count, 1);
    }

    #[tokio::test]
    async fn test_habit_stats_unknown_habit() {
        let store = test_store().await;
        let err = store
            .habit_stats("ghost", date("2024-01-05"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
