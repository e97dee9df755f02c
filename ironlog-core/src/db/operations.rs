use chrono::{SubsecRound, Utc};
use log::debug;
use sqlx::SqlitePool;

use crate::db::models::{DATE_TIME_FORMAT, NewUser, User, Workout, WorkoutSession, WorkoutSet};
use crate::error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Workout names are stored and compared trimmed and lower-cased.
pub fn normalize_workout_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Emails are stored and compared lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Users
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<User> {
    let email = normalize_email(&user.email);

    let result = sqlx::query("INSERT INTO users (email, name) VALUES (?1, ?2)")
        .bind(&email)
        .bind(&user.name)
        .execute(pool)
        .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        email,
        name: user.name.clone(),
    })
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT id, email, name FROM users WHERE email = ?1")
        .bind(normalize_email(email))
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}

// Sessions
pub async fn create_session(pool: &SqlitePool, user_id: i64) -> Result<WorkoutSession> {
    let date_time = Utc::now().naive_utc().trunc_subsecs(0);

    let result = sqlx::query("INSERT INTO workout_sessions (user_id, date_time) VALUES (?1, ?2)")
        .bind(user_id)
        .bind(date_time.format(DATE_TIME_FORMAT).to_string())
        .execute(pool)
        .await?;

    Ok(WorkoutSession {
        id: result.last_insert_rowid(),
        user_id,
        date_time,
    })
}

pub async fn list_sessions(pool: &SqlitePool, user_id: i64) -> Result<Vec<WorkoutSession>> {
    sqlx::query_as::<_, WorkoutSession>(
        "SELECT id, user_id, date_time FROM workout_sessions WHERE user_id = ?1 ORDER BY id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

// Workouts

/// Inserts only when `session_id` belongs to `user_id`; otherwise nothing is
/// written and the call fails with `NotFound`.
pub async fn create_workout(
    pool: &SqlitePool,
    session_id: i64,
    workout_name: &str,
    user_id: i64,
) -> Result<Workout> {
    let workout_name = normalize_workout_name(workout_name);

    let result = sqlx::query(
        "INSERT INTO workouts (session_id, workout_name, user_id)
         SELECT s.id, ?2, s.user_id FROM workout_sessions s
         WHERE s.id = ?1 AND s.user_id = ?3",
    )
    .bind(session_id)
    .bind(&workout_name)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        debug!(
            "Session {} not found for user {} while creating workout",
            session_id, user_id
        );
        return Err(StoreError::NotFound);
    }

    Ok(Workout {
        id: result.last_insert_rowid(),
        session_id,
        workout_name,
        user_id,
    })
}

pub async fn list_workouts(pool: &SqlitePool, session_id: i64) -> Result<Vec<Workout>> {
    sqlx::query_as::<_, Workout>(
        "SELECT id, session_id, workout_name, user_id FROM workouts
         WHERE session_id = ?1 ORDER BY id DESC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Id of the prior occurrence of `workout_name` for the user, skipping the
/// most recent one.
pub async fn find_previous_workout_id(
    pool: &SqlitePool,
    workout_name: &str,
    user_id: i64,
) -> Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>(
        "SELECT id FROM workouts
         WHERE workout_name = ?1 AND user_id = ?2
         ORDER BY id DESC
         LIMIT 1 OFFSET 1",
    )
    .bind(normalize_workout_name(workout_name))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

// Sets

/// Appends a set to a workout owned by `user_id`. Fails with `NotFound` when
/// the workout is missing or belongs to someone else.
pub async fn create_set(
    pool: &SqlitePool,
    workout_id: i64,
    user_id: i64,
    number_of_reps: i64,
    weight: f64,
) -> Result<WorkoutSet> {
    let result = sqlx::query(
        "INSERT INTO workout_sets (workout_id, number_of_reps, weight)
         SELECT w.id, ?2, ?3 FROM workouts w
         WHERE w.id = ?1 AND w.user_id = ?4",
    )
    .bind(workout_id)
    .bind(number_of_reps)
    .bind(weight)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        debug!(
            "Workout {} not found for user {} while adding set",
            workout_id, user_id
        );
        return Err(StoreError::NotFound);
    }

    Ok(WorkoutSet {
        id: result.last_insert_rowid(),
        workout_id,
        number_of_reps,
        weight,
    })
}

pub async fn list_sets(pool: &SqlitePool, workout_id: i64) -> Result<Vec<WorkoutSet>> {
    sqlx::query_as::<_, WorkoutSet>(
        "SELECT id, workout_id, number_of_reps, weight FROM workout_sets
         WHERE workout_id = ?1 ORDER BY id DESC",
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}
