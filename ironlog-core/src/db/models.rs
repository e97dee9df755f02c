use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Timestamp layout stored in `workout_sessions.date_time`.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// User models
#[derive(FromRow, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

// Session models
#[derive(FromRow, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: i64,
    pub user_id: i64,
    /// UTC creation time.
    pub date_time: NaiveDateTime,
}

// Workout models
#[derive(FromRow, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: i64,
    pub session_id: i64,
    pub workout_name: String,
    pub user_id: i64,
}

// Set models
#[derive(FromRow, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: i64,
    pub workout_id: i64,
    pub number_of_reps: i64,
    pub weight: f64,
}
