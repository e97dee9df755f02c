use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use ironlog::db::models::{Workout, WorkoutSet};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutRequest {
    pub session_id: i64,
    pub workout_name: String,
}

#[derive(Debug, Serialize)]
pub struct WorkoutWithSets {
    #[serde(flatten)]
    pub workout: Workout,
    pub sets: Vec<WorkoutSet>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastWorkout {
    pub workout_id: Option<i64>,
}

/// Workouts of a session, newest-first, each with its sets.
pub async fn list_workouts(
    State(state): State<AppState>,
    _user: CurrentUser,
    session_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<WorkoutWithSets>>, ApiError> {
    let Path(session_id) = session_id?;

    let workouts = state.repo.list_workouts(session_id).await?;
    let mut result = Vec::with_capacity(workouts.len());
    for workout in workouts {
        let sets = state.repo.list_sets(workout.id).await?;
        result.push(WorkoutWithSets { workout, sets });
    }

    Ok(Json(result))
}

pub async fn create_workout(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateWorkoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Workout>), ApiError> {
    let Json(request) = payload?;

    if request.workout_name.trim().is_empty() {
        return Err(ApiError::InvalidInput("workoutName must not be empty".into()));
    }

    let workout = state
        .repo
        .create_workout(request.session_id, &request.workout_name, user.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn last_workout(
    State(state): State<AppState>,
    user: CurrentUser,
    workout_name: Result<Path<String>, PathRejection>,
) -> Result<Json<LastWorkout>, ApiError> {
    let Path(workout_name) = workout_name?;

    let workout_id = state
        .repo
        .find_previous_workout_id(&workout_name, user.user_id())
        .await?;
    Ok(Json(LastWorkout { workout_id }))
}
