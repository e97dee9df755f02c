use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use ironlog::db::models::WorkoutSet;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSetRequest {
    pub workout_id: i64,
    pub number_of_reps: i64,
    pub weight: f64,
}

pub async fn list_sets(
    State(state): State<AppState>,
    _user: CurrentUser,
    workout_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<WorkoutSet>>, ApiError> {
    let Path(workout_id) = workout_id?;
    let sets = state.repo.list_sets(workout_id).await?;
    Ok(Json(sets))
}

pub async fn create_set(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateSetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkoutSet>), ApiError> {
    let Json(request) = payload?;

    if request.number_of_reps < 0 {
        return Err(ApiError::InvalidInput("numberOfReps must not be negative".into()));
    }
    if !request.weight.is_finite() {
        return Err(ApiError::InvalidInput("weight must be a finite number".into()));
    }

    let set = state
        .repo
        .create_set(
            request.workout_id,
            user.user_id(),
            request.number_of_reps,
            request.weight,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(set)))
}
