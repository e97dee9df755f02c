use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use ironlog::db::models::WorkoutSession;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_sessions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<WorkoutSession>>, ApiError> {
    let sessions = state.repo.list_sessions(user.user_id()).await?;
    Ok(Json(sessions))
}

pub async fn create_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<WorkoutSession>), ApiError> {
    let session = state.repo.create_session(user.user_id()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}
