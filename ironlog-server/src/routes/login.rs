//! Exchanges an identity-provider credential for a locally signed bearer
//! token.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use ironlog::StoreError;
use ironlog::auth::IssuedToken;
use ironlog::auth::token::TOKEN_VALIDITY_HOURS;
use log::info;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::TOKEN_COOKIE;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub credential: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn token_cookie(issued: &IssuedToken) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, issued.token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::hours(TOKEN_VALIDITY_HOURS))
        .expires(OffsetDateTime::from_unix_timestamp(issued.expires_at.timestamp()).ok())
        .build()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Json(LoginRequest { credential }) = payload?;

    let identity = state.identity.verify(&credential).await?;
    let user = match state.repo.find_user_by_email(&identity.email).await {
        Err(StoreError::NotFound) => {
            info!("Login rejected: identity has no provisioned user");
            return Err(ApiError::NotFound);
        }
        other => other?,
    };

    let issued = state.tokens.issue(user.id)?;
    info!("User {} logged in", user.id);

    Ok((
        jar.add(token_cookie(&issued)),
        Json(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    ))
}
