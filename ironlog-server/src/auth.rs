//! Bearer-token gate for every route except `/health` and `/login`.
//!
//! The token is taken from `Authorization: Bearer <token>` or, failing that,
//! from the `token` cookie set at login. A verified caller is stored in the
//! request extensions as an [`AuthenticatedUser`] and handed to handlers
//! through [`CurrentUser`].

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use ironlog::auth::AuthenticatedUser;
use log::warn;

use crate::error::ApiError;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "token";

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|token| !token.is_empty())
        .map(str::to_owned);

    from_header.or_else(|| {
        CookieJar::from_headers(headers)
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|token| !token.is_empty())
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        warn!(
            "Rejecting {} {}: no bearer credential",
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::Unauthenticated);
    };

    let user = state.tokens.verify(&token).inspect_err(|_| {
        warn!(
            "Rejecting {} {}: invalid bearer credential",
            request.method(),
            request.uri().path()
        );
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// The caller verified by [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub AuthenticatedUser);

impl CurrentUser {
    pub fn user_id(&self) -> i64 {
        self.0.user_id()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}
