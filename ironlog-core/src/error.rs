use thiserror::Error;

/// Failures surfaced by the repository. Store-specific error codes are
/// classified here so callers only ever branch on these variants.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("referenced resource not found")]
    NotFound,
    #[error("resource already exists")]
    DuplicateResource,
    #[error("store error: {0}")]
    Internal(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateResource
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::NotFound
            }
            _ => StoreError::Internal(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Uniform outcome for every bearer-token failure.
    #[error("token is invalid or expired")]
    TokenInvalid,
    #[error("identity assertion rejected: {0}")]
    IdentityInvalid(String),
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(#[from] reqwest::Error),
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
