use serde::Serialize;

pub type AuthResult<T> = Result<T, AuthError>;

/// Error taxonomy for the authorization core.
///
/// Expected denials (insufficient permissions, cross-tenant access, lockout)
/// are returned as structured *values* by the decision functions; this enum is
/// what the server layer maps those values onto, plus the genuinely
/// exceptional cases (database failures, malformed policy keys).
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("account locked: try again in {minutes_remaining} minute(s)")]
    AccountLocked { minutes_remaining: i64 },
    /// Reserved for a future throttling layer; never produced by this crate.
    #[error("rate limited")]
    RateLimited,
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable kind, for the server layer's error payloads.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::NotFound(_) => ErrorKind::NotFound,
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::AccountLocked { .. } => ErrorKind::AccountLocked,
            AuthError::RateLimited => ErrorKind::RateLimited,
            AuthError::Database(_) => ErrorKind::Database,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    Validation,
    AccountLocked,
    RateLimited,
    Database,
    Internal,
}

impl From<anyhow::Error> for AuthError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}
