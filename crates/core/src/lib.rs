//! Shared primitives for all Rust crates in Tessera.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Tessera crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request construction, connection or response decoding failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// An upstream entity could not be turned into a graph resource.
    #[error("translation error: {0}")]
    Translation(String),

    /// Credentials were rejected or resolved to an unusable identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Grant or revoke was requested for a principal of the wrong resource type.
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    /// The principal already holds the membership being granted.
    #[error("already granted: {0}")]
    AlreadyGranted(String),

    /// The principal does not hold the membership being revoked.
    #[error("not granted: {0}")]
    NotGranted(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation is not offered by this resource type.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Prefixes the error message with caller context, keeping the category.
    #[must_use]
    pub fn context(self, context: &str) -> Self {
        match self {
            Self::Configuration(message) => Self::Configuration(format!("{context}: {message}")),
            Self::Transport(message) => Self::Transport(format!("{context}: {message}")),
            Self::Translation(message) => Self::Translation(format!("{context}: {message}")),
            Self::Unauthorized(message) => Self::Unauthorized(format!("{context}: {message}")),
            Self::InvalidPrincipal(message) => {
                Self::InvalidPrincipal(format!("{context}: {message}"))
            }
            Self::AlreadyGranted(message) => Self::AlreadyGranted(format!("{context}: {message}")),
            Self::NotGranted(message) => Self::NotGranted(format!("{context}: {message}")),
            Self::NotFound(message) => Self::NotFound(format!("{context}: {message}")),
            Self::Unsupported(message) => Self::Unsupported(format!("{context}: {message}")),
            Self::Validation(message) => Self::Validation(format!("{context}: {message}")),
            Self::Internal(message) => Self::Internal(format!("{context}: {message}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_keeps_original_value() {
        let value = NonEmptyString::new(" admin ");
        assert_eq!(value.map(String::from).unwrap_or_default(), " admin ");
    }

    #[test]
    fn context_preserves_category() {
        let error = AppError::Transport("connection refused".to_owned())
            .context("error listing organizations");

        assert!(matches!(error, AppError::Transport(_)));
        assert_eq!(
            error.to_string(),
            "transport error: error listing organizations: connection refused"
        );
    }
}
