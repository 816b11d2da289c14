//! Shared primitives for all Rust crates in Rolegate.

#![forbid(unsafe_code)]

/// Team scoping primitives shared across crates.
pub mod team;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use team::TeamId;

/// Result type used across Rolegate crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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

/// Common error categories for catalog, assignment, and authorization work.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// A permission or role with the same machine name already exists.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying storage operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The current principal could not be resolved from the call context.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The principal holds no grant for the requested permission and actions.
    #[error("permission denied: '{permission}' for actions [{}]", .actions.join(", "))]
    PermissionDenied {
        /// Machine name of the requested permission.
        permission: String,
        /// Requested actions, any of which would have satisfied the check.
        actions: Vec<String>,
    },
}

impl AppError {
    /// Returns whether this error is an authorization denial.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
