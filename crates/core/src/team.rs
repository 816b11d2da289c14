use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Team (tenant) identifier narrowing where a grant applies.
///
/// Team ids are opaque host-defined strings. An empty string means "no team"
/// and never produces a `TeamId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(String);

impl TeamId {
    /// Creates a team identifier, rejecting empty or whitespace-only values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "team id must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Maps an optional raw team value, treating blank input as "no team".
    #[must_use]
    pub fn from_optional(value: &str) -> Option<Self> {
        Self::new(value).ok()
    }

    /// Returns the raw team value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<TeamId> for String {
    fn from(value: TeamId) -> Self {
        value.0
    }
}

impl Display for TeamId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}
