//! The capability contract shared by everything that can hold grants.

use rolegate_core::{AppError, AppResult, TeamId};
use serde::{Deserialize, Serialize};

/// Resource kind exposed by roles.
pub const ROLE_RESOURCE_KIND: &str = "role";

/// Anything that can hold grants: a user, a service account, a role.
///
/// Implementations must be deterministic: the same value always reports the
/// same kind, id, and team.
pub trait Resource: Send + Sync {
    /// Namespace discriminator such as `"user"` or `"role"`.
    fn resource_kind(&self) -> &str;

    /// Identifier unique within the resource kind.
    fn resource_id(&self) -> String;

    /// Team the resource acts within, if any.
    fn team_id(&self) -> Option<&TeamId>;

    /// Team value as a plain string, empty when there is no team.
    fn team_id_value(&self) -> &str {
        self.team_id().map(TeamId::as_str).unwrap_or_default()
    }

    /// Returns the validated `(kind, id)` pair grants are keyed by.
    fn resource_key(&self) -> AppResult<ResourceKey> {
        ResourceKey::new(self.resource_kind(), self.resource_id())
    }
}

/// The `(kind, id)` pair a grant row is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    kind: String,
    id: String,
}

impl ResourceKey {
    /// Creates a resource key, requiring both parts to be non-blank.
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> AppResult<Self> {
        let kind = kind.into();
        let id = id.into();

        if kind.trim().is_empty() {
            return Err(AppError::Validation(
                "resource kind must not be empty".to_owned(),
            ));
        }
        if id.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "resource id must not be empty for kind '{kind}'"
            )));
        }

        Ok(Self { kind, id })
    }

    /// Returns the resource kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind.as_str()
    }

    /// Returns the resource id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.kind, self.id)
    }
}

/// General-purpose resource value for hosts that do not implement
/// [`Resource`] on their own types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    key: ResourceKey,
    team_id: Option<TeamId>,
}

impl ResourceRef {
    /// Creates an unscoped resource reference.
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            key: ResourceKey::new(kind, id)?,
            team_id: None,
        })
    }

    /// Returns a copy scoped to the given team.
    #[must_use]
    pub fn in_team(self, team_id: TeamId) -> Self {
        Self {
            team_id: Some(team_id),
            ..self
        }
    }

    /// Returns the underlying resource key.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }
}

impl Resource for ResourceRef {
    fn resource_kind(&self) -> &str {
        self.key.kind()
    }

    fn resource_id(&self) -> String {
        self.key.id().to_owned()
    }

    fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    fn resource_key(&self) -> AppResult<ResourceKey> {
        Ok(self.key.clone())
    }
}
