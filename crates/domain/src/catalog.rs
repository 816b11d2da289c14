//! Permission and role catalog entries.

use rolegate_core::{AppResult, NonEmptyString, TeamId};
use serde::{Deserialize, Serialize};

use crate::resource::{ROLE_RESOURCE_KIND, Resource};

/// Storage identity of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Wraps a storage-assigned identifier.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Storage identity of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(i64);

impl RoleId {
    /// Wraps a storage-assigned identifier.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated title, machine name, and description shared by catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDetails {
    title: NonEmptyString,
    name: NonEmptyString,
    description: Option<String>,
}

impl CatalogDetails {
    /// Validates catalog fields. A blank description is stored as absent.
    pub fn new(
        title: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        let name = name.into();
        let description = description.into();

        Ok(Self {
            title: NonEmptyString::new(title)?,
            name: NonEmptyString::new(name.trim())?,
            description: (!description.trim().is_empty()).then_some(description),
        })
    }

    /// Returns the human title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the unique machine name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named capability that may be granted per action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    details: CatalogDetails,
}

impl Permission {
    /// Creates a permission from its persisted identity and details.
    #[must_use]
    pub fn new(id: PermissionId, details: CatalogDetails) -> Self {
        Self { id, details }
    }

    /// Returns the permission identity.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the human title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.details.title()
    }

    /// Returns the unique machine name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.details.description()
    }

    /// Returns the validated catalog details.
    #[must_use]
    pub fn details(&self) -> &CatalogDetails {
        &self.details
    }

    /// Replaces title, name, and description while keeping the identity.
    #[must_use]
    pub fn with_details(self, details: CatalogDetails) -> Self {
        Self { details, ..self }
    }
}

/// A flat bundle of permission grants assignable to resources.
///
/// Roles are resources themselves: permissions are granted to a role by
/// assigning them to the role's resource key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    details: CatalogDetails,
}

impl Role {
    /// Creates a role from its persisted identity and details.
    #[must_use]
    pub fn new(id: RoleId, details: CatalogDetails) -> Self {
        Self { id, details }
    }

    /// Returns the role identity.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the human title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.details.title()
    }

    /// Returns the unique machine name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.details.description()
    }

    /// Returns the validated catalog details.
    #[must_use]
    pub fn details(&self) -> &CatalogDetails {
        &self.details
    }

    /// Replaces title, name, and description while keeping the identity.
    #[must_use]
    pub fn with_details(self, details: CatalogDetails) -> Self {
        Self { details, ..self }
    }
}

impl Resource for Role {
    fn resource_kind(&self) -> &str {
        ROLE_RESOURCE_KIND
    }

    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn team_id(&self) -> Option<&TeamId> {
        None
    }
}
