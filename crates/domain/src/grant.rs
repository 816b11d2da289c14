//! Grant facts linking resources to permissions and roles.

use chrono::{DateTime, Utc};
use rolegate_core::TeamId;
use serde::{Deserialize, Serialize};

use crate::catalog::{PermissionId, RoleId};
use crate::resource::ResourceKey;

/// Status written by team-wide deactivation.
pub const GRANT_STATUS_INACTIVE: &str = "inactive";

/// Conventional status for live assignments.
pub const GRANT_STATUS_ACTIVE: &str = "active";

/// Storage identity of a grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrantId(i64);

impl GrantId {
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

/// What a grant row links its resource to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrantKind {
    /// The resource holds a permission (also used for role→permission rows).
    Direct {
        /// Granted permission.
        permission_id: PermissionId,
    },
    /// The resource holds a role and inherits that role's permissions.
    RoleLink {
        /// Linked role.
        role_id: RoleId,
    },
}

impl GrantKind {
    /// Returns the permission for direct grants.
    #[must_use]
    pub fn permission_id(&self) -> Option<PermissionId> {
        match self {
            Self::Direct { permission_id } => Some(*permission_id),
            Self::RoleLink { .. } => None,
        }
    }

    /// Returns the role for role links.
    #[must_use]
    pub fn role_id(&self) -> Option<RoleId> {
        match self {
            Self::Direct { .. } => None,
            Self::RoleLink { role_id } => Some(*role_id),
        }
    }

    /// Rebuilds a kind from the two nullable storage columns.
    ///
    /// Returns `None` unless exactly one column is set.
    #[must_use]
    pub fn from_columns(permission_id: Option<i64>, role_id: Option<i64>) -> Option<Self> {
        match (permission_id, role_id) {
            (Some(permission_id), None) => Some(Self::Direct {
                permission_id: PermissionId::new(permission_id),
            }),
            (None, Some(role_id)) => Some(Self::RoleLink {
                role_id: RoleId::new(role_id),
            }),
            _ => None,
        }
    }
}

/// Insert payload for one grant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrant {
    /// Permission or role the row links to.
    pub kind: GrantKind,
    /// Resource holding the grant.
    pub resource: ResourceKey,
    /// Team scope, absent for unscoped grants.
    pub team_id: Option<TeamId>,
    /// Action verb; empty on role links.
    pub action: String,
    /// Free-form status.
    pub status: String,
    /// Free-form remarks.
    pub remarks: String,
}

/// One persisted grant fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedPermission {
    /// Row identity.
    pub id: GrantId,
    /// Permission or role the row links to.
    pub kind: GrantKind,
    /// Resource holding the grant.
    pub resource: ResourceKey,
    /// Team scope, absent for unscoped grants.
    pub team_id: Option<TeamId>,
    /// Action verb; empty on role links.
    pub action: String,
    /// Free-form status such as `"active"` or `"inactive"`.
    pub status: String,
    /// Free-form remarks.
    pub remarks: String,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AssignedPermission {
    /// Materializes an insert payload as a stored row.
    #[must_use]
    pub fn from_new(id: GrantId, grant: NewGrant, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: grant.kind,
            resource: grant.resource,
            team_id: grant.team_id,
            action: grant.action,
            status: grant.status,
            remarks: grant.remarks,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns whether the row has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns whether the row carries the inactive status.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        self.status == GRANT_STATUS_INACTIVE
    }
}
