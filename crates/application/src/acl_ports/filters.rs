use rolegate_core::{AppResult, TeamId};
use rolegate_domain::{
    AssignedPermission, GrantKind, PermissionId, ROLE_RESOURCE_KIND, ResourceKey, RoleId,
};

/// Team predicate applied to grant rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TeamScope {
    /// Ignore the team column entirely.
    #[default]
    Any,
    /// Require the team column to equal this team.
    Team(TeamId),
}

impl TeamScope {
    /// Returns whether a row's team value satisfies the scope.
    #[must_use]
    pub fn matches(&self, team_id: Option<&TeamId>) -> bool {
        match self {
            Self::Any => true,
            Self::Team(expected) => team_id == Some(expected),
        }
    }
}

/// Grant-kind predicate applied to grant rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrantKindFilter {
    /// Both direct grants and role links.
    #[default]
    Any,
    /// Only rows carrying a permission.
    Direct,
    /// Only rows carrying a role.
    RoleLink,
}

/// Conjunction of optional predicates over grant rows.
///
/// Soft-deleted rows match only when `include_deleted` is set. A set-valued
/// predicate holding an empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
    /// Resource the row is attached to.
    pub resource: Option<ResourceKey>,
    /// Row kind.
    pub kind: GrantKindFilter,
    /// Permission ids, for direct rows.
    pub permission_ids: Option<Vec<PermissionId>>,
    /// Role ids, for role links.
    pub role_ids: Option<Vec<RoleId>>,
    /// Team predicate.
    pub team: TeamScope,
    /// Accepted action values.
    pub actions: Option<Vec<String>>,
    /// Status value that disqualifies a row.
    pub excluded_status: Option<String>,
    /// Whether soft-deleted rows match.
    pub include_deleted: bool,
}

impl GrantFilter {
    /// Filter over all rows attached to a resource.
    #[must_use]
    pub fn for_resource(resource: ResourceKey) -> Self {
        Self {
            resource: Some(resource),
            ..Self::default()
        }
    }

    /// Filter over all rows scoped to a team.
    #[must_use]
    pub fn for_team(team_id: TeamId) -> Self {
        Self {
            team: TeamScope::Team(team_id),
            ..Self::default()
        }
    }

    /// Restricts to direct (permission-carrying) rows.
    #[must_use]
    pub fn direct(self) -> Self {
        Self {
            kind: GrantKindFilter::Direct,
            ..self
        }
    }

    /// Restricts to role links.
    #[must_use]
    pub fn role_links(self) -> Self {
        Self {
            kind: GrantKindFilter::RoleLink,
            ..self
        }
    }

    /// Restricts to rows carrying one of the given permissions.
    #[must_use]
    pub fn with_permission_ids(self, permission_ids: Vec<PermissionId>) -> Self {
        Self {
            kind: GrantKindFilter::Direct,
            permission_ids: Some(permission_ids),
            ..self
        }
    }

    /// Restricts to rows linking one of the given roles.
    #[must_use]
    pub fn with_role_ids(self, role_ids: Vec<RoleId>) -> Self {
        Self {
            kind: GrantKindFilter::RoleLink,
            role_ids: Some(role_ids),
            ..self
        }
    }

    /// Applies a team predicate.
    #[must_use]
    pub fn in_team(self, team: TeamScope) -> Self {
        Self { team, ..self }
    }

    /// Restricts to rows whose action is one of the given values.
    #[must_use]
    pub fn with_actions(self, actions: Vec<String>) -> Self {
        Self {
            actions: Some(actions),
            ..self
        }
    }

    /// Skips rows carrying the given status.
    #[must_use]
    pub fn excluding_status(self, status: Option<String>) -> Self {
        Self {
            excluded_status: status,
            ..self
        }
    }

    /// Also matches soft-deleted rows, for purges.
    #[must_use]
    pub fn including_deleted(self) -> Self {
        Self {
            include_deleted: true,
            ..self
        }
    }

    /// Evaluates the filter against one row.
    #[must_use]
    pub fn matches(&self, grant: &AssignedPermission) -> bool {
        if grant.is_deleted() && !self.include_deleted {
            return false;
        }

        if self
            .resource
            .as_ref()
            .is_some_and(|resource| resource != &grant.resource)
        {
            return false;
        }

        let kind_matches = match (self.kind, grant.kind) {
            (GrantKindFilter::Any, _) => true,
            (GrantKindFilter::Direct, GrantKind::Direct { .. }) => true,
            (GrantKindFilter::RoleLink, GrantKind::RoleLink { .. }) => true,
            _ => false,
        };
        if !kind_matches {
            return false;
        }

        if let Some(permission_ids) = &self.permission_ids {
            let Some(permission_id) = grant.kind.permission_id() else {
                return false;
            };
            if !permission_ids.contains(&permission_id) {
                return false;
            }
        }

        if let Some(role_ids) = &self.role_ids {
            let Some(role_id) = grant.kind.role_id() else {
                return false;
            };
            if !role_ids.contains(&role_id) {
                return false;
            }
        }

        if !self.team.matches(grant.team_id.as_ref()) {
            return false;
        }

        if self
            .actions
            .as_ref()
            .is_some_and(|actions| !actions.iter().any(|action| action == &grant.action))
        {
            return false;
        }

        self.excluded_status
            .as_ref()
            .is_none_or(|status| status != &grant.status)
    }
}

/// Explicit join for role-derived resolution.
///
/// Matches when the resource holds a role link (within `team`) whose role
/// holds a direct grant of `permission_id` for one of `actions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDerivedGrantQuery {
    /// Resource whose role links are followed.
    pub resource: ResourceKey,
    /// Permission the role must hold.
    pub permission_id: PermissionId,
    /// Accepted action values on the role's grant.
    pub actions: Vec<String>,
    /// Team predicate on the role link. The role's own grant is not team-filtered.
    pub team: TeamScope,
    /// Status value that disqualifies either row.
    pub excluded_status: Option<String>,
}

impl RoleDerivedGrantQuery {
    /// Filter selecting the resource's qualifying role links.
    #[must_use]
    pub fn role_link_filter(&self) -> GrantFilter {
        GrantFilter::for_resource(self.resource.clone())
            .role_links()
            .in_team(self.team.clone())
            .excluding_status(self.excluded_status.clone())
    }

    /// Filter selecting the role's qualifying permission grants.
    pub fn role_grant_filter(&self, role_id: RoleId) -> AppResult<GrantFilter> {
        Ok(
            GrantFilter::for_resource(ResourceKey::new(ROLE_RESOURCE_KIND, role_id.to_string())?)
                .with_permission_ids(vec![self.permission_id])
                .with_actions(self.actions.clone())
                .excluding_status(self.excluded_status.clone()),
        )
    }
}
