use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Permission, Resource};
use tracing::info;

use crate::GrantResolver;

/// Port resolving the current principal from an ambient call context.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Host-defined call context (request metadata, session, token claims).
    type Context: Send + Sync + ?Sized;

    /// Resource representing the principal.
    type Principal: Resource;

    /// Produces the principal for the call, or `AppError::Unauthenticated`.
    async fn resolve_principal(&self, context: &Self::Context) -> AppResult<Self::Principal>;
}

/// Allow/deny facade over [`GrantResolver`] for the current principal.
pub struct AuthorizationService<P> {
    resolver: GrantResolver,
    principals: Arc<P>,
}

impl<P> Clone for AuthorizationService<P> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            principals: Arc::clone(&self.principals),
        }
    }
}

impl<P> AuthorizationService<P>
where
    P: PrincipalResolver,
{
    /// Creates a facade from a resolver and a principal lookup.
    #[must_use]
    pub fn new(resolver: GrantResolver, principals: Arc<P>) -> Self {
        Self {
            resolver,
            principals,
        }
    }

    /// Ensures the principal holds the permission for any of the actions.
    ///
    /// Storage and principal-resolution errors are propagated so callers can
    /// tell "denied" apart from "could not evaluate".
    pub async fn authorize(
        &self,
        context: &P::Context,
        permission: &Permission,
        actions: &[&str],
    ) -> AppResult<()> {
        let principal = self.principals.resolve_principal(context).await?;
        let allowed = self
            .resolver
            .try_check_permission(&principal, permission, actions)
            .await?;

        deny_unless(allowed, &principal, permission, None, actions)
    }

    /// Ensures the principal holds the permission for any of the actions
    /// within exactly `team_id`.
    pub async fn authorize_with_team(
        &self,
        context: &P::Context,
        permission: &Permission,
        team_id: &str,
        actions: &[&str],
    ) -> AppResult<()> {
        let principal = self.principals.resolve_principal(context).await?;
        let allowed = self
            .resolver
            .try_check_permission_with_team(&principal, permission, team_id, actions)
            .await?;

        deny_unless(allowed, &principal, permission, Some(team_id), actions)
    }
}

fn deny_unless<R>(
    allowed: bool,
    principal: &R,
    permission: &Permission,
    team_id: Option<&str>,
    actions: &[&str],
) -> AppResult<()>
where
    R: Resource,
{
    if allowed {
        return Ok(());
    }

    info!(
        principal_kind = principal.resource_kind(),
        principal_id = %principal.resource_id(),
        permission = permission.name(),
        team_id = team_id.unwrap_or_default(),
        actions = ?actions,
        "authorization denied"
    );

    Err(AppError::PermissionDenied {
        permission: permission.name().to_owned(),
        actions: actions.iter().map(|action| (*action).to_owned()).collect(),
    })
}
