use rolegate_core::TeamId;
use rolegate_domain::{GRANT_STATUS_INACTIVE, Resource};
use tracing::info;

use crate::acl_ports::{GrantFilter, TeamScope};

use super::*;

impl AssignmentService {
    /// Sets `status` on every row of the resource within the team.
    pub async fn update_permission_status<R>(
        &self,
        resource: &R,
        team_id: &str,
        status: &str,
    ) -> AppResult<u64>
    where
        R: Resource + ?Sized,
    {
        let filter = GrantFilter::for_resource(resource.resource_key()?)
            .in_team(TeamScope::Team(TeamId::new(team_id)?));

        let updated = self.repository.update_grant_status(&filter, status).await?;
        info!(team_id, status, updated, "grant status updated");
        Ok(updated)
    }

    /// Removes every row of the resource within the team.
    pub async fn retract_model_from_team<R>(&self, resource: &R, team_id: &str) -> AppResult<u64>
    where
        R: Resource + ?Sized,
    {
        let resource_key = resource.resource_key()?;
        let filter = GrantFilter::for_resource(resource_key.clone())
            .in_team(TeamScope::Team(TeamId::new(team_id)?))
            .including_deleted();

        let removed = self.repository.hard_delete_grants(&filter).await?;
        info!(resource = %resource_key, team_id, removed, "resource retracted from team");
        Ok(removed)
    }

    /// Marks every row within the team as inactive without deleting it.
    pub async fn retract_all_team_members(&self, team_id: &str) -> AppResult<u64> {
        let filter = GrantFilter::for_team(TeamId::new(team_id)?);

        let updated = self
            .repository
            .update_grant_status(&filter, GRANT_STATUS_INACTIVE)
            .await?;
        info!(team_id, updated, "team members deactivated");
        Ok(updated)
    }
}
