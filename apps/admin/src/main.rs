//! Rolegate administration command line.

#![forbid(unsafe_code)]

mod admin_command;
mod admin_config;
mod database;

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use rolegate_application::{
    AssignmentService, AuthorizationService, GrantResolver, PrincipalResolver,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::ResourceRef;
use rolegate_infrastructure::PostgresAclRepository;
use tracing::info;

use crate::admin_command::{AdminCommand, PrincipalArgs};
use crate::admin_config::{AdminConfig, init_tracing};

/// Treats the principal named on the command line as authenticated.
struct CommandLinePrincipalResolver;

#[async_trait]
impl PrincipalResolver for CommandLinePrincipalResolver {
    type Context = PrincipalArgs;
    type Principal = ResourceRef;

    async fn resolve_principal(&self, context: &PrincipalArgs) -> AppResult<ResourceRef> {
        ResourceRef::new(context.kind.as_str(), context.id.as_str())
            .map_err(|error| AppError::Unauthenticated(error.to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = AdminCommand::parse(env::args().skip(1))?;
    let config = AdminConfig::load()?;
    let pool = database::connect(&config).await?;
    let repository = Arc::new(PostgresAclRepository::new(pool.clone()));
    let assignments = AssignmentService::new(repository.clone());

    match command {
        AdminCommand::Migrate => {
            database::migrate(&pool).await?;
            info!("migrations applied");
            Ok(())
        }
        AdminCommand::Permissions => print_json(&assignments.list_permissions().await?),
        AdminCommand::Roles => print_json(&assignments.list_roles().await?),
        AdminCommand::Check {
            principal,
            permission,
            actions,
            team_id,
        } => {
            let permission = assignments
                .find_permission_by_name(permission.as_str())
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("permission '{permission}' was not found"))
                })?;
            let resolver = GrantResolver::new(repository)
                .with_inactive_grant_policy(config.inactive_grants);
            let authorization =
                AuthorizationService::new(resolver, Arc::new(CommandLinePrincipalResolver));
            let actions = actions.iter().map(String::as_str).collect::<Vec<_>>();

            match team_id.as_deref() {
                Some(team_id) => {
                    authorization
                        .authorize_with_team(&principal, &permission, team_id, &actions)
                        .await?
                }
                None => {
                    authorization
                        .authorize(&principal, &permission, &actions)
                        .await?
                }
            }

            println!("allowed");
            Ok(())
        }
    }
}

fn print_json<T>(value: &T) -> Result<(), AppError>
where
    T: serde::Serialize + ?Sized,
{
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Validation(format!("failed to render output: {error}")))?;
    println!("{rendered}");
    Ok(())
}
