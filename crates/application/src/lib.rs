//! Application services and ports.

#![forbid(unsafe_code)]

mod acl_ports;
mod assignment_service;
mod authorization_service;
mod grant_resolver;

#[cfg(test)]
mod test_support;

pub use acl_ports::{
    AclRepository, GrantFilter, GrantKindFilter, RoleDerivedGrantQuery, TeamScope,
};
pub use assignment_service::AssignmentService;
pub use authorization_service::{AuthorizationService, PrincipalResolver};
pub use grant_resolver::{GrantResolver, InactiveGrantPolicy};
