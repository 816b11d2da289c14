//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod grant;
mod resource;

pub use catalog::{CatalogDetails, Permission, PermissionId, Role, RoleId};
pub use grant::{
    AssignedPermission, GRANT_STATUS_ACTIVE, GRANT_STATUS_INACTIVE, GrantId, GrantKind, NewGrant,
};
pub use resource::{ROLE_RESOURCE_KIND, Resource, ResourceKey, ResourceRef};
