mod filters;
mod repository;

pub use filters::{GrantFilter, GrantKindFilter, RoleDerivedGrantQuery, TeamScope};
pub use repository::AclRepository;
