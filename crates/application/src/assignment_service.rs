mod catalog;
mod grants;
mod teams;

use std::sync::Arc;

use rolegate_core::{AppError, AppResult};

use crate::acl_ports::AclRepository;

/// Application service for catalog administration and grant assignment.
///
/// Multi-row operations issue one storage call per row and are not atomic:
/// when a later insert fails the earlier rows stay in place and the storage
/// error is returned to the caller.
#[derive(Clone)]
pub struct AssignmentService {
    repository: Arc<dyn AclRepository>,
}

impl AssignmentService {
    /// Creates a new assignment service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AclRepository>) -> Self {
        Self { repository }
    }
}

fn validate_actions(actions: &[&str]) -> AppResult<()> {
    if actions.is_empty() {
        return Err(AppError::Validation(
            "at least one action is required".to_owned(),
        ));
    }

    if actions.iter().any(|action| action.trim().is_empty()) {
        return Err(AppError::Validation(
            "actions must not be empty or whitespace".to_owned(),
        ));
    }

    Ok(())
}
