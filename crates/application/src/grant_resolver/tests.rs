use std::sync::Arc;

use rolegate_core::{AppError, TeamId};
use rolegate_domain::{Permission, ResourceRef, Role};

use crate::test_support::FakeAclRepository;
use crate::{AssignmentService, GrantResolver, InactiveGrantPolicy};

struct Fixture {
    repository: Arc<FakeAclRepository>,
    assignments: AssignmentService,
    resolver: GrantResolver,
}

fn fixture() -> Fixture {
    let repository = Arc::new(FakeAclRepository::default());
    Fixture {
        assignments: AssignmentService::new(repository.clone()),
        resolver: GrantResolver::new(repository.clone()),
        repository,
    }
}

fn user(id: &str) -> ResourceRef {
    ResourceRef::new("user", id).unwrap_or_else(|error| panic!("invalid resource: {error}"))
}

fn team_user(id: &str, team: &str) -> ResourceRef {
    let team = TeamId::new(team).unwrap_or_else(|error| panic!("invalid team: {error}"));
    user(id).in_team(team)
}

impl Fixture {
    async fn permission(&self, name: &str) -> Permission {
        self.assignments
            .create_permission(name, name, "")
            .await
            .unwrap_or_else(|error| panic!("failed to create permission: {error}"))
    }

    async fn role(&self, name: &str) -> Role {
        self.assignments
            .create_role(name, name, "")
            .await
            .unwrap_or_else(|error| panic!("failed to create role: {error}"))
    }

    async fn grant(&self, resource: &ResourceRef, permission: &Permission, actions: &[&str]) {
        let result = self
            .assignments
            .assign_permission(resource, permission, actions)
            .await;
        assert!(result.is_ok(), "grant failed: {result:?}");
    }

    async fn grant_to_role(&self, role: &Role, permission: &Permission, actions: &[&str]) {
        let result = self
            .assignments
            .assign_permission(role, permission, actions)
            .await;
        assert!(result.is_ok(), "role grant failed: {result:?}");
    }

    async fn link(&self, resource: &ResourceRef, role: &Role, team: &str) {
        let result = self
            .assignments
            .assign_role(resource, role, team, "active")
            .await;
        assert!(result.is_ok(), "role link failed: {result:?}");
    }
}

#[tokio::test]
async fn direct_grant_allows_only_granted_action() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let resource = user("42");
    fixture.grant(&resource, &blog, &["create"]).await;

    assert!(
        fixture
            .resolver
            .check_permission(&resource, &blog, &["create"])
            .await
    );
    assert!(
        !fixture
            .resolver
            .check_permission(&resource, &blog, &["delete"])
            .await
    );
}

#[tokio::test]
async fn role_link_inherits_role_permissions() {
    let fixture = fixture();
    let users = fixture.permission("user").await;
    let admin = fixture.role("admin").await;
    let resource = user("7");

    fixture.grant_to_role(&admin, &users, &["delete"]).await;
    fixture.link(&resource, &admin, "").await;

    assert!(
        fixture
            .resolver
            .check_permission(&resource, &users, &["delete"])
            .await
    );
}

#[tokio::test]
async fn role_lacking_permission_denies() {
    let fixture = fixture();
    let users = fixture.permission("user").await;
    let blog = fixture.permission("blog").await;
    let member = fixture.role("member").await;
    let resource = user("7");

    fixture.grant_to_role(&member, &blog, &["read"]).await;
    fixture.link(&resource, &member, "").await;

    assert!(
        !fixture
            .resolver
            .check_permission(&resource, &users, &["read"])
            .await
    );
}

#[tokio::test]
async fn team_scoped_check_is_strict_equality() {
    let fixture = fixture();
    let users = fixture.permission("user").await;
    let admin = fixture.role("admin").await;
    let resource = user("7");

    fixture.grant_to_role(&admin, &users, &["delete"]).await;
    fixture.link(&resource, &admin, "T1").await;

    assert!(
        fixture
            .resolver
            .check_permission_with_team(&resource, &users, "T1", &["delete"])
            .await
    );
    assert!(
        !fixture
            .resolver
            .check_permission_with_team(&resource, &users, "T2", &["delete"])
            .await
    );
    assert!(
        fixture
            .resolver
            .check_permission(&resource, &users, &["delete"])
            .await,
        "unscoped checks ignore the team of the role link"
    );
}

#[tokio::test]
async fn team_scoped_check_never_matches_unscoped_direct_grant() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let unscoped = user("42");
    let scoped = team_user("43", "T1");

    fixture.grant(&unscoped, &blog, &["read"]).await;
    fixture.grant(&scoped, &blog, &["read"]).await;

    assert!(
        !fixture
            .resolver
            .check_permission_with_team(&unscoped, &blog, "T1", &["read"])
            .await
    );
    assert!(
        fixture
            .resolver
            .check_permission_with_team(&scoped, &blog, "T1", &["read"])
            .await
    );
    assert!(
        fixture
            .resolver
            .check_permission(&scoped, &blog, &["read"])
            .await
    );
}

#[tokio::test]
async fn requested_actions_are_a_disjunction() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let resource = user("42");
    fixture.grant(&resource, &blog, &["read"]).await;

    assert!(
        fixture
            .resolver
            .check_permission(&resource, &blog, &["create", "read"])
            .await
    );
    assert!(
        !fixture
            .resolver
            .check_permission(&resource, &blog, &["create"])
            .await
    );
    assert!(
        !fixture
            .resolver
            .check_permission(&resource, &blog, &[])
            .await
    );
}

#[tokio::test]
async fn fresh_resource_is_denied_everything() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let resource = user("new");

    assert!(
        !fixture
            .resolver
            .check_permission(&resource, &blog, &["read"])
            .await
    );
    assert!(
        !fixture
            .resolver
            .check_permission_with_team(&resource, &blog, "T1", &["read"])
            .await
    );
}

#[tokio::test]
async fn retracted_permission_no_longer_resolves() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let resource = user("42");
    fixture.grant(&resource, &blog, &["create", "read"]).await;

    let removed = fixture
        .assignments
        .retract_permission(&resource, std::slice::from_ref(&blog))
        .await
        .unwrap_or_else(|error| panic!("retraction failed: {error}"));

    assert_eq!(removed, 2);
    assert!(
        !fixture
            .resolver
            .check_permission(&resource, &blog, &["create"])
            .await
    );
}

#[tokio::test]
async fn soft_deleted_role_link_no_longer_resolves() {
    let fixture = fixture();
    let users = fixture.permission("user").await;
    let admin = fixture.role("admin").await;
    let resource = user("7");

    fixture.grant_to_role(&admin, &users, &["delete"]).await;
    fixture.link(&resource, &admin, "T1").await;

    let removed = fixture
        .assignments
        .unassign_role(&resource, &admin, "T1")
        .await
        .unwrap_or_else(|error| panic!("unassign failed: {error}"));

    assert_eq!(removed, 1);
    assert!(
        !fixture
            .resolver
            .check_permission_with_team(&resource, &users, "T1", &["delete"])
            .await
    );
    assert_eq!(fixture.repository.grants().await.len(), 2);
}

#[tokio::test]
async fn inactive_grants_follow_configured_policy() {
    let fixture = fixture();
    let users = fixture.permission("user").await;
    let admin = fixture.role("admin").await;
    let resource = user("7");

    fixture.grant_to_role(&admin, &users, &["delete"]).await;
    fixture.link(&resource, &admin, "T1").await;

    let deactivated = fixture
        .assignments
        .retract_all_team_members("T1")
        .await
        .unwrap_or_else(|error| panic!("deactivation failed: {error}"));
    assert_eq!(deactivated, 1);

    assert!(
        fixture
            .resolver
            .check_permission_with_team(&resource, &users, "T1", &["delete"])
            .await,
        "inactive rows are honored by default"
    );

    let strict = fixture
        .resolver
        .clone()
        .with_inactive_grant_policy(InactiveGrantPolicy::Exclude);
    assert!(
        !strict
            .check_permission_with_team(&resource, &users, "T1", &["delete"])
            .await
    );
}

#[tokio::test]
async fn storage_errors_fail_closed() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let resource = user("42");
    fixture.grant(&resource, &blog, &["read"]).await;
    fixture.repository.fail_reads();

    assert!(
        !fixture
            .resolver
            .check_permission(&resource, &blog, &["read"])
            .await
    );
    let propagated = fixture
        .resolver
        .try_check_permission(&resource, &blog, &["read"])
        .await;
    assert!(matches!(propagated, Err(AppError::Storage(_))));
}

#[tokio::test]
async fn blank_team_is_denied_rather_than_widened() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let resource = user("42");
    fixture.grant(&resource, &blog, &["read"]).await;

    assert!(
        !fixture
            .resolver
            .check_permission_with_team(&resource, &blog, "", &["read"])
            .await
    );
    let propagated = fixture
        .resolver
        .try_check_permission_with_team(&resource, &blog, " ", &["read"])
        .await;
    assert!(matches!(propagated, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn role_can_be_checked_as_a_resource() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let admin = fixture.role("admin").await;
    fixture
        .grant_to_role(&admin, &blog, &["create", "read", "update", "delete"])
        .await;

    assert!(
        fixture
            .resolver
            .check_permission_in_role(&blog, &admin, &["create"])
            .await
    );
}

#[tokio::test]
async fn role_membership_is_checked_per_team() {
    let fixture = fixture();
    let admin = fixture.role("admin").await;
    let resource = user("7");
    fixture.link(&resource, &admin, "T1").await;

    assert!(
        fixture
            .resolver
            .check_role_with_team(&resource, &admin, "T1")
            .await
    );
    assert!(
        !fixture
            .resolver
            .check_role_with_team(&resource, &admin, "T2")
            .await
    );
}

#[tokio::test]
async fn permissions_of_merges_direct_and_role_grants() {
    let fixture = fixture();
    let blog = fixture.permission("blog").await;
    let users = fixture.permission("user").await;
    let reports = fixture.permission("reports").await;
    let member = fixture.role("member").await;
    let resource = user("7");

    fixture.grant(&resource, &blog, &["create", "update"]).await;
    fixture.grant_to_role(&member, &users, &["read"]).await;
    fixture.grant_to_role(&member, &blog, &["read"]).await;
    fixture.link(&resource, &member, "").await;

    let permissions = fixture
        .resolver
        .permissions_of(&resource)
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    let names = permissions
        .iter()
        .map(Permission::name)
        .collect::<Vec<_>>();

    assert_eq!(names, vec!["blog", "user"]);
    assert!(!names.contains(&reports.name()));

    let roles = fixture
        .resolver
        .roles_of(&resource)
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    assert_eq!(roles, vec![member]);
}

#[tokio::test]
async fn deleted_role_keeps_orphaned_grants_resolving() {
    let fixture = fixture();
    let users = fixture.permission("user").await;
    let admin = fixture.role("admin").await;
    let resource = user("7");

    fixture.grant_to_role(&admin, &users, &["delete"]).await;
    fixture.link(&resource, &admin, "").await;

    assert!(fixture.assignments.delete_role(admin.id()).await.is_ok());

    assert!(
        fixture
            .resolver
            .check_permission(&resource, &users, &["delete"])
            .await
    );
    assert!(
        fixture
            .resolver
            .roles_of(&resource)
            .await
            .unwrap_or_else(|error| panic!("listing failed: {error}"))
            .is_empty()
    );
}
