//! Branch resolution and role checks
//!
//! Mirrors the database functions `mc_current_branch()` and
//! `mc_is_manager_or_owner()`: staff and managers are pinned to their own
//! branch, owners may work on any branch they ask for.

use axum::extract::{FromRequestParts, Query};
use http::request::Parts;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};

use super::CurrentUser;

/// Header an owner sets to pick the branch to work on
pub const BRANCH_HEADER: &str = "x-branch-id";

/// Resolve the branch a request acts on
pub fn resolve_branch(user: &CurrentUser, requested: Option<&str>) -> Result<String, AppError> {
    let requested = requested.map(str::trim).filter(|b| !b.is_empty());
    match requested {
        None => Ok(user.branch_id.clone()),
        Some(branch) if branch == user.branch_id => Ok(user.branch_id.clone()),
        Some(branch) if user.role.can_switch_branch() => Ok(branch.to_string()),
        Some(branch) => Err(AppError::new(ErrorCode::BranchAccessDenied)
            .with_detail("branch_id", branch)
            .with_detail("home_branch_id", user.branch_id.as_str())),
    }
}

pub fn require_manager_or_owner(user: &CurrentUser) -> Result<(), AppError> {
    if user.role.is_manager_or_owner() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::ManagerRequired))
    }
}

pub fn require_owner(user: &CurrentUser) -> Result<(), AppError> {
    if user.role.can_switch_branch() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::OwnerRequired))
    }
}

#[derive(Deserialize)]
struct BranchQuery {
    branch_id: Option<String>,
}

/// Authenticated user plus the branch the request is scoped to
#[derive(Debug, Clone)]
pub struct BranchScope {
    pub user: CurrentUser,
    pub branch_id: String,
}

impl<S> FromRequestParts<S> for BranchScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated))?;

        let requested = parts
            .headers
            .get(BRANCH_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| {
                Query::<BranchQuery>::try_from_uri(&parts.uri)
                    .ok()
                    .and_then(|q| q.0.branch_id)
            });

        let branch_id = resolve_branch(&user, requested.as_deref())?;
        Ok(BranchScope { user, branch_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Role;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "a@motocare.vn".to_string(),
            role,
            branch_id: "CN1".to_string(),
        }
    }

    #[test]
    fn staff_and_managers_are_pinned() {
        for role in [Role::Staff, Role::Manager] {
            let u = user(role);
            assert_eq!(resolve_branch(&u, None).unwrap(), "CN1");
            assert_eq!(resolve_branch(&u, Some("CN1")).unwrap(), "CN1");
            assert_eq!(
                resolve_branch(&u, Some("CN2")).unwrap_err().code,
                ErrorCode::BranchAccessDenied
            );
        }
    }

    #[test]
    fn owners_may_switch() {
        let owner = user(Role::Owner);
        assert_eq!(resolve_branch(&owner, Some("CN2")).unwrap(), "CN2");
        assert_eq!(resolve_branch(&owner, Some("  ")).unwrap(), "CN1");
        assert_eq!(resolve_branch(&owner, None).unwrap(), "CN1");
    }

    #[test]
    fn role_checks() {
        assert!(require_manager_or_owner(&user(Role::Manager)).is_ok());
        assert_eq!(
            require_manager_or_owner(&user(Role::Staff)).unwrap_err().code,
            ErrorCode::ManagerRequired
        );
        assert!(require_owner(&user(Role::Owner)).is_ok());
        assert_eq!(
            require_owner(&user(Role::Manager)).unwrap_err().code,
            ErrorCode::OwnerRequired
        );
    }

    #[tokio::test]
    async fn extractor_reads_header_then_query() {
        let owner = user(Role::Owner);

        let (mut parts, _) = http::Request::builder()
            .uri("/api/parts?branch_id=CN3")
            .header(BRANCH_HEADER, "CN2")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(owner.clone());
        let scope = BranchScope::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(scope.branch_id, "CN2");

        let (mut parts, _) = http::Request::builder()
            .uri("/api/parts?branch_id=CN3&limit=5")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(owner);
        let scope = BranchScope::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(scope.branch_id, "CN3");

        let (mut parts, _) = http::Request::builder()
            .uri("/api/parts")
            .body(())
            .unwrap()
            .into_parts();
        let err = BranchScope::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }
}
