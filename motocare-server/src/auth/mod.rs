//! Staff authentication and branch access

pub mod access;
pub mod jwt;
pub mod middleware;
pub mod rate_limit;

use shared::models::Role;

pub use access::{BranchScope, require_manager_or_owner, require_owner, resolve_branch};
pub use middleware::require_auth;

/// Authenticated staff identity extracted from the JWT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    /// Home branch of the profile
    pub branch_id: String,
}
