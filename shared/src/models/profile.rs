//! Profile Model (staff accounts)

use serde::{Deserialize, Serialize};

super::text_enum! {
    /// Staff role; decides branch visibility and write permissions
    pub enum Role: "role" {
        Owner => "owner",
        Manager => "manager",
        Staff => "staff",
    }
}

impl Role {
    /// Mirrors the `mc_is_manager_or_owner()` database function
    pub fn is_manager_or_owner(&self) -> bool {
        matches!(self, Role::Owner | Role::Manager)
    }

    /// Owners are not pinned to a single branch
    pub fn can_switch_branch(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

/// Staff profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub role: Role,
    pub branch_id: String,
    pub is_active: bool,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Minimum password length for staff accounts
pub const MIN_PASSWORD_LEN: usize = 8;

/// Create profile payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreate {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub branch_id: String,
    pub password: String,
}

/// Update profile payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub branch_id: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

impl ProfileUpdate {
    /// Whether this update touches fields a user may not change on themselves
    pub fn touches_own_access(&self) -> bool {
        self.role.is_some() || self.branch_id.is_some() || self.is_active == Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_or_owner() {
        assert!(Role::Owner.is_manager_or_owner());
        assert!(Role::Manager.is_manager_or_owner());
        assert!(!Role::Staff.is_manager_or_owner());
        assert!(Role::Owner.can_switch_branch());
        assert!(!Role::Manager.can_switch_branch());
    }

    #[test]
    fn hashed_password_never_serialized() {
        let profile = Profile {
            id: 1,
            email: "a@b.vn".to_string(),
            full_name: "A".to_string(),
            role: Role::Staff,
            branch_id: "CN1".to_string(),
            is_active: true,
            hashed_password: "$argon2id$secret".to_string(),
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"staff\""));
    }

    #[test]
    fn self_update_detection() {
        let rename = ProfileUpdate {
            full_name: Some("New".into()),
            ..Default::default()
        };
        assert!(!rename.touches_own_access());

        let promote = ProfileUpdate {
            role: Some(Role::Owner),
            ..Default::default()
        };
        assert!(promote.touches_own_access());
    }
}
