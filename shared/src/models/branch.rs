//! Branch Model

use serde::{Deserialize, Serialize};

/// A store location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Branch {
    /// Short code, e.g. `CN1`
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create branch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCreate {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl BranchCreate {
    /// Branch codes are upper-case ASCII letters, digits, `-` or `_`, 1..=16 chars
    pub fn validate(&self) -> Result<(), String> {
        let id = self.id.trim();
        if id.is_empty() || id.len() > 16 {
            return Err("branch id must be 1-16 characters".to_string());
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err("branch id may only contain A-Z, 0-9, '-' and '_'".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("branch name is required".to_string());
        }
        Ok(())
    }
}
