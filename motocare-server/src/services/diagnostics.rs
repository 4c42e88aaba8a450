//! Login diagnostics
//!
//! Explains why a staff member cannot sign in: walks the same checks the
//! login handler performs and reports each one instead of stopping at the
//! first failure.

use serde::Serialize;
use shared::models::{Branch, Profile};
use sqlx::PgPool;

use crate::BoxError;
use crate::util::{is_password_hash, verify_password};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub check: &'static str,
    pub severity: Severity,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginDiagnosis {
    pub email: String,
    pub findings: Vec<Finding>,
}

impl LoginDiagnosis {
    /// No check failed
    pub fn can_login(&self) -> bool {
        self.findings.iter().all(|f| f.severity != Severity::Fail)
    }

    fn push(&mut self, check: &'static str, severity: Severity, detail: impl Into<String>) {
        self.findings.push(Finding {
            check,
            severity,
            detail: detail.into(),
        });
    }
}

/// Everything the checks look at, gathered up front
#[derive(Debug, Clone, Default)]
pub struct LoginFacts {
    /// Profile stored under the normalised address
    pub profile: Option<Profile>,
    /// Profiles matching case/whitespace-insensitively
    pub loose_matches: Vec<Profile>,
    /// Home branch of `profile`
    pub branch: Option<Branch>,
    /// Password to try, if the operator supplied one
    pub password: Option<String>,
}

pub fn evaluate(email: &str, facts: &LoginFacts) -> LoginDiagnosis {
    let normalized = shared::util::normalize_email(email);
    let mut report = LoginDiagnosis {
        email: normalized.clone(),
        findings: Vec::new(),
    };

    let Some(profile) = &facts.profile else {
        report.push(
            "profile_exists",
            Severity::Fail,
            format!("no profile with email {normalized}"),
        );
        for other in &facts.loose_matches {
            report.push(
                "email_normalized",
                Severity::Warn,
                format!(
                    "profile {} is stored as {:?}; login lower-cases and trims the address",
                    other.id, other.email
                ),
            );
        }
        return report;
    };

    report.push(
        "profile_exists",
        Severity::Ok,
        format!("profile {} ({}, {})", profile.id, profile.full_name, profile.role),
    );
    if facts.loose_matches.len() > 1 {
        report.push(
            "email_normalized",
            Severity::Warn,
            format!(
                "{} profiles differ only by case or whitespace",
                facts.loose_matches.len()
            ),
        );
    }

    if profile.is_active {
        report.push("profile_active", Severity::Ok, "profile is active");
    } else {
        report.push("profile_active", Severity::Fail, "profile is deactivated");
    }

    match &facts.branch {
        None => report.push(
            "branch_exists",
            Severity::Fail,
            format!("home branch {} does not exist", profile.branch_id),
        ),
        Some(branch) if !branch.is_active => report.push(
            "branch_active",
            Severity::Fail,
            format!("home branch {} is inactive", branch.id),
        ),
        Some(branch) => report.push(
            "branch_active",
            Severity::Ok,
            format!("home branch {} ({})", branch.id, branch.name),
        ),
    }

    if !is_password_hash(&profile.hashed_password) {
        report.push(
            "password_hash",
            Severity::Fail,
            "stored password is not an argon2 hash; reset it",
        );
        return report;
    }
    report.push("password_hash", Severity::Ok, "password hash is well formed");

    if let Some(password) = &facts.password {
        if verify_password(password, &profile.hashed_password) {
            report.push("password_verifies", Severity::Ok, "password matches");
        } else {
            report.push("password_verifies", Severity::Fail, "password does not match");
        }
    }

    report
}

pub async fn diagnose_login(
    pool: &PgPool,
    email: &str,
    password: Option<&str>,
) -> Result<LoginDiagnosis, BoxError> {
    let normalized = shared::util::normalize_email(email);
    let profile = crate::db::profiles::find_by_email(pool, &normalized).await?;
    let loose_matches = crate::db::profiles::find_by_email_loose(pool, email).await?;
    let branch = match &profile {
        Some(p) => crate::db::branches::get(pool, &p.branch_id).await?,
        None => None,
    };

    let facts = LoginFacts {
        profile,
        loose_matches,
        branch,
        password: password.map(str::to_string),
    };
    Ok(evaluate(email, &facts))
}
