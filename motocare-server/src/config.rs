//! Server configuration

use shared::report::MAX_UTC_OFFSET_MINUTES;

use crate::BoxError;

/// Server configuration, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for staff tokens
    pub jwt_secret: String,
    /// Pool size
    pub db_max_connections: u32,
    /// Fixed offset used to cut report days
    pub report_utc_offset_minutes: i32,
    /// Allowed CORS origin; permissive when unset
    pub cors_allow_origin: Option<String>,
    /// `LOG_FORMAT=json`
    pub log_json: bool,
    /// Directory for daily-rotated log files
    pub log_dir: Option<String>,
    /// Emit low-stock notifications after sales
    pub low_stock_notify: bool,
}

impl Config {
    /// Require a secret: must be set and non-empty outside development.
    fn require_secret(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
        environment: &str,
    ) -> Result<String, BoxError> {
        let val = match lookup(name) {
            Some(v) => v,
            None => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn report_offset(lookup: &impl Fn(&str) -> Option<String>) -> Result<i32, BoxError> {
        let Some(raw) = lookup("REPORT_UTC_OFFSET_MINUTES") else {
            return Ok(0);
        };
        match raw.trim().parse::<i32>() {
            Ok(m) if m.abs() <= MAX_UTC_OFFSET_MINUTES => Ok(m),
            _ => Err(format!(
                "REPORT_UTC_OFFSET_MINUTES must be an integer within ±{MAX_UTC_OFFSET_MINUTES}, got {raw:?}"
            )
            .into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BoxError> {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret(&lookup, "JWT_SECRET", &environment)?,
            environment,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            report_utc_offset_minutes: Self::report_offset(&lookup)?,
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").filter(|s| !s.is_empty()),
            log_json: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            log_dir: lookup("LOG_DIR").filter(|s| !s.is_empty()),
            low_stock_notify: lookup("LOW_STOCK_NOTIFY")
                .map(|v| !matches!(v.as_str(), "0" | "false" | "off"))
                .unwrap_or(true),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
