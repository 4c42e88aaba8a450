//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), so `?` works across both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::BoxError;

/// Service-layer error
///
/// - `Db`: database/infrastructure errors (logged, mapped to a backend or network code)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

/// Error-message prefixes raised by the stored procedures
const PROCEDURE_ERRORS: &[(&str, ErrorCode)] = &[
    ("INSUFFICIENT_STOCK", ErrorCode::InsufficientStock),
    ("SALE_TOTAL_MISMATCH", ErrorCode::SaleTotalMismatch),
    ("BRANCH_ACCESS_DENIED", ErrorCode::BranchAccessDenied),
    ("PART_NOT_FOUND", ErrorCode::PartNotFound),
    ("SALE_NOT_FOUND", ErrorCode::SaleNotFound),
    ("FORBIDDEN", ErrorCode::PermissionDenied),
];

/// Map a procedure error message (`PREFIX: detail`) to an AppError
pub fn procedure_error(message: &str) -> Option<AppError> {
    PROCEDURE_ERRORS.iter().find_map(|(prefix, code)| {
        let rest = message.strip_prefix(prefix)?;
        let detail = rest.trim_start_matches(':').trim();
        Some(if detail.is_empty() {
            AppError::new(*code)
        } else {
            AppError::with_message(*code, detail)
        })
    })
}

/// Unique-constraint names and the conflict they signal
const UNIQUE_CONSTRAINTS: &[(&str, ErrorCode)] = &[
    ("parts_sku_key", ErrorCode::PartSkuExists),
    ("profiles_email_key", ErrorCode::EmailExists),
    ("customers_phone_key", ErrorCode::CustomerPhoneExists),
    ("branches_pkey", ErrorCode::BranchExists),
];

fn classify_sqlx(err: &sqlx::Error) -> Option<AppError> {
    match err {
        sqlx::Error::Database(db) => {
            if let Some(app) = procedure_error(db.message()) {
                return Some(app);
            }
            if db.is_unique_violation() {
                let code = db
                    .constraint()
                    .and_then(|c| {
                        UNIQUE_CONSTRAINTS
                            .iter()
                            .find(|(name, _)| *name == c)
                            .map(|(_, code)| *code)
                    })
                    .unwrap_or(ErrorCode::AlreadyExists);
                return Some(AppError::new(code));
            }
            if db.is_foreign_key_violation() {
                return Some(AppError::with_message(
                    ErrorCode::InvalidRequest,
                    "Referenced record does not exist or is still in use",
                ));
            }
            None
        }
        sqlx::Error::PoolTimedOut => Some(AppError::new(ErrorCode::TimeoutError)),
        sqlx::Error::Io(_) | sqlx::Error::PoolClosed => {
            Some(AppError::new(ErrorCode::NetworkError))
        }
        _ => None,
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                if let Some(app) = db_err
                    .downcast_ref::<sqlx::Error>()
                    .and_then(classify_sqlx)
                {
                    if app.kind() == shared::error::ErrorKind::Network {
                        tracing::error!(error = %db_err, "Database unreachable");
                    }
                    return app;
                }
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Log an infrastructure error and map it for the client
pub fn internal(e: BoxError) -> AppError {
    ServiceError::Db(e).into()
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_procedure_prefixes() {
        let err = procedure_error("INSUFFICIENT_STOCK: part 42 has 1 left").unwrap();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "part 42 has 1 left");

        let err = procedure_error("BRANCH_ACCESS_DENIED").unwrap();
        assert_eq!(err.code, ErrorCode::BranchAccessDenied);

        assert_eq!(
            procedure_error("FORBIDDEN: manager required").unwrap().code,
            ErrorCode::PermissionDenied
        );
        assert!(procedure_error("duplicate key value").is_none());
    }

    #[test]
    fn unknown_db_errors_become_database_error() {
        let err: AppError = ServiceError::Db("connection reset by gremlins".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn pool_timeout_is_a_network_kind() {
        let err: AppError = ServiceError::from(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.code, ErrorCode::TimeoutError);
        assert_eq!(err.kind(), shared::error::ErrorKind::Network);
    }

    #[test]
    fn app_errors_pass_through() {
        let err: AppError = ServiceError::App(AppError::new(ErrorCode::SaleEmpty)).into();
        assert_eq!(err.code, ErrorCode::SaleEmpty);
    }
}
