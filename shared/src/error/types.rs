//! `AppError` and the `{ ok, data | error }` envelope every endpoint returns

use super::category::{ErrorCategory, ErrorKind};
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Failure surfaced to API clients
///
/// `code` drives the HTTP status and the client-facing `kind`; `details`
/// carries machine-readable context such as the offending part id.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's stock message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach one `details` entry; later keys overwrite earlier ones
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Input rejected by a model's `validate()`
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Same answer for unknown email and wrong password
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }
}

/// The `error` member of a failed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code,
            kind: err.kind(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Response envelope
///
/// ```text
/// { "ok": true,  "data": ... }
/// { "ok": false, "error": { "code", "kind", "message", "details"? } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &AppError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(err.into()),
        }
    }

    /// Unwrap a decoded response on the client side
    pub fn into_result(self) -> Result<Option<T>, ErrorBody> {
        match self.error {
            Some(err) if !self.ok => Err(err),
            _ => Ok(self.data),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "Request failed with a system error");
        }
        ApiResponse::<()>::failure(&self).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = self
            .error
            .as_ref()
            .filter(|_| !self.ok)
            .map_or(StatusCode::OK, |err| err.code.http_status());
        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn stock_message_comes_from_code() {
        let err = AppError::new(ErrorCode::PartNotFound);
        assert_eq!(err.to_string(), "Part not found");
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert!(err.details.is_none());
    }

    #[test]
    fn details_accumulate() {
        let err = AppError::validation("phone is invalid")
            .with_detail("field", "phone")
            .with_detail("field", "customer_phone")
            .with_detail("length", 4);
        assert_eq!(err.kind(), ErrorKind::Validation);
        let details = err.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details["field"], "customer_phone");
        assert_eq!(details["length"], 4);
    }

    #[test]
    fn success_envelope_omits_error() {
        let json = serde_json::to_value(ApiResponse::success(vec!["CN1"])).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true, "data": ["CN1"] }));
    }

    #[test]
    fn failure_envelope_carries_kind() {
        let err = AppError::new(ErrorCode::InsufficientStock).with_detail("part_id", 7);
        let json = serde_json::to_value(ApiResponse::<()>::failure(&err)).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], 4004);
        assert_eq!(json["error"]["kind"], "validation");
        assert_eq!(json["error"]["details"]["part_id"], 7);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn status_follows_code() {
        let res = AppError::new(ErrorCode::ManagerRequired).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let res = ApiResponse::success(1).into_response();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn client_side_unwrap() {
        let ok: ApiResponse<i32> = serde_json::from_str(r#"{"ok":true,"data":5}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), Some(5));

        let failed: ApiResponse<i32> = serde_json::from_str(
            r#"{"ok":false,"error":{"code":6001,"kind":"backend","message":"Part not found"}}"#,
        )
        .unwrap();
        let err = failed.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::PartNotFound);
    }
}
