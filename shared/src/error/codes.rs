//! Numeric error codes
//!
//! The leading digit is the domain (see [`ErrorCategory`](super::ErrorCategory)):
//! 0 general, 1 auth, 2 permission, 3 branch, 4 sale, 5 work order,
//! 6 inventory, 7 customer/cash, 8 account/notification, 9 system.
//! Codes travel as plain numbers so the SPA can switch on them.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declare the code table once: discriminant, HTTP status, stock message.
macro_rules! error_codes {
    (
        $( $(#[$meta:meta])* $variant:ident = $value:literal, $status:ident, $message:literal; )+
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$meta])* $variant = $value, )+
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant),+];

            /// Developer-facing English message
            pub const fn message(&self) -> &'static str {
                match self {
                    $( ErrorCode::$variant => $message, )+
                }
            }

            pub fn http_status(&self) -> StatusCode {
                match self {
                    $( ErrorCode::$variant => StatusCode::$status, )+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(ErrorCode::$variant), )+
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    // 0xxx general
    /// A model's `validate()` rejected the input
    ValidationFailed = 2, BAD_REQUEST, "Validation failed";
    /// Unique violation without a more specific code
    AlreadyExists = 4, CONFLICT, "Resource already exists";
    InvalidRequest = 5, BAD_REQUEST, "Invalid request";
    InvalidFormat = 6, BAD_REQUEST, "Invalid format";
    RequiredField = 7, BAD_REQUEST, "Required field is missing";

    // 1xxx auth
    NotAuthenticated = 1001, UNAUTHORIZED, "User is not authenticated";
    /// Unknown email or wrong password
    InvalidCredentials = 1002, UNAUTHORIZED, "Invalid email or password";
    TokenExpired = 1003, UNAUTHORIZED, "Authentication token has expired";
    TokenInvalid = 1004, UNAUTHORIZED, "Authentication token is invalid";
    AccountDisabled = 1007, UNAUTHORIZED, "Account is disabled";
    TooManyRequests = 1008, TOO_MANY_REQUESTS, "Too many requests, try again later";

    // 2xxx permission
    PermissionDenied = 2001, FORBIDDEN, "Permission denied";
    ManagerRequired = 2002, FORBIDDEN, "Manager or owner role is required";
    OwnerRequired = 2003, FORBIDDEN, "Owner role is required";
    /// Staff and managers asked for a branch other than their own
    BranchAccessDenied = 2004, FORBIDDEN, "Access to this branch is not allowed";

    // 3xxx branch
    BranchInactive = 3002, FORBIDDEN, "Branch is inactive";
    BranchExists = 3003, CONFLICT, "Branch already exists";

    // 4xxx sale
    SaleNotFound = 4001, NOT_FOUND, "Sale not found";
    SaleEmpty = 4002, BAD_REQUEST, "Sale has no items";
    /// Client total differs from the server computation beyond tolerance
    SaleTotalMismatch = 4003, BAD_REQUEST, "Sale total does not match its items";
    InsufficientStock = 4004, CONFLICT, "Insufficient stock";
    InvalidQuantity = 4005, BAD_REQUEST, "Invalid quantity";
    /// Negative, non-finite or above the money ceiling
    InvalidAmount = 4006, BAD_REQUEST, "Invalid amount";

    // 5xxx work order
    WorkOrderNotFound = 5001, NOT_FOUND, "Work order not found";
    InvalidStatusTransition = 5002, BAD_REQUEST, "Work order status transition is not allowed";
    /// Delivered or cancelled
    WorkOrderClosed = 5003, CONFLICT, "Work order is closed";

    // 6xxx inventory
    PartNotFound = 6001, NOT_FOUND, "Part not found";
    PartSkuExists = 6002, CONFLICT, "Part SKU already exists";
    StockBelowZero = 6003, CONFLICT, "Stock cannot go below zero";

    // 7xxx customer / cash book
    CashTransactionNotFound = 7001, NOT_FOUND, "Cash transaction not found";
    CustomerNotFound = 7101, NOT_FOUND, "Customer not found";
    CustomerPhoneExists = 7102, CONFLICT, "Customer phone already exists";

    // 8xxx account / notification
    ProfileNotFound = 8001, NOT_FOUND, "Profile not found";
    EmailExists = 8002, CONFLICT, "Email already registered";
    PasswordTooShort = 8003, BAD_REQUEST, "Password must be at least 8 characters";
    /// Own role, branch or active flag
    CannotModifySelf = 8004, FORBIDDEN, "Cannot change own role or status";
    NotificationNotFound = 8101, NOT_FOUND, "Notification not found";

    // 9xxx system
    InternalError = 9001, INTERNAL_SERVER_ERROR, "Internal server error";
    DatabaseError = 9002, INTERNAL_SERVER_ERROR, "Database error";
    NetworkError = 9003, SERVICE_UNAVAILABLE, "Network error";
    TimeoutError = 9004, SERVICE_UNAVAILABLE, "Operation timed out";
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number outside the code table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_round_trips() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
            assert!(!code.message().is_empty());
        }
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
    }

    #[test]
    fn wire_form_is_a_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::SaleNotFound).unwrap(), "4001");
        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::InvalidStatusTransition);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
        assert_eq!(ErrorCode::CustomerNotFound.to_string(), "7101");
    }

    #[test]
    fn statuses() {
        assert_eq!(ErrorCode::PartNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InsufficientStock.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::StockBelowZero.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::BranchInactive.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::TooManyRequests.http_status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ErrorCode::SaleTotalMismatch.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::TimeoutError.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ErrorCode::DatabaseError.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
