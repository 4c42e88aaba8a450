//! Code ranges and the client-facing failure kind

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Domain of a code, taken from its leading digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Branch,
    Sale,
    WorkOrder,
    Inventory,
    /// Customers and the cash book
    Ledger,
    /// Profiles and notifications
    Account,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Branch,
            4 => Self::Sale,
            5 => Self::WorkOrder,
            6 => Self::Inventory,
            7 => Self::Ledger,
            8 => Self::Account,
            _ => Self::System,
        }
    }
}

/// What the client shows: a form error, a backend refusal, or "offline".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Fix the input and retry
    Validation,
    /// Auth, permission, missing record or server failure.
    /// Older clients still send the hosted-backend tag `supabase`.
    #[serde(alias = "supabase")]
    Backend,
    /// The backend could not be reached in time
    Network,
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    pub fn kind(&self) -> ErrorKind {
        if self.http_status() == StatusCode::SERVICE_UNAVAILABLE {
            return ErrorKind::Network;
        }
        if self.http_status() == StatusCode::NOT_FOUND {
            return ErrorKind::Backend;
        }
        match self.category() {
            ErrorCategory::Auth | ErrorCategory::Permission | ErrorCategory::System => {
                ErrorKind::Backend
            }
            _ => ErrorKind::Validation,
        }
    }
}
