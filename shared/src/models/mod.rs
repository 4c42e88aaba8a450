//! Data models
//!
//! Shared between motocare-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! enum columns are stored as TEXT and decoded through `TryFrom<String>`,
//! JSONB columns through `sqlx(json)`.
//! Record IDs are `i64` snowflakes, branch IDs are short text codes.

pub mod branch;
pub mod cash_transaction;
pub mod customer;
pub mod notification;
pub mod part;
pub mod profile;
pub mod sale;
pub mod work_order;

// Re-exports
pub use branch::*;
pub use cash_transaction::*;
pub use customer::*;
pub use notification::*;
pub use part::*;
pub use profile::*;
pub use sale::*;
pub use work_order::*;

/// A TEXT column held a value no enum variant matches
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declare a snake_case string enum with `as_str`, `from_db` and the
/// `TryFrom<String>` impl used by `sqlx(try_from = "String")`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            pub fn from_db(value: &str) -> Option<Self> {
                match value {
                    $( $text => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_db(&value).ok_or($crate::models::UnknownVariant {
                    kind: $kind,
                    value,
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use text_enum;

text_enum! {
    /// How money changed hands
    pub enum PaymentMethod: "payment method" {
        Cash => "cash",
        Bank => "bank",
        Card => "card",
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_text_roundtrip() {
        for method in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::from_db(method.as_str()), Some(*method));
        }
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(
            PaymentMethod::try_from("cheque".to_string()),
            Err(UnknownVariant {
                kind: "payment method",
                value: "cheque".to_string()
            })
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Bank).unwrap(),
            "\"bank\""
        );
    }
}
