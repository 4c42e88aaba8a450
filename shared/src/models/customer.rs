//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer (shared across branches)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub license_plate: Option<String>,
    pub vehicle_model: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub license_plate: Option<String>,
    pub vehicle_model: Option<String>,
    pub notes: Option<String>,
}

/// Update customer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub license_plate: Option<String>,
    pub vehicle_model: Option<String>,
    pub notes: Option<String>,
}

/// Keep digits and a leading `+`; empty → `None`
pub fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let mut out = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.chars().enumerate() {
        if c.is_ascii_digit() || (i == 0 && c == '+') {
            out.push(c);
        }
    }
    if out.is_empty() || out == "+" {
        None
    } else {
        Some(out)
    }
}

/// Upper-case a license plate and drop inner whitespace
pub fn normalize_plate(plate: &str) -> Option<String> {
    let out: String = plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    if out.is_empty() { None } else { Some(out) }
}

impl CustomerCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("customer name is required".to_string());
        }
        if let Some(phone) = &self.phone
            && !phone.trim().is_empty()
            && normalize_phone(phone).is_none_or(|p| p.trim_start_matches('+').len() < 8)
        {
            return Err(format!("invalid phone number: {phone}"));
        }
        Ok(())
    }

    /// Normalise phone and plate in place
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.phone = self.phone.as_deref().and_then(normalize_phone);
        self.license_plate = self.license_plate.as_deref().and_then(normalize_plate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization() {
        assert_eq!(
            normalize_phone(" 0912 345 678 "),
            Some("0912345678".to_string())
        );
        assert_eq!(
            normalize_phone("+84 912-345-678"),
            Some("+84912345678".to_string())
        );
        assert_eq!(normalize_phone("  "), None);
    }

    #[test]
    fn plate_normalization() {
        assert_eq!(normalize_plate("59x1 234.56"), Some("59X1234.56".to_string()));
        assert_eq!(normalize_plate(""), None);
    }

    #[test]
    fn validation() {
        let mut c = CustomerCreate {
            name: "Anh Tuan".to_string(),
            phone: Some("0912345678".to_string()),
            email: None,
            address: None,
            license_plate: None,
            vehicle_model: None,
            notes: None,
        };
        assert!(c.validate().is_ok());

        c.phone = Some("12".to_string());
        assert!(c.validate().is_err());

        c.phone = None;
        c.name = " ".to_string();
        assert!(c.validate().is_err());
    }
}
