//! Work Order Model (service tickets)

use serde::{Deserialize, Serialize};

use super::{PaymentMethod, normalize_phone, normalize_plate};
use crate::error::{AppError, ErrorCode};

super::text_enum! {
    /// Service ticket lifecycle
    pub enum WorkOrderStatus: "work order status" {
        Received => "received",
        Diagnosing => "diagnosing",
        InProgress => "in_progress",
        WaitingParts => "waiting_parts",
        Completed => "completed",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

impl WorkOrderStatus {
    /// Delivered and cancelled tickets accept no further changes
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// received → diagnosing → in_progress ⇄ waiting_parts → completed → delivered,
    /// any open ticket may be cancelled; staying put is always allowed.
    pub fn can_transition_to(&self, next: WorkOrderStatus) -> bool {
        use WorkOrderStatus::*;
        if *self == next {
            return true;
        }
        if self.is_closed() {
            return false;
        }
        match (self, next) {
            (_, Cancelled) => true,
            (Received, Diagnosing) => true,
            (Diagnosing, InProgress) => true,
            (InProgress, WaitingParts | Completed) => true,
            (WaitingParts, InProgress | Completed) => true,
            (Completed, Delivered) => true,
            _ => false,
        }
    }
}

super::text_enum! {
    /// How much of a ticket has been paid
    pub enum PaymentStatus: "payment status" {
        Unpaid => "unpaid",
        Partial => "partial",
        Paid => "paid",
    }
}

impl PaymentStatus {
    /// Derive from the amount received (deposit included) against the total
    pub fn derive(received: f64, total: f64) -> Self {
        if received <= 0.0 && total > 0.0 {
            PaymentStatus::Unpaid
        } else if crate::money::money_eq(received, total) || received > total {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        }
    }
}

/// A part (or free-text item) used on a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderPart {
    pub part_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Service ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WorkOrder {
    pub id: i64,
    pub code: String,
    pub branch_id: String,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub issue_description: String,
    pub technician_name: Option<String>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: WorkOrderStatus,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub parts_used: Vec<WorkOrderPart>,
    pub labor_cost: f64,
    pub discount: f64,
    pub deposit_amount: f64,
    pub deposit_paid_at: Option<i64>,
    pub total: f64,
    pub paid_amount: f64,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_status: PaymentStatus,
    pub note: Option<String>,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create work order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderCreate {
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub issue_description: String,
    pub technician_name: Option<String>,
    #[serde(default)]
    pub parts_used: Vec<WorkOrderPart>,
    pub labor_cost: Option<f64>,
    pub discount: Option<f64>,
    pub deposit_amount: Option<f64>,
    pub deposit_method: Option<PaymentMethod>,
    pub note: Option<String>,
}

/// Update work order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkOrderUpdate {
    pub status: Option<WorkOrderStatus>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub issue_description: Option<String>,
    pub technician_name: Option<String>,
    pub parts_used: Option<Vec<WorkOrderPart>>,
    pub labor_cost: Option<f64>,
    pub discount: Option<f64>,
    pub paid_amount: Option<f64>,
    pub note: Option<String>,
}

impl WorkOrderCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.customer_name.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "customer_name is required",
            ));
        }
        if self.issue_description.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "issue_description is required",
            ));
        }
        if let Some(deposit) = self.deposit_amount {
            crate::money::require_amount(deposit, "deposit_amount")?;
        }
        Ok(())
    }
}

impl WorkOrder {
    /// Amount received so far, deposit included
    pub fn received(&self) -> f64 {
        crate::money::round_money(self.deposit_amount + self.paid_amount)
    }

    pub fn balance_due(&self) -> f64 {
        crate::money::round_money((self.total - self.received()).max(0.0))
    }

    /// Recompute `total` and `payment_status` from parts, labor and payments
    pub fn recompute(&mut self) -> Result<(), AppError> {
        self.total =
            crate::money::work_order_total(&self.parts_used, self.labor_cost, self.discount)?;
        self.payment_status = PaymentStatus::derive(self.received(), self.total);
        Ok(())
    }

    /// Apply an update in place, enforcing the lifecycle.
    ///
    /// Returns the previous status when the status changed.
    pub fn apply_update(
        &mut self,
        update: WorkOrderUpdate,
    ) -> Result<Option<WorkOrderStatus>, AppError> {
        if self.status.is_closed() {
            return Err(AppError::with_message(
                ErrorCode::WorkOrderClosed,
                format!("work order {} is {}", self.code, self.status),
            ));
        }

        let mut previous = None;
        if let Some(next) = update.status {
            if !self.status.can_transition_to(next) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidStatusTransition,
                    format!("cannot move work order from {} to {}", self.status, next),
                )
                .with_detail("from", self.status.as_str())
                .with_detail("to", next.as_str()));
            }
            if next != self.status {
                previous = Some(self.status);
                self.status = next;
            }
        }

        if let Some(v) = update.customer_name {
            let name = v.trim();
            if name.is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::RequiredField,
                    "customer_name is required",
                ));
            }
            self.customer_name = name.to_string();
        }
        if let Some(v) = update.customer_phone {
            // blank clears the phone
            self.customer_phone = normalize_phone(&v);
        }
        if let Some(v) = update.vehicle_model {
            self.vehicle_model = Some(v);
        }
        if let Some(v) = update.license_plate {
            self.license_plate = normalize_plate(&v);
        }
        if let Some(v) = update.issue_description {
            self.issue_description = v;
        }
        if let Some(v) = update.technician_name {
            self.technician_name = Some(v);
        }
        if let Some(v) = update.parts_used {
            self.parts_used = v;
        }
        if let Some(v) = update.labor_cost {
            self.labor_cost = v;
        }
        if let Some(v) = update.discount {
            self.discount = v;
        }
        if let Some(v) = update.paid_amount {
            crate::money::require_amount(v, "paid_amount")?;
            self.paid_amount = v;
        }
        if let Some(v) = update.note {
            self.note = Some(v);
        }

        self.recompute()?;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkOrderStatus::*;

    fn ticket() -> WorkOrder {
        WorkOrder {
            id: 1,
            code: "SC-20260115-0001".to_string(),
            branch_id: "CN1".to_string(),
            customer_id: None,
            customer_name: "Minh".to_string(),
            customer_phone: None,
            vehicle_model: Some("Honda Wave".to_string()),
            license_plate: None,
            issue_description: "Engine noise".to_string(),
            technician_name: None,
            status: Received,
            parts_used: vec![],
            labor_cost: 0.0,
            discount: 0.0,
            deposit_amount: 50_000.0,
            deposit_paid_at: Some(0),
            total: 0.0,
            paid_amount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            note: None,
            created_by: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn lifecycle_transitions() {
        assert!(Received.can_transition_to(Diagnosing));
        assert!(Diagnosing.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(WaitingParts));
        assert!(WaitingParts.can_transition_to(InProgress));
        assert!(WaitingParts.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Delivered));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(Completed.can_transition_to(Cancelled));
        assert!(Received.can_transition_to(Received));

        assert!(!Received.can_transition_to(InProgress));
        assert!(!Diagnosing.can_transition_to(WaitingParts));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Received.can_transition_to(Completed));
        assert!(!Received.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Received));
    }

    #[test]
    fn payment_status_derivation() {
        assert_eq!(PaymentStatus::derive(0.0, 100.0), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(40.0, 100.0), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::derive(100.0, 100.0), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::derive(0.0, 0.0), PaymentStatus::Paid);
    }

    #[test]
    fn update_recomputes_totals() {
        let mut wo = ticket();
        let prev = wo
            .apply_update(WorkOrderUpdate {
                status: Some(Diagnosing),
                parts_used: Some(vec![WorkOrderPart {
                    part_id: Some(9),
                    name: "Chain kit".to_string(),
                    quantity: 1,
                    unit_price: 250_000.0,
                }]),
                labor_cost: Some(100_000.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(prev, Some(Received));
        assert_eq!(wo.total, 350_000.0);
        assert_eq!(wo.payment_status, PaymentStatus::Partial);
        assert_eq!(wo.balance_due(), 300_000.0);

        wo.apply_update(WorkOrderUpdate {
            paid_amount: Some(300_000.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(wo.payment_status, PaymentStatus::Paid);
        assert_eq!(wo.balance_due(), 0.0);
    }

    #[test]
    fn rejects_illegal_transition_and_closed_ticket() {
        let mut wo = ticket();
        let err = wo
            .apply_update(WorkOrderUpdate {
                status: Some(Delivered),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(wo.status, Received);

        wo.status = Cancelled;
        let err = wo
            .apply_update(WorkOrderUpdate {
                note: Some("late note".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::WorkOrderClosed);
    }

    #[test]
    fn update_normalizes_contact_fields() {
        let mut wo = ticket();
        wo.apply_update(WorkOrderUpdate {
            customer_name: Some("  Lan  ".into()),
            customer_phone: Some(" 0912 345 678 ".into()),
            license_plate: Some("59x1 234.56".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(wo.customer_name, "Lan");
        assert_eq!(wo.customer_phone.as_deref(), Some("0912345678"));
        assert_eq!(wo.license_plate.as_deref(), Some("59X1234.56"));

        wo.apply_update(WorkOrderUpdate {
            customer_phone: Some("   ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(wo.customer_phone, None);

        let err = wo
            .apply_update(WorkOrderUpdate {
                customer_name: Some("   ".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(wo.customer_name, "Lan");
    }

    #[test]
    fn status_text() {
        assert_eq!(InProgress.as_str(), "in_progress");
        assert_eq!(WorkOrderStatus::from_db("waiting_parts"), Some(WaitingParts));
        assert_eq!(
            serde_json::to_string(&WaitingParts).unwrap(),
            "\"waiting_parts\""
        );
    }
}
