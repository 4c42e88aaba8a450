//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;

use crate::error::{AppError, ErrorCode};
use crate::models::{SaleItemInput, WorkOrderPart};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Default VAT rate applied when a sale does not carry one
pub const DEFAULT_VAT_RATE: f64 = 0.1;

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an amount to 2 decimal places, half-up
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Equal within [`MONEY_TOLERANCE`]
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}

fn invalid_amount(msg: String) -> AppError {
    AppError::with_message(ErrorCode::InvalidAmount, msg)
}

/// Validate that an amount is finite, non-negative and below the cap
pub fn require_amount(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(invalid_amount(format!(
            "{field_name} must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(invalid_amount(format!(
            "{field_name} must be non-negative, got {value}"
        )));
    }
    if value > MAX_PRICE {
        return Err(invalid_amount(format!(
            "{field_name} exceeds maximum allowed ({MAX_PRICE}), got {value}"
        )));
    }
    Ok(())
}

/// Validate one sale line
pub fn validate_sale_line(item: &SaleItemInput) -> Result<(), AppError> {
    if item.quantity <= 0 || item.quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!(
                "quantity must be between 1 and {MAX_QUANTITY}, got {}",
                item.quantity
            ),
        )
        .with_detail("part_id", item.part_id));
    }
    require_amount(item.unit_price, "unit_price")?;
    let discount = item.discount.unwrap_or(0.0);
    require_amount(discount, "discount")?;
    if to_decimal(discount) > line_gross(item) {
        return Err(invalid_amount(format!(
            "line discount {discount} exceeds line amount for part {}",
            item.part_id
        )));
    }
    Ok(())
}

fn line_gross(item: &SaleItemInput) -> Decimal {
    to_decimal(item.unit_price) * Decimal::from(item.quantity)
}

/// Net amount of one line: quantity × unit price − line discount
pub fn line_total(item: &SaleItemInput) -> Decimal {
    line_gross(item) - to_decimal(item.discount.unwrap_or(0.0))
}

/// Computed totals of a sale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub vat_rate: f64,
    pub vat_amount: f64,
    pub total: f64,
}

/// Compute sale totals.
///
/// `subtotal = Σ line_total`, VAT is charged on `subtotal − discount`,
/// `total = subtotal − discount + vat_amount`.
pub fn sale_totals(
    items: &[SaleItemInput],
    discount: f64,
    vat_rate: f64,
) -> Result<SaleTotals, AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::SaleEmpty));
    }
    for item in items {
        validate_sale_line(item)?;
    }
    require_amount(discount, "discount")?;
    if !vat_rate.is_finite() || !(0.0..=1.0).contains(&vat_rate) {
        return Err(invalid_amount(format!(
            "vat_rate must be between 0 and 1, got {vat_rate}"
        )));
    }

    let subtotal: Decimal = items.iter().map(line_total).sum();
    let discount = to_decimal(discount);
    if discount > subtotal {
        return Err(invalid_amount(format!(
            "discount {discount} exceeds subtotal {subtotal}"
        )));
    }
    let taxable = subtotal - discount;
    let vat_amount = (taxable * to_decimal(vat_rate))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let total = taxable + vat_amount;

    Ok(SaleTotals {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        vat_rate,
        vat_amount: to_f64(vat_amount),
        total: to_f64(total),
    })
}

/// Work order total: Σ(parts) + labor − discount; the discount may not exceed the gross
pub fn work_order_total(
    parts: &[WorkOrderPart],
    labor_cost: f64,
    discount: f64,
) -> Result<f64, AppError> {
    require_amount(labor_cost, "labor_cost")?;
    require_amount(discount, "discount")?;
    let mut gross = to_decimal(labor_cost);
    for part in parts {
        if part.quantity <= 0 || part.quantity > MAX_QUANTITY {
            return Err(AppError::with_message(
                ErrorCode::InvalidQuantity,
                format!("quantity for {} must be positive", part.name),
            ));
        }
        require_amount(part.unit_price, "unit_price")?;
        gross += to_decimal(part.unit_price) * Decimal::from(part.quantity);
    }
    let discount = to_decimal(discount);
    if discount > gross {
        return Err(invalid_amount(format!(
            "discount {discount} exceeds work order amount {gross}"
        )));
    }
    Ok(to_f64(gross - discount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(part_id: i64, quantity: i64, unit_price: f64, discount: Option<f64>) -> SaleItemInput {
        SaleItemInput {
            part_id,
            quantity,
            unit_price,
            discount,
        }
    }

    #[test]
    fn totals_apply_discount_then_vat() {
        let items = vec![
            line(1, 2, 150_000.0, None),
            line(2, 1, 80_000.0, Some(10_000.0)),
        ];
        let totals = sale_totals(&items, 20_000.0, 0.1).unwrap();
        assert_eq!(totals.subtotal, 370_000.0);
        assert_eq!(totals.discount, 20_000.0);
        assert_eq!(totals.vat_amount, 35_000.0);
        assert_eq!(totals.total, 385_000.0);
    }

    #[test]
    fn vat_rounds_half_up() {
        let totals = sale_totals(&[line(1, 1, 0.05, None)], 0.0, 0.1).unwrap();
        // 0.005 → 0.01
        assert_eq!(totals.vat_amount, 0.01);
        assert_eq!(totals.total, 0.06);
    }

    #[test]
    fn rejects_empty_and_bad_lines() {
        assert_eq!(
            sale_totals(&[], 0.0, 0.1).unwrap_err().code,
            ErrorCode::SaleEmpty
        );
        assert_eq!(
            sale_totals(&[line(1, 0, 10.0, None)], 0.0, 0.1)
                .unwrap_err()
                .code,
            ErrorCode::InvalidQuantity
        );
        assert_eq!(
            sale_totals(&[line(1, 1, f64::NAN, None)], 0.0, 0.1)
                .unwrap_err()
                .code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            sale_totals(&[line(1, 1, 10.0, Some(11.0))], 0.0, 0.1)
                .unwrap_err()
                .code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            sale_totals(&[line(1, 1, 10.0, None)], 20.0, 0.1)
                .unwrap_err()
                .code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            sale_totals(&[line(1, 1, 10.0, None)], 0.0, 1.5)
                .unwrap_err()
                .code,
            ErrorCode::InvalidAmount
        );
    }

    #[test]
    fn money_comparison_tolerance() {
        assert!(money_eq(100.0, 100.004));
        assert!(money_eq(0.1 + 0.2, 0.3));
        assert!(!money_eq(100.0, 100.02));
        assert_eq!(round_money(2.346), 2.35);
        assert_eq!(round_money(2.3449), 2.34);
    }

    #[test]
    fn work_order_totals() {
        let parts = vec![WorkOrderPart {
            part_id: Some(1),
            name: "Oil filter".to_string(),
            quantity: 2,
            unit_price: 45_000.0,
        }];
        assert_eq!(work_order_total(&parts, 100_000.0, 10_000.0).unwrap(), 180_000.0);
        assert!(work_order_total(&parts, 0.0, 1_000_000.0).is_err());
        assert_eq!(work_order_total(&[], 0.0, 0.0).unwrap(), 0.0);
    }
}
