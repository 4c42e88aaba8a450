//! Reporting endpoints
//!
//! Dates are `YYYY-MM-DD`, both ends inclusive, cut at the configured UTC
//! offset.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::report::{DailyRevenue, aggregate_daily, map_sales_to_csv_rows, render_csv};

use super::ApiResult;
use crate::auth::BranchScope;
use crate::error::internal;
use crate::state::AppState;
use crate::util::day_range_millis;

/// Longest range a single report may span
pub const MAX_REPORT_DAYS: i64 = 366;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reports/daily", get(daily))
        .route("/api/reports/sales.csv", get(sales_csv))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueSource {
    /// Sale totals
    #[default]
    Sales,
    /// Net cash flow of the cash book
    Cash,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub source: RevenueSource,
}

/// Validate the range and turn it into `[from, to)` epoch millis
pub fn period_millis(
    from: NaiveDate,
    to: NaiveDate,
    utc_offset_minutes: i32,
) -> Result<(i64, i64), AppError> {
    if from > to {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "from must not be after to",
        ));
    }
    if (to - from).num_days() >= MAX_REPORT_DAYS {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            format!("range must not exceed {MAX_REPORT_DAYS} days"),
        ));
    }
    let (start, end) = day_range_millis(from, to, utc_offset_minutes);
    Ok((start, end + 1))
}

/// GET /api/reports/daily?from=&to=[&source=sales|cash]
pub async fn daily(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Vec<DailyRevenue>> {
    let offset = state.report_utc_offset_minutes;
    let (from, to) = period_millis(query.from, query.to, offset)?;

    let days = match query.source {
        RevenueSource::Sales => {
            let sales = crate::db::sales::list_range(&state.pool, &scope.branch_id, from, to)
                .await
                .map_err(internal)?;
            aggregate_daily(&sales, offset)
        }
        RevenueSource::Cash => {
            let rows = crate::db::cash_transactions::list_range(
                &state.pool,
                &scope.branch_id,
                Some(from),
                Some(to),
            )
            .await
            .map_err(internal)?;
            aggregate_daily(&rows, offset)
        }
    };
    Ok(ApiResponse::success(days))
}

/// GET /api/reports/sales.csv?from=&to=
pub async fn sales_csv(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<DateRangeQuery>,
) -> Result<Response, AppError> {
    let offset = state.report_utc_offset_minutes;
    let (from, to) = period_millis(query.from, query.to, offset)?;
    let sales = crate::db::sales::list_range(&state.pool, &scope.branch_id, from, to)
        .await
        .map_err(internal)?;

    let body = render_csv(&map_sales_to_csv_rows(&sales, offset));
    let filename = format!(
        "sales_{}_{}_{}.csv",
        scope.branch_id, query.from, query.to
    );
    tracing::info!(branch_id = %scope.branch_id, rows = sales.len(), "Sales CSV exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn single_day_covers_whole_day() {
        let (from, to) = period_millis(date("2026-01-15"), date("2026-01-15"), 0).unwrap();
        assert_eq!(to - from, 86_400_000);
        assert_eq!(from, 1_768_435_200_000);
    }

    #[test]
    fn offset_shifts_day_boundary() {
        let (utc_from, _) = period_millis(date("2026-01-15"), date("2026-01-15"), 0).unwrap();
        let (ict_from, _) = period_millis(date("2026-01-15"), date("2026-01-15"), 420).unwrap();
        assert_eq!(utc_from - ict_from, 7 * 3_600_000);
    }

    #[test]
    fn inverted_or_huge_ranges_are_rejected() {
        let err = period_millis(date("2026-02-01"), date("2026-01-01"), 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert!(period_millis(date("2025-01-01"), date("2026-06-01"), 0).is_err());
        assert!(period_millis(date("2025-01-01"), date("2025-12-31"), 0).is_ok());
    }

    #[test]
    fn source_defaults_to_sales() {
        let q: DateRangeQuery =
            serde_json::from_str(r#"{"from":"2026-01-01","to":"2026-01-31"}"#).unwrap();
        assert_eq!(q.source, RevenueSource::Sales);
        let q: DateRangeQuery =
            serde_json::from_str(r#"{"from":"2026-01-01","to":"2026-01-31","source":"cash"}"#)
                .unwrap();
        assert_eq!(q.source, RevenueSource::Cash);
    }
}
