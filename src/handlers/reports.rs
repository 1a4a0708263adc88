use axum::{
    extract::{Query, State},
    response::Response,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::backoffice::ReportFilter;
use crate::backoffice::models::SalesReportRow;
use crate::error::AppError;
use crate::revalidate::routes;
use crate::session::SessionContext;

use super::page_response;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub branch_id: Option<Uuid>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Accepts both YYYY-MM-DD and full RFC 3339 timestamps, the two shapes the
/// console's date pickers produce.
fn parse_date(name: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    let padded = if raw.len() == 10 {
        format!("{raw}T00:00:00Z")
    } else {
        raw.to_string()
    };

    DateTime::parse_from_rfc3339(&padded)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| AppError::BadRequest(format!("invalid {name} date: {err}")))
}

/// Shared between the report pages and their CSV exports. A bare `to` date
/// means "through the end of that day", so one day is added before it is
/// sent upstream as an exclusive bound.
pub(crate) fn build_report_filter(
    session: &SessionContext,
    query: &ReportQuery,
) -> Result<ReportFilter, AppError> {
    let from = query
        .from
        .as_deref()
        .map(|raw| parse_date("from", raw))
        .transpose()?;

    let to = match query.to.as_deref() {
        Some(raw) => {
            let parsed = parse_date("to", raw)?;
            Some(if raw.len() == 10 {
                parsed + Duration::days(1)
            } else {
                parsed
            })
        }
        None => None,
    };

    Ok(ReportFilter {
        branch_id: session.effective_branch(query.branch_id),
        from,
        to,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub order_count: u64,
    pub gross_sales: BigDecimal,
    pub payments_received: BigDecimal,
    pub outstanding_balance: BigDecimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportView {
    pub rows: Vec<SalesReportRow>,
    pub totals: SalesTotals,
}

fn sales_totals(rows: &[SalesReportRow]) -> SalesTotals {
    rows.iter().fold(
        SalesTotals {
            order_count: 0,
            gross_sales: BigDecimal::from(0),
            payments_received: BigDecimal::from(0),
            outstanding_balance: BigDecimal::from(0),
        },
        |acc, row| SalesTotals {
            order_count: acc.order_count + row.order_count,
            gross_sales: acc.gross_sales + &row.gross_sales,
            payments_received: acc.payments_received + &row.payments_received,
            outstanding_balance: acc.outstanding_balance + &row.outstanding_balance,
        },
    )
}

pub async fn sales_report(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let filter = build_report_filter(&session, &query)?;
    let rows = state
        .backoffice
        .sales_report(&session.token, &filter)
        .await
        .map_err(AppError::upstream)?;

    let view = SalesReportView {
        totals: sales_totals(&rows),
        rows,
    };

    page_response(&state, routes::SALES_REPORT, view).await
}

pub async fn inventory_report(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let branch_id = session.effective_branch(query.branch_id);
    let rows = state
        .backoffice
        .inventory_report(&session.token, branch_id)
        .await
        .map_err(AppError::upstream)?;

    page_response(&state, routes::INVENTORY_REPORT, rows).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_bare_dates_as_utc_midnight() {
        let parsed = parse_date("from", "2024-03-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_full_timestamps() {
        let parsed = parse_date("from", "2024-03-01T08:30:00+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 5, 30, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_dates() {
        let err = parse_date("to", "yesterday").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn bare_end_date_covers_the_whole_day() {
        let session = SessionContext {
            token: "tok".to_string(),
            role: crate::session::Role::Admin,
            branch_id: None,
        };
        let query = ReportQuery {
            branch_id: None,
            from: Some("2024-03-01".to_string()),
            to: Some("2024-03-31".to_string()),
        };

        let filter = build_report_filter(&session, &query).unwrap();
        assert_eq!(
            filter.to.unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn totals_sum_every_branch_row() {
        use crate::backoffice::models::BranchRef;
        use std::str::FromStr;

        let row = |count: u64, gross: &str| SalesReportRow {
            branch: BranchRef {
                id: Uuid::new_v4(),
                name: "Westlands".to_string(),
            },
            order_count: count,
            gross_sales: BigDecimal::from_str(gross).unwrap(),
            payments_received: BigDecimal::from_str("10.00").unwrap(),
            outstanding_balance: BigDecimal::from_str("5.00").unwrap(),
        };

        let totals = sales_totals(&[row(3, "100.00"), row(2, "250.50")]);
        assert_eq!(totals.order_count, 5);
        assert_eq!(totals.gross_sales, BigDecimal::from_str("350.50").unwrap());
        assert_eq!(
            totals.payments_received,
            BigDecimal::from_str("20.00").unwrap()
        );
    }
}
