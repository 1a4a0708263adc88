use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use csv::Writer;
use serde::Serialize;

use crate::AppState;
use crate::backoffice::OrderFilter;
use crate::backoffice::models::{InventoryReportRow, Order, SalesReportRow};
use crate::domain::overdue::order_overdue;
use crate::error::AppError;
use crate::session::SessionContext;

use super::orders::OrderListQuery;
use super::reports::{build_report_filter, ReportQuery};

/// Upper bound on rows fetched for a single export.
pub(crate) const EXPORT_LIMIT: u32 = 10_000;

/// CSV row for the orders export. Every field is a String so the csv crate
/// handles quoting and escaping; amounts keep their decimal rendering.
#[derive(Debug, Serialize)]
pub(crate) struct OrderCsvRow {
    order_number: String,
    order_type: String,
    status: String,
    customer: String,
    customer_phone: String,
    branch: String,
    total_amount: String,
    paid_amount: String,
    balance_amount: String,
    created_date: String,
    next_due_date: String,
    notes: String,
}

impl From<&Order> for OrderCsvRow {
    fn from(order: &Order) -> Self {
        OrderCsvRow {
            order_number: order.order_number.clone(),
            order_type: order.order_type.as_str().to_string(),
            status: order.status.as_str().to_string(),
            customer: order.customer.name.clone(),
            customer_phone: order.customer.phone.clone().unwrap_or_default(),
            branch: order.branch.name.clone(),
            total_amount: order.total_amount.to_string(),
            paid_amount: order.paid_amount.to_string(),
            balance_amount: order.balance_amount.to_string(),
            created_date: order.created_date.to_rfc3339(),
            next_due_date: order
                .next_due_date
                .map(|due| due.to_rfc3339())
                .unwrap_or_default(),
            notes: order.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SalesCsvRow {
    branch: String,
    order_count: u64,
    gross_sales: String,
    payments_received: String,
    outstanding_balance: String,
}

impl From<&SalesReportRow> for SalesCsvRow {
    fn from(row: &SalesReportRow) -> Self {
        SalesCsvRow {
            branch: row.branch.name.clone(),
            order_count: row.order_count,
            gross_sales: row.gross_sales.to_string(),
            payments_received: row.payments_received.to_string(),
            outstanding_balance: row.outstanding_balance.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InventoryCsvRow {
    branch: String,
    product: String,
    sku: String,
    quantity_on_hand: i64,
    reserved: i64,
    reorder_level: i64,
    stock_value: String,
}

impl From<&InventoryReportRow> for InventoryCsvRow {
    fn from(row: &InventoryReportRow) -> Self {
        InventoryCsvRow {
            branch: row.branch.name.clone(),
            product: row.product.name.clone(),
            sku: row.product.sku.clone(),
            quantity_on_hand: row.quantity_on_hand,
            reserved: row.reserved,
            reorder_level: row.reorder_level,
            stock_value: row.stock_value.to_string(),
        }
    }
}

/// Serializes rows through `csv::Writer`, which quotes and escapes any field
/// containing commas, quotes or newlines. The header row comes from the
/// struct's field names.
pub(crate) fn write_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, AppError> {
    let mut writer = Writer::from_writer(vec![]);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| AppError::Internal(format!("CSV write failed: {err}")))?;
    }

    writer
        .into_inner()
        .map_err(|err| AppError::Internal(format!("CSV write failed: {err}")))
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> Result<Response, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|err| AppError::Internal(err.to_string()))?,
    );

    Ok((StatusCode::OK, headers, body).into_response())
}

pub async fn export_orders(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<OrderListQuery>,
) -> Result<Response, AppError> {
    let filter = OrderFilter {
        status: query.status,
        order_type: query.order_type,
        branch_id: session.effective_branch(query.branch_id),
        search: query.search,
        limit: Some(EXPORT_LIMIT),
        offset: None,
    };

    let page = state
        .backoffice
        .list_orders(&session.token, &filter)
        .await
        .map_err(AppError::upstream)?;

    let now = Utc::now();
    let grace = state.config.collection_grace_days;
    let mut orders = page.items;
    if query.overdue == Some(true) {
        orders.retain(|order| order_overdue(order, now, grace));
    }

    let rows: Vec<OrderCsvRow> = orders.iter().map(OrderCsvRow::from).collect();
    let body = write_csv(&rows)?;
    csv_attachment(&format!("orders_{}.csv", now.format("%Y-%m-%d")), body)
}

pub async fn export_sales_report(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let filter = build_report_filter(&session, &query)?;
    let report = state
        .backoffice
        .sales_report(&session.token, &filter)
        .await
        .map_err(AppError::upstream)?;

    let rows: Vec<SalesCsvRow> = report.iter().map(SalesCsvRow::from).collect();
    let body = write_csv(&rows)?;
    csv_attachment(
        &format!("sales_report_{}.csv", Utc::now().format("%Y-%m-%d")),
        body,
    )
}

pub async fn export_inventory_report(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let branch_id = session.effective_branch(query.branch_id);
    let report = state
        .backoffice
        .inventory_report(&session.token, branch_id)
        .await
        .map_err(AppError::upstream)?;

    let rows: Vec<InventoryCsvRow> = report.iter().map(InventoryCsvRow::from).collect();
    let body = write_csv(&rows)?;
    csv_attachment(
        &format!("inventory_report_{}.csv", Utc::now().format("%Y-%m-%d")),
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoffice::models::{BranchRef, CustomerRef, OrderStatus, OrderType};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn order_with_notes(notes: &str) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-0042".to_string(),
            order_type: OrderType::Layaway,
            status: OrderStatus::PartiallyPaid,
            total_amount: BigDecimal::from_str("1500.00").unwrap(),
            paid_amount: BigDecimal::from_str("500.00").unwrap(),
            balance_amount: BigDecimal::from_str("1000.00").unwrap(),
            customer: CustomerRef {
                id: Uuid::new_v4(),
                name: "Mwangi, Jane".to_string(),
                phone: Some("+254712345678".to_string()),
            },
            branch: BranchRef {
                id: Uuid::new_v4(),
                name: "Westlands".to_string(),
            },
            items: vec![],
            created_date: Utc::now(),
            next_due_date: None,
            notes: Some(notes.to_string()),
        }
    }

    #[test]
    fn quotes_fields_containing_commas() {
        let rows = vec![OrderCsvRow::from(&order_with_notes("plain"))];
        let csv = String::from_utf8(write_csv(&rows).unwrap()).unwrap();

        assert!(csv.starts_with("order_number,order_type,status,customer"));
        assert!(csv.contains("\"Mwangi, Jane\""));
    }

    #[test]
    fn escapes_embedded_quotes_and_newlines() {
        let order = order_with_notes("ring size \"M\",\nresize before collection");
        let rows = vec![OrderCsvRow::from(&order)];
        let bytes = write_csv(&rows).unwrap();
        let csv = String::from_utf8(bytes.clone()).unwrap();

        assert!(csv.contains("\"ring size \"\"M\"\",\nresize before collection\""));

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(
            record.get(11).unwrap(),
            "ring size \"M\",\nresize before collection"
        );
    }

    #[test]
    fn header_row_appears_once() {
        let rows = vec![
            OrderCsvRow::from(&order_with_notes("first")),
            OrderCsvRow::from(&order_with_notes("second")),
        ];
        let csv = String::from_utf8(write_csv(&rows).unwrap()).unwrap();

        assert_eq!(csv.matches("order_number").count(), 1);
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn empty_export_is_valid_csv() {
        let rows: Vec<OrderCsvRow> = vec![];
        let csv = String::from_utf8(write_csv(&rows).unwrap()).unwrap();
        assert!(csv.is_empty());
    }
}
