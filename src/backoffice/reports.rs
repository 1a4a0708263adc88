use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{InventoryReportRow, SalesReportRow};
use super::{BackofficeClient, BackofficeError};

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub branch_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ReportFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(branch_id) = &self.branch_id {
            pairs.push(("branchId", branch_id.to_string()));
        }
        if let Some(from) = &self.from {
            pairs.push(("from", from.to_rfc3339()));
        }
        if let Some(to) = &self.to {
            pairs.push(("to", to.to_rfc3339()));
        }
        pairs
    }
}

impl BackofficeClient {
    pub async fn sales_report(
        &self,
        token: &str,
        filter: &ReportFilter,
    ) -> Result<Vec<SalesReportRow>, BackofficeError> {
        self.get_json(token, "/api/reports/sales", &filter.query_pairs()).await
    }

    pub async fn inventory_report(
        &self,
        token: &str,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<InventoryReportRow>, BackofficeError> {
        let mut pairs = Vec::new();
        if let Some(branch_id) = branch_id {
            pairs.push(("branchId", branch_id.to_string()));
        }
        self.get_json(token, "/api/reports/inventory", &pairs).await
    }
}
