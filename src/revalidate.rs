//! Route revision registry.
//! Explicit stand-in for a rendering framework's page-cache invalidator.
//! Mutations bump the revision of every route that renders the entity they
//! touched; page responses stamp their current revision in a header and a
//! fronting cache can purge from the snapshot endpoint. There is no entity
//! cache behind this: pages re-fetch from the backoffice on every load.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod routes {
    use uuid::Uuid;

    pub const ORDERS: &str = "/orders";
    pub const BRANCHES: &str = "/branches";
    pub const PRODUCTS: &str = "/products";
    pub const BATCHES: &str = "/batches";
    pub const INVENTORY: &str = "/inventory";
    pub const CUSTOMERS: &str = "/customers";
    pub const REFERRALS: &str = "/referrals";
    pub const SALES_REPORT: &str = "/reports/sales";
    pub const INVENTORY_REPORT: &str = "/reports/inventory";

    pub fn order_detail(id: Uuid) -> String {
        format!("/orders/{id}")
    }

    pub fn customer_detail(id: Uuid) -> String {
        format!("/customers/{id}")
    }
}

#[derive(Clone, Default)]
pub struct Revalidator {
    revisions: Arc<RwLock<HashMap<String, u64>>>,
}

impl Revalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumps each route's revision. Infallible and unconditional; callers
    /// never branch on the outcome.
    pub async fn invalidate<S: AsRef<str>>(&self, routes: &[S]) {
        if routes.is_empty() {
            return;
        }

        let mut revisions = self.revisions.write().await;
        for route in routes {
            *revisions.entry(route.as_ref().to_string()).or_insert(0) += 1;
        }

        drop(revisions);
        tracing::debug!(
            "revalidated {} route(s): {}",
            routes.len(),
            routes
                .iter()
                .map(|r| r.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    /// Current revision of a route; routes never invalidated sit at 0.
    pub async fn revision(&self, route: &str) -> u64 {
        self.revisions.read().await.get(route).copied().unwrap_or(0)
    }

    pub async fn snapshot(&self) -> HashMap<String, u64> {
        self.revisions.read().await.clone()
    }
}
