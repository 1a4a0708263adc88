pub mod actions;
pub mod backoffice;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod revalidate;
pub mod session;
pub mod validation;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::backoffice::BackofficeClient;
use crate::config::{AllowedOrigins, Config};
use crate::revalidate::Revalidator;

#[derive(Clone)]
pub struct AppState {
    pub backoffice: BackofficeClient,
    pub revalidator: Revalidator,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            backoffice: BackofficeClient::new(config.backoffice_api_url.clone()),
            revalidator: Revalidator::new(),
            config: Arc::new(config),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health),
    components(schemas(handlers::HealthView, actions::ActionResponse)),
    tags((name = "Health", description = "Console liveness and backoffice reachability"))
)]
pub struct ApiDoc;

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-console-role"),
            HeaderName::from_static("x-console-branch"),
        ]);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => layer.allow_origin(list.clone()),
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .route("/revalidations", get(handlers::revalidations))
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/export", get(handlers::export::export_orders))
        .route("/orders/:id", get(handlers::orders::order_detail))
        .route(
            "/orders/:id/payment",
            get(handlers::orders::payment_page).post(handlers::orders::process_payment),
        )
        .route("/orders/:id/convert", post(handlers::orders::convert_quotation))
        .route("/orders/:id/ready", post(handlers::orders::mark_ready))
        .route("/orders/:id/collect", post(handlers::orders::complete_collection))
        .route("/orders/:id/reverse", post(handlers::orders::reverse_order))
        .route("/payments/:id/reverse", post(handlers::orders::reverse_payment))
        .route(
            "/branches",
            get(handlers::catalog::list_branches).post(handlers::catalog::create_branch),
        )
        .route(
            "/branches/:id",
            put(handlers::catalog::update_branch).delete(handlers::catalog::delete_branch),
        )
        .route(
            "/products",
            get(handlers::catalog::list_products).post(handlers::catalog::create_product),
        )
        .route(
            "/products/:id",
            put(handlers::catalog::update_product).delete(handlers::catalog::delete_product),
        )
        .route(
            "/batches",
            get(handlers::catalog::list_batches).post(handlers::catalog::create_batch),
        )
        .route(
            "/batches/:id",
            put(handlers::catalog::update_batch).delete(handlers::catalog::delete_batch),
        )
        .route("/inventory", get(handlers::catalog::inventory))
        .route("/inventory/adjustments", post(handlers::catalog::adjust_stock))
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(handlers::customers::customer_detail).put(handlers::customers::update_customer),
        )
        .route(
            "/referrals",
            get(handlers::customers::list_referrals).post(handlers::customers::create_referral),
        )
        .route("/reports/sales", get(handlers::reports::sales_report))
        .route("/reports/sales/export", get(handlers::export::export_sales_report))
        .route("/reports/inventory", get(handlers::reports::inventory_report))
        .route(
            "/reports/inventory/export",
            get(handlers::export::export_inventory_report),
        )
        .layer(axum::middleware::from_fn(middleware::request_logger_middleware))
        .layer(cors)
        .with_state(state)
}
