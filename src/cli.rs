use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::backoffice::{BackofficeClient, OrderFilter};
use crate::config::{AllowedOrigins, Config};
use crate::domain::overdue::order_overdue;
use crate::handlers::export::{write_csv, OrderCsvRow, EXPORT_LIMIT};

#[derive(Parser)]
#[command(name = "merchant-console")]
#[command(about = "Merchant Console - admin gateway for the backoffice Order/Payment API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print the resolved configuration with the service token masked
    Config,

    /// Export orders to a CSV file using the service token
    Export(ExportArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// Destination file path
    #[arg(value_name = "FILE")]
    pub output: PathBuf,

    /// Filter by order status
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by order type
    #[arg(long = "order-type")]
    pub order_type: Option<String>,

    /// Restrict to one branch
    #[arg(long = "branch")]
    pub branch_id: Option<Uuid>,

    /// Free-text search over order number and customer
    #[arg(long)]
    pub search: Option<String>,

    /// Keep only overdue orders
    #[arg(long)]
    pub overdue: bool,
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    let origins = match &config.allowed_origins {
        AllowedOrigins::Any => "*".to_string(),
        AllowedOrigins::List(list) => list
            .iter()
            .filter_map(|origin| origin.to_str().ok())
            .collect::<Vec<_>>()
            .join(", "),
    };

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Backoffice API URL: {}", config.backoffice_api_url);
    println!("  Service Token: {}", mask_token(config.service_token.as_deref()));
    println!("  Collection Grace Days: {}", config.collection_grace_days);
    println!("  Allowed Origins: {}", origins);

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

fn mask_token(token: Option<&str>) -> String {
    match token {
        Some(token) if token.chars().count() > 4 => {
            let prefix: String = token.chars().take(4).collect();
            format!("{prefix}****")
        }
        Some(_) => "****".to_string(),
        None => "(not set)".to_string(),
    }
}

/// Non-interactive counterpart of the `/orders/export` route, for cron jobs
/// and ad-hoc pulls. Authenticates with the service token instead of a user
/// session.
pub async fn handle_export(config: &Config, args: &ExportArgs) -> anyhow::Result<()> {
    let token = config
        .service_token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("CONSOLE_SERVICE_TOKEN must be set for CLI exports"))?;

    let client = BackofficeClient::new(config.backoffice_api_url.clone());
    let filter = OrderFilter {
        status: args.status.clone(),
        order_type: args.order_type.clone(),
        branch_id: args.branch_id,
        search: args.search.clone(),
        limit: Some(EXPORT_LIMIT),
        offset: None,
    };

    tracing::info!("Exporting orders to {}", args.output.display());
    let page = client.list_orders(token, &filter).await?;

    let mut orders = page.items;
    if args.overdue {
        let now = chrono::Utc::now();
        orders.retain(|order| order_overdue(order, now, config.collection_grace_days));
    }

    let rows: Vec<OrderCsvRow> = orders.iter().map(OrderCsvRow::from).collect();
    let bytes = write_csv(&rows)?;
    std::fs::write(&args.output, &bytes)?;

    tracing::info!("Exported {} orders", rows.len());
    println!("✓ Exported {} orders to {}", rows.len(), args.output.display());

    Ok(())
}
