use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire DTOs for the backoffice Order/Payment API. The backoffice owns all
/// of this state; the console consumes it read-mostly and never stores it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Quotation,
    ImmediateSale,
    FutureCollection,
    Layaway,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Quotation => "QUOTATION",
            OrderType::ImmediateSale => "IMMEDIATE_SALE",
            OrderType::FutureCollection => "FUTURE_COLLECTION",
            OrderType::Layaway => "LAYAWAY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    PartiallyPaid,
    FullyPaid,
    ReadyForCollection,
    Completed,
    Cancelled,
    Reversed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::PartiallyPaid => "PARTIALLY_PAID",
            OrderStatus::FullyPaid => "FULLY_PAID",
            OrderStatus::ReadyForCollection => "READY_FOR_COLLECTION",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Reversed => "REVERSED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Reversed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    MobileMoney,
    Mixed,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::MobileMoney => "MOBILE_MONEY",
            PaymentMethod::Mixed => "MIXED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferralStatus {
    Pending,
    Converted,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub paid_amount: BigDecimal,
    pub balance_amount: BigDecimal,
    pub customer: CustomerRef,
    pub branch: BranchRef,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_date: DateTime<Utc>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductRef,
    pub quantity: i64,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub amount: BigDecimal,
    pub payment_method: PaymentMethod,
    pub payment_date: DateTime<Utc>,
    pub reference: Option<String>,
    #[serde(default)]
    pub reversed: bool,
    pub reversal_reason: Option<String>,
    pub received_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayawaySummary {
    pub order_id: Uuid,
    pub total_amount: BigDecimal,
    pub paid_amount: BigDecimal,
    pub balance_amount: BigDecimal,
    pub installment_count: u32,
    pub installments_paid: u32,
    pub next_due_date: Option<DateTime<Utc>>,
    pub plan_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayawayInstallment {
    pub installment_number: u32,
    pub expected_amount: BigDecimal,
    pub due_date: DateTime<Utc>,
    pub paid: bool,
    pub paid_amount: Option<BigDecimal>,
    pub paid_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: BigDecimal,
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    pub product: ProductRef,
    pub branch: BranchRef,
    pub quantity: i64,
    pub unit_cost: BigDecimal,
    pub received_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product: ProductRef,
    pub branch: BranchRef,
    pub quantity_on_hand: i64,
    pub reserved: i64,
    pub reorder_level: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub id_number: Option<String>,
    pub branch: BranchRef,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: Uuid,
    pub referrer: CustomerRef,
    pub referred_name: String,
    pub referred_phone: String,
    pub status: ReferralStatus,
    pub reward_amount: Option<BigDecimal>,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportRow {
    pub branch: BranchRef,
    pub order_count: u64,
    pub gross_sales: BigDecimal,
    pub payments_received: BigDecimal,
    pub outstanding_balance: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReportRow {
    pub branch: BranchRef,
    pub product: ProductRef,
    pub quantity_on_hand: i64,
    pub reserved: i64,
    pub reorder_level: i64,
    pub stock_value: BigDecimal,
}

/// List envelope every backoffice collection endpoint wraps its rows in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}
