//! Overdue display flags.
//! Derived at render time from real due dates and never persisted. Layaway
//! orders go overdue when a scheduled due date has passed with balance still
//! owing; orders waiting for collection go overdue after a configurable
//! grace window since no due date exists for that phase.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};

use crate::backoffice::models::{LayawayInstallment, Order, OrderStatus, OrderType};

pub fn installment_overdue(installment: &LayawayInstallment, now: DateTime<Utc>) -> bool {
    !installment.paid && installment.due_date < now
}

/// List-view flag, computed from the order snapshot alone.
pub fn order_overdue(order: &Order, now: DateTime<Utc>, collection_grace_days: i64) -> bool {
    match order.status {
        OrderStatus::Confirmed | OrderStatus::PartiallyPaid
            if order.order_type == OrderType::Layaway =>
        {
            order.balance_amount > BigDecimal::from(0)
                && order.next_due_date.map(|due| due < now).unwrap_or(false)
        }
        OrderStatus::ReadyForCollection => {
            now - order.created_date > Duration::days(collection_grace_days)
        }
        _ => false,
    }
}

/// Detail-view flag. With the full installment schedule in hand, any unpaid
/// installment past due marks an active layaway overdue; everything else
/// falls back to the snapshot rule.
pub fn order_overdue_detailed(
    order: &Order,
    schedule: &[LayawayInstallment],
    now: DateTime<Utc>,
    collection_grace_days: i64,
) -> bool {
    if order.order_type == OrderType::Layaway
        && matches!(order.status, OrderStatus::Confirmed | OrderStatus::PartiallyPaid)
    {
        return schedule
            .iter()
            .any(|installment| installment_overdue(installment, now));
    }

    order_overdue(order, now, collection_grace_days)
}
