//! Order lifecycle rules.
//! One explicit transition table decides which actions a rendered order
//! offers and which statuses each action can lead to. The backoffice owns
//! transition execution and validation; the console only selects actions
//! for display and submits them.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::backoffice::models::{Order, OrderStatus, OrderType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAction {
    ConvertToOrder,
    ProcessPayment,
    MarkReadyForCollection,
    CompleteCollection,
    ReverseOrder,
}

#[derive(Debug, Clone, Copy)]
enum BalanceRule {
    Any,
    Outstanding,
    Settled,
}

#[derive(Debug, Clone, Copy)]
enum TypeRule {
    Any,
    Only(OrderType),
    Except(OrderType),
}

struct TransitionRule {
    action: OrderAction,
    from: &'static [OrderStatus],
    to: &'static [OrderStatus],
    balance: BalanceRule,
    types: TypeRule,
}

const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        action: OrderAction::ConvertToOrder,
        from: &[OrderStatus::Pending],
        to: &[OrderStatus::Confirmed],
        balance: BalanceRule::Any,
        types: TypeRule::Only(OrderType::Quotation),
    },
    TransitionRule {
        action: OrderAction::ProcessPayment,
        from: &[OrderStatus::Confirmed, OrderStatus::PartiallyPaid],
        to: &[OrderStatus::PartiallyPaid, OrderStatus::FullyPaid],
        balance: BalanceRule::Outstanding,
        types: TypeRule::Only(OrderType::Layaway),
    },
    TransitionRule {
        action: OrderAction::MarkReadyForCollection,
        from: &[OrderStatus::FullyPaid, OrderStatus::Confirmed],
        to: &[OrderStatus::ReadyForCollection],
        balance: BalanceRule::Settled,
        types: TypeRule::Except(OrderType::ImmediateSale),
    },
    TransitionRule {
        action: OrderAction::CompleteCollection,
        from: &[OrderStatus::ReadyForCollection],
        to: &[OrderStatus::Completed],
        balance: BalanceRule::Any,
        types: TypeRule::Any,
    },
    TransitionRule {
        action: OrderAction::ReverseOrder,
        from: &[OrderStatus::Completed],
        to: &[OrderStatus::Reversed],
        balance: BalanceRule::Any,
        types: TypeRule::Any,
    },
];

impl TransitionRule {
    fn applies_to(&self, order: &Order) -> bool {
        if !self.from.contains(&order.status) {
            return false;
        }

        let type_ok = match self.types {
            TypeRule::Any => true,
            TypeRule::Only(order_type) => order.order_type == order_type,
            TypeRule::Except(order_type) => order.order_type != order_type,
        };
        if !type_ok {
            return false;
        }

        match self.balance {
            BalanceRule::Any => true,
            BalanceRule::Outstanding => order.balance_amount > BigDecimal::from(0),
            BalanceRule::Settled => order.balance_amount == BigDecimal::from(0),
        }
    }
}

/// Actions the given order snapshot currently offers, in table order.
pub fn available_actions(order: &Order) -> Vec<OrderAction> {
    TRANSITIONS
        .iter()
        .filter(|rule| rule.applies_to(order))
        .map(|rule| rule.action)
        .collect()
}

impl OrderAction {
    /// Statuses this action can leave the order in.
    pub fn outcomes(&self) -> &'static [OrderStatus] {
        TRANSITIONS
            .iter()
            .find(|rule| rule.action == *self)
            .map(|rule| rule.to)
            .unwrap_or(&[])
    }
}
