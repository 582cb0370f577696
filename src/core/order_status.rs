//! Order status state machine.
//!
//! `order_status` and `payment_status` are independent axes. Payment status may be
//! set freely; order status follows an explicit transition table:
//!
//! ```text
//! WAITING  ──► APPROVED ──► ONRENT ──► OVERDUE
//!    │  │          │          │          │
//!    │  └─► REJECTED          └──────────┴──► RETURNED
//!    └──────────┴──► CANCELLED
//! ```
//!
//! WAITING, APPROVED, ONRENT and OVERDUE hold stock (it was decremented when the
//! reservation was created). Leaving that group for CANCELLED, REJECTED or
//! RETURNED puts every order line's quantity back, in the same transaction as the
//! status write. The write is conditional on the status read at the start, so two
//! concurrent cancellations restock once.

use crate::{
    core::inventory,
    entities::{Order, OrderLine, OrderStatus, PaymentStatus, order, order_line},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    DatabaseConnection, Iterable, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

impl OrderStatus {
    /// Wire and storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Approved => "APPROVED",
            Self::OnRent => "ONRENT",
            Self::Overdue => "OVERDUE",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
        }
    }

    /// Statuses reachable from this one in a single step.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Waiting => &[Self::Approved, Self::Rejected, Self::Cancelled],
            Self::Approved => &[Self::OnRent, Self::Cancelled],
            Self::OnRent => &[Self::Overdue, Self::Returned],
            Self::Overdue => &[Self::Returned],
            Self::Rejected | Self::Cancelled | Self::Returned => &[],
        }
    }

    /// Whether the transition table allows moving to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Whether stock for this order is currently held out of inventory.
    #[must_use]
    pub const fn holds_stock(self) -> bool {
        matches!(
            self,
            Self::Waiting | Self::Approved | Self::OnRent | Self::Overdue
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.holds_stock()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Invalid order_status '{s}'. Accepted values: {}",
                    accepted_values::<Self>()
                ))
            })
    }
}

impl PaymentStatus {
    /// Wire and storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::Paid => "PAID",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Invalid payment_status '{s}'. Accepted values: {}",
                    accepted_values::<Self>()
                ))
            })
    }
}

fn accepted_values<T>() -> String
where
    T: Iterable + fmt::Display,
{
    T::iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A field value that was not applied because it is not a known value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRejection {
    /// `order_status` or `payment_status`
    pub field: &'static str,
    /// The value as received
    pub value: String,
    /// Reason, listing the accepted values
    pub message: String,
}

/// Outcome of a status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// The order after the update
    pub order: order::Model,
    /// Whether order lines were returned to stock
    pub restocked: bool,
    /// Fields that were ignored because their values were unknown
    pub rejected: Vec<FieldRejection>,
}

/// Updates an order's status and/or payment status from raw string values.
///
/// Each field is validated on its own: an unknown value is reported in
/// [`StatusUpdate::rejected`] while the other field is still applied.
///
/// # Errors
/// - [`Error::Validation`] if no field was supplied, or every supplied field was invalid
/// - [`Error::NotFound`] if the order does not exist
/// - [`Error::InvalidTransition`] if the transition table forbids the change
/// - [`Error::StaleOrder`] if the order changed status concurrently
#[instrument(skip(db))]
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i64,
    order_status: Option<&str>,
    payment_status: Option<&str>,
) -> Result<StatusUpdate> {
    if order_status.is_none() && payment_status.is_none() {
        return Err(Error::validation(
            "Provide order_status and/or payment_status",
        ));
    }

    let mut rejected = Vec::new();
    let next_status = parse_field::<OrderStatus>("order_status", order_status, &mut rejected);
    let next_payment = parse_field::<PaymentStatus>("payment_status", payment_status, &mut rejected);

    if next_status.is_none() && next_payment.is_none() {
        let message = rejected
            .iter()
            .map(|rejection| rejection.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::validation(message));
    }

    let mut update = apply_changes(db, order_id, next_status, next_payment).await?;
    update.rejected = rejected;
    Ok(update)
}

/// Moves an order to `next`, restocking when it releases held stock.
pub async fn transition_order(
    db: &DatabaseConnection,
    order_id: i64,
    next: OrderStatus,
) -> Result<StatusUpdate> {
    apply_changes(db, order_id, Some(next), None).await
}

/// Sets an order's payment status.
pub async fn set_payment_status(
    db: &DatabaseConnection,
    order_id: i64,
    payment: PaymentStatus,
) -> Result<StatusUpdate> {
    apply_changes(db, order_id, None, Some(payment)).await
}

fn parse_field<T>(
    field: &'static str,
    raw: Option<&str>,
    rejected: &mut Vec<FieldRejection>,
) -> Option<T>
where
    T: FromStr<Err = Error>,
{
    match raw?.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            rejected.push(FieldRejection {
                field,
                value: raw.unwrap_or_default().to_string(),
                message: match err {
                    Error::Validation { message } => message,
                    other => other.to_string(),
                },
            });
            None
        }
    }
}

async fn apply_changes(
    db: &DatabaseConnection,
    order_id: i64,
    next_status: Option<OrderStatus>,
    next_payment: Option<PaymentStatus>,
) -> Result<StatusUpdate> {
    let txn = db.begin().await?;

    // Take the write lock before reading, so a concurrent update waits for this
    // one and then reads its result
    Order::update_many()
        .col_expr(
            order::Column::UpdatedAt,
            SimpleExpr::from(Expr::col(order::Column::UpdatedAt)),
        )
        .filter(order::Column::Id.eq(order_id))
        .exec(&txn)
        .await?;

    let current = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Order",
            id: order_id,
        })?;
    let from = current.order_status;

    // Re-applying the current value is a no-op, never a second restock
    let status_change = next_status.filter(|next| *next != from);
    let payment_change = next_payment.filter(|payment| *payment != current.payment_status);

    if let Some(next) = status_change {
        if !from.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: from.to_string(),
                to: next.to_string(),
            });
        }
    }

    if status_change.is_none() && payment_change.is_none() {
        return Ok(StatusUpdate {
            order: current,
            restocked: false,
            rejected: Vec::new(),
        });
    }

    let mut update = Order::update_many()
        .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::OrderStatus.eq(from.as_str()));
    if let Some(next) = status_change {
        update = update.col_expr(order::Column::OrderStatus, Expr::value(next.as_str()));
    }
    if let Some(payment) = payment_change {
        update = update.col_expr(order::Column::PaymentStatus, Expr::value(payment.as_str()));
    }

    if update.exec(&txn).await?.rows_affected == 0 {
        return Err(Error::StaleOrder { order_id });
    }

    let restocked = match status_change {
        Some(next) if from.holds_stock() && !next.holds_stock() => {
            restock_order_lines(&txn, order_id).await?;
            true
        }
        _ => false,
    };

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Order",
            id: order_id,
        })?;
    txn.commit().await?;

    info!(
        order_id,
        from = %from,
        to = %order.order_status,
        payment = %order.payment_status,
        restocked,
        "Order status updated"
    );

    Ok(StatusUpdate {
        order,
        restocked,
        rejected: Vec::new(),
    })
}

async fn restock_order_lines<C>(db: &C, order_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let lines = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .all(db)
        .await?;

    for line in lines {
        inventory::restock(db, line.product_id, line.quantity).await?;
    }
    Ok(())
}
