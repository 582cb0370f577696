//! Order entity - The billing and lifecycle record of a reservation.
//!
//! An order moves through [`OrderStatus`] (see `core::order_status` for the
//! allowed transitions) while [`PaymentStatus`] is tracked independently.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Created, awaiting approval
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    /// Approved, not yet handed out
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Equipment is out with the renter
    #[sea_orm(string_value = "ONRENT")]
    OnRent,
    /// Equipment is out past its end date
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    /// Refused by an administrator
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    /// Withdrawn before fulfilment
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    /// Equipment came back
    #[sea_orm(string_value = "RETURNED")]
    Returned,
}

/// Payment status of an order
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Not paid yet
    #[sea_orm(string_value = "UNPAID")]
    Unpaid,
    /// Payment received
    #[sea_orm(string_value = "PAID")]
    Paid,
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning rent; unique so a rent has at most one order
    #[sea_orm(unique)]
    pub rent_id: i64,
    /// Human-traceable invoice number
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// First day of the rental
    pub start_date: DateTimeUtc,
    /// End of the rental, strictly after `start_date`
    pub end_date: DateTimeUtc,
    /// Billed days, computed at reservation time
    pub rental_days: i32,
    /// Sum of all line costs, in minor currency units
    pub total_cost_cents: i64,
    /// Lifecycle status
    pub order_status: OrderStatus,
    /// Payment status, independent of the lifecycle
    pub payment_status: PaymentStatus,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one rent
    #[sea_orm(
        belongs_to = "super::rent::Entity",
        from = "Column::RentId",
        to = "super::rent::Column::Id",
        on_delete = "Cascade"
    )]
    Rent,
    /// One order has many lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::rent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rent.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
