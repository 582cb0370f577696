//! Order line entity - The audit record of one reserved product.
//!
//! `unit_price_cents` is frozen when the reservation commits and never follows
//! later product price changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    /// Unique identifier
    pub id: i64,
    /// Owning order
    pub order_id: i64,
    /// Referenced product
    pub product_id: i64,
    /// Units held by this line
    pub quantity: i32,
    /// Per-day unit price at reservation time
    pub unit_price_cents: i64,
    /// `unit_price_cents * rental_days * quantity`
    pub line_cost_cents: i64,
}

/// Relations to the owning order and the product
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
