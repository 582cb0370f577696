//! Product entity - A rentable piece of equipment and its available stock.
//!
//! `quantity` is the number of units available to reserve right now. Units held by
//! live orders are already subtracted from it, so it must never go negative.
//! Stock changes go through `core::inventory` only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Camera Tripod")
    pub name: String,
    /// Rental price per unit per day, in minor currency units
    pub price_cents: i64,
    /// Units currently available to reserve
    pub quantity: i32,
    /// Whether the product may be reserved at all
    pub is_rentable: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A product appears in many cart items
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    /// A product appears in many order lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
