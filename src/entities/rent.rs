//! Rent entity - The renter-facing record created once per reservation.
//!
//! Holds the identification data captured at checkout. A rent owns exactly one
//! order; deleting a rent cascades to its order and order lines. Only the
//! documentation pictures are updated after creation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rent database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rents")]
pub struct Model {
    /// Unique identifier for the rent
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who made the reservation
    pub user_id: i64,
    /// Identification document number supplied by the renter
    pub identification: String,
    /// Contact phone number
    pub phone: String,
    /// Free-form notes from the renter
    pub notes: Option<String>,
    /// Stored path of the identification picture
    pub identification_picture: String,
    /// Stored path of the picture taken when equipment is handed out
    pub pickup_picture: Option<String>,
    /// Stored path of the picture taken when equipment comes back
    pub return_picture: Option<String>,
    /// When the rent was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Rent and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rent has exactly one order
    #[sea_orm(has_one = "super::order::Entity")]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
