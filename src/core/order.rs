//! Order queries and rent documentation updates.

use crate::{
    entities::{Order, OrderLine, Rent, order, order_line, rent},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;

/// An order with its rent and lines, the shape returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    /// The order record
    pub order: order::Model,
    /// Renter details and documentation
    pub rent: rent::Model,
    /// Order lines with frozen prices
    pub lines: Vec<order_line::Model>,
}

/// Loads an order together with its rent and lines.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order (or its rent) does not exist.
pub async fn get_order_details<C>(db: &C, order_id: i64) -> Result<OrderDetails>
where
    C: ConnectionTrait,
{
    let (order, rent) = Order::find_by_id(order_id)
        .find_also_related(Rent)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Order",
            id: order_id,
        })?;
    let rent = rent.ok_or(Error::NotFound {
        entity: "Rent",
        id: order.rent_id,
    })?;

    let lines = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .all(db)
        .await?;

    Ok(OrderDetails { order, rent, lines })
}

/// Lists a user's orders, newest first.
pub async fn list_orders_for_user<C>(db: &C, user_id: i64) -> Result<Vec<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .inner_join(Rent)
        .filter(rent::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the pickup and/or return documentation pictures of a rent.
///
/// These are the only rent fields that change after creation. `None` leaves a
/// field as it is.
///
/// # Errors
/// - [`Error::Validation`] if neither picture is given, or a given path is blank
/// - [`Error::NotFound`] if the rent does not exist
pub async fn update_rent_documentation<C>(
    db: &C,
    rent_id: i64,
    pickup_picture: Option<String>,
    return_picture: Option<String>,
) -> Result<rent::Model>
where
    C: ConnectionTrait,
{
    if pickup_picture.is_none() && return_picture.is_none() {
        return Err(Error::validation(
            "Provide pickup_picture and/or return_picture",
        ));
    }
    if [&pickup_picture, &return_picture]
        .into_iter()
        .flatten()
        .any(|path| path.trim().is_empty())
    {
        return Err(Error::validation("Documentation picture path cannot be empty"));
    }

    let mut rent: rent::ActiveModel = Rent::find_by_id(rent_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Rent",
            id: rent_id,
        })?
        .into();

    if let Some(path) = pickup_picture {
        rent.pickup_picture = Set(Some(path.trim().to_string()));
    }
    if let Some(path) = return_picture {
        rent.return_picture = Set(Some(path.trim().to_string()));
    }

    rent.update(db).await.map_err(Into::into)
}
