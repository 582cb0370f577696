//! Cart business logic - building carts and reading them at reservation time.
//!
//! [`load_cart_snapshot`] is what the reservation path consumes: it loads the cart,
//! enforces ownership and joins every item with the product's *current* price,
//! stock and rentability. Run it on the reservation transaction so the snapshot and
//! the writes that follow see the same data.

use crate::{
    entities::{Cart, CartItem, Product, cart, cart_item, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;

/// A cart item together with its product as it is right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// The stored cart item
    pub item: cart_item::Model,
    /// Its product, as currently stored
    pub product: product::Model,
}

/// A cart and its lines, read at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    /// The cart itself
    pub cart: cart::Model,
    /// Items in insertion order
    pub lines: Vec<CartLine>,
}

/// Creates an empty cart for a user.
pub async fn create_cart<C>(db: &C, user_id: i64) -> Result<cart::Model>
where
    C: ConnectionTrait,
{
    cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Returns the user's oldest cart, creating one if the user has none.
pub async fn get_or_create_cart<C>(db: &C, user_id: i64) -> Result<cart::Model>
where
    C: ConnectionTrait,
{
    let existing = Cart::find()
        .filter(cart::Column::UserId.eq(user_id))
        .order_by_asc(cart::Column::Id)
        .one(db)
        .await?;

    match existing {
        Some(cart) => Ok(cart),
        None => create_cart(db, user_id).await,
    }
}

/// Adds `quantity` units of a product to a cart.
///
/// If the product is already in the cart the quantities are merged, so a cart holds
/// at most one item per product.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is less than 1
/// - The cart or product does not exist
/// - The database operation fails
pub async fn add_item<C>(
    db: &C,
    cart_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<cart_item::Model>
where
    C: ConnectionTrait,
{
    if quantity < 1 {
        return Err(Error::validation(format!(
            "Cart quantity must be at least 1 (got {quantity})"
        )));
    }

    Cart::find_by_id(cart_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Cart",
            id: cart_id,
        })?;
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Product",
            id: product_id,
        })?;

    let existing = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    if let Some(item) = existing {
        let merged = item.quantity.checked_add(quantity).ok_or_else(|| {
            Error::validation(format!("Cart quantity for product {product_id} is too large"))
        })?;
        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(merged);
        return active.update(db).await.map_err(Into::into);
    }

    cart_item::ActiveModel {
        cart_id: Set(cart_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Loads a user's cart with every item joined to its current product.
///
/// Lines keep insertion order. An empty cart is returned as-is; deciding whether
/// that is acceptable is up to the caller.
///
/// # Errors
/// - [`Error::NotFound`] if the cart, or a product it references, does not exist
/// - [`Error::Forbidden`] if the cart belongs to another user
pub async fn load_cart_snapshot<C>(db: &C, user_id: i64, cart_id: i64) -> Result<CartSnapshot>
where
    C: ConnectionTrait,
{
    let cart = Cart::find_by_id(cart_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Cart",
            id: cart_id,
        })?;

    if cart.user_id != user_id {
        return Err(Error::Forbidden {
            message: format!("Cart {cart_id} does not belong to user {user_id}"),
        });
    }

    let rows = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    let lines = rows
        .into_iter()
        .map(|(item, product)| match product {
            Some(product) => Ok(CartLine { item, product }),
            None => Err(Error::NotFound {
                entity: "Product",
                id: item.product_id,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CartSnapshot { cart, lines })
}

/// Deletes every item in a cart; the cart itself stays. Returns the number of
/// items removed.
pub async fn clear_cart<C>(db: &C, cart_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
