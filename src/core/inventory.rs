//! Inventory repository - the only place product stock is mutated.
//!
//! Stock changes are single SQL statements evaluated by the database rather than
//! read-modify-write cycles in Rust:
//! `UPDATE products SET quantity = quantity - n WHERE id = ? AND quantity >= n`.
//! The `quantity >= n` predicate fuses the availability check with the decrement,
//! so two reservations racing for the last units cannot both succeed. All functions
//! are generic over `ConnectionTrait` and are meant to run inside the caller's
//! transaction.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// Retrieves a product by its unique ID.
pub async fn get_product<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price or quantity is negative
/// - The database insert operation fails
pub async fn create_product<C>(
    db: &C,
    name: String,
    price_cents: i64,
    quantity: i32,
    is_rentable: bool,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }

    if price_cents < 0 {
        return Err(Error::validation(format!(
            "Product price cannot be negative (got {price_cents})"
        )));
    }

    if quantity < 0 {
        return Err(Error::validation(format!(
            "Product quantity cannot be negative (got {quantity})"
        )));
    }

    let now = Utc::now();
    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        price_cents: Set(price_cents),
        quantity: Set(quantity),
        is_rentable: Set(is_rentable),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Returns the units of a product currently available to reserve.
///
/// # Errors
/// Returns [`Error::NotFound`] if the product does not exist.
pub async fn available_quantity<C>(db: &C, product_id: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    get_product(db, product_id)
        .await?
        .map(|product| product.quantity)
        .ok_or(Error::NotFound {
            entity: "Product",
            id: product_id,
        })
}

/// Atomically removes `amount` units from a product's stock, but only if at least
/// `amount` units are available.
///
/// # Errors
/// - [`Error::Validation`] if `amount` is not positive
/// - [`Error::Conflict`] if the conditional update matched no row because stock ran
///   short, carrying the quantity that is actually available
/// - [`Error::NotFound`] if the product does not exist
pub async fn decrement_stock<C>(db: &C, product_id: i64, amount: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    if amount < 1 {
        return Err(Error::validation(format!(
            "Stock decrement must be positive (got {amount})"
        )));
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).sub(amount),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Quantity.gte(amount))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let available = available_quantity(db, product_id).await?;
        return Err(Error::Conflict {
            product_id,
            available,
        });
    }

    debug!("Decremented product {} stock by {}", product_id, amount);
    Ok(())
}

/// Atomically returns `amount` units to a product's stock.
///
/// # Errors
/// - [`Error::Validation`] if `amount` is not positive
/// - [`Error::NotFound`] if the product does not exist
pub async fn restock<C>(db: &C, product_id: i64, amount: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    if amount < 1 {
        return Err(Error::validation(format!(
            "Restock amount must be positive (got {amount})"
        )));
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).add(amount),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Product",
            id: product_id,
        });
    }

    debug!("Restocked product {} by {}", product_id, amount);
    Ok(())
}
