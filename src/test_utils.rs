//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{cart, inventory, order_status, reservation},
    entities::{self, OrderStatus},
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool is pinned to a single connection: every `:memory:` connection is a
/// separate database, so concurrent tests must share the one that holds the schema.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database with a pool of `max_connections`.
///
/// Unlike [`setup_test_db`], transactions on different connections really run
/// side by side. The database lives as long as the returned [`TempDir`].
#[allow(clippy::unwrap_used)]
pub async fn setup_file_test_db(max_connections: u32) -> Result<(DatabaseConnection, TempDir)> {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("rentaldesk.sqlite").display()
    );
    let mut options = ConnectOptions::new(url);
    options.max_connections(max_connections).sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, dir))
}

/// Fixed "current time" used by reservation tests: 2024-01-01 09:00 UTC.
#[allow(clippy::unwrap_used)]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

/// Creates a rentable test product.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Product name
/// * `price_cents` - Daily price per unit
/// * `quantity` - Units in stock
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price_cents: i64,
    quantity: i32,
) -> Result<entities::product::Model> {
    inventory::create_product(db, name.to_string(), price_cents, quantity, true).await
}

/// Creates a fresh cart for `user_id` holding the given `(product_id, quantity)` lines.
pub async fn create_cart_with_items(
    db: &DatabaseConnection,
    user_id: i64,
    items: &[(i64, i32)],
) -> Result<entities::cart::Model> {
    let cart = cart::create_cart(db, user_id).await?;
    for &(product_id, quantity) in items {
        cart::add_item(db, cart.id, product_id, quantity).await?;
    }
    Ok(cart)
}

/// Builds a valid reservation request for `cart_id`.
///
/// # Defaults
/// * identification fields filled in
/// * `start_date`: 2024-01-02, `end_date`: 2024-01-05 (three rental days)
pub fn reservation_request(user_id: i64, cart_id: i64) -> reservation::ReservationRequest {
    reservation::ReservationRequest {
        user_id,
        cart_id,
        identification: "ID-998877".to_string(),
        phone: "+1 555 0100".to_string(),
        notes: None,
        identification_picture: "uploads/id/998877.jpg".to_string(),
        start_date: "2024-01-02".to_string(),
        end_date: "2024-01-05".to_string(),
    }
}

/// Sets up a database with one product and a cart reserving `reserved` of it.
/// Returns (db, product, reservation).
pub async fn setup_with_reservation(
    stock: i32,
    reserved: i32,
) -> Result<(
    DatabaseConnection,
    entities::product::Model,
    reservation::Reservation,
)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "Camera", 2_500, stock).await?;
    let cart = create_cart_with_items(&db, 1, &[(product.id, reserved)]).await?;
    let created =
        reservation::create_reservation_at(&db, &reservation_request(1, cart.id), test_now())
            .await?;
    Ok((db, product, created))
}

/// Walks an order through the lifecycle until it is on rent.
pub async fn move_to_on_rent(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    order_status::transition_order(db, order_id, OrderStatus::Approved).await?;
    order_status::transition_order(db, order_id, OrderStatus::OnRent).await?;
    Ok(())
}

/// Reads the current stock of a product.
pub async fn stock_of(db: &DatabaseConnection, product_id: i64) -> Result<i32> {
    inventory::available_quantity(db, product_id).await
}
