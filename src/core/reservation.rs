//! Reservation logic - converts a cart into a `Rent` + `Order` in one transaction.
//!
//! The whole conversion runs on a single database transaction:
//!
//! 1. load the cart snapshot (ownership, items, current product state)
//! 2. validate input and stock availability (nothing written yet)
//! 3. price the lines and insert the rent, the order and its lines
//! 4. decrement stock through the conditional update in `core::inventory`
//! 5. empty the cart and commit
//!
//! Any error before the commit drops the transaction, which rolls every write back.
//! A conditional decrement that loses a race surfaces as [`Error::Conflict`]; the
//! attempt is then retried from scratch, so a genuine shortage is reported by the
//! pre-check of the next attempt as [`Error::InsufficientStock`].
//!
//! On `SQLite` the transaction takes the write lock with its first statement. A
//! competing reservation then waits on the connection's busy timeout instead of
//! failing when it upgrades a read lock. If the lock still cannot be had, the
//! attempt is retried like a lost race.

use crate::{
    core::{
        cart::{self, CartLine},
        inventory,
        pricing::{self, LineInput},
    },
    entities::{Cart, OrderStatus, PaymentStatus, cart as cart_entity, order, order_line, rent},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseConnection, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// How many times a reservation is attempted when stock changes underneath it
pub const MAX_RESERVATION_ATTEMPTS: u32 = 3;

/// Base pause before retrying an attempt that could not get the write lock
const LOCK_RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Input of a reservation, as handed over by the (external) request layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReservationRequest {
    /// Authenticated user making the reservation
    pub user_id: i64,
    /// Cart to convert
    pub cart_id: i64,
    /// Identification document number
    pub identification: String,
    /// Contact phone number
    pub phone: String,
    /// Optional free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Stored path of the uploaded identification picture
    pub identification_picture: String,
    /// First day of the rental (`YYYY-MM-DD` or RFC 3339)
    pub start_date: String,
    /// End of the rental (`YYYY-MM-DD` or RFC 3339)
    pub end_date: String,
}

/// Everything created by a successful reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    /// Renter details and documentation
    pub rent: rent::Model,
    /// The order record
    pub order: order::Model,
    /// Order lines with frozen prices
    pub lines: Vec<order_line::Model>,
}

/// Creates a reservation using the current time as "today".
pub async fn create_reservation(
    db: &DatabaseConnection,
    request: &ReservationRequest,
) -> Result<Reservation> {
    create_reservation_at(db, request, Utc::now()).await
}

/// Creates a reservation as of `now`.
///
/// Preconditions are checked in this order, each with its own error:
/// 1. the cart exists ([`Error::NotFound`]) and belongs to the user ([`Error::Forbidden`])
/// 2. the cart has at least one item ([`Error::EmptyCart`])
/// 3. an identification picture is present ([`Error::Validation`])
/// 4. the dates parse, start is not before today and end is after start ([`Error::Validation`])
/// 5. every product is rentable and has enough stock ([`Error::InsufficientStock`];
///    a product that is not rentable reports 0 available)
///
/// # Errors
/// Besides the precondition errors above, returns [`Error::Conflict`] if stock kept
/// changing concurrently for [`MAX_RESERVATION_ATTEMPTS`] attempts, and
/// [`Error::Database`] for persistence failures, including a database that stayed
/// locked for every attempt. Nothing is persisted on error.
#[instrument(skip(db, request), fields(user_id = request.user_id, cart_id = request.cart_id))]
pub async fn create_reservation_at(
    db: &DatabaseConnection,
    request: &ReservationRequest,
    now: DateTime<Utc>,
) -> Result<Reservation> {
    let mut attempt = 1;
    loop {
        match try_reserve(db, request, now).await {
            Err(Error::Conflict {
                product_id,
                available,
            }) if attempt < MAX_RESERVATION_ATTEMPTS => {
                warn!(
                    attempt,
                    product_id, available, "Stock changed during reservation, retrying"
                );
                attempt += 1;
            }
            Err(Error::Database(e))
                if attempt < MAX_RESERVATION_ATTEMPTS && is_lock_contention(&e) =>
            {
                warn!(attempt, "Database busy during reservation, retrying: {}", e);
                tokio::time::sleep(LOCK_RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

async fn try_reserve(
    db: &DatabaseConnection,
    request: &ReservationRequest,
    now: DateTime<Utc>,
) -> Result<Reservation> {
    let txn = db.begin().await?;
    claim_cart(&txn, request.cart_id).await?;

    let snapshot = cart::load_cart_snapshot(&txn, request.user_id, request.cart_id).await?;
    if snapshot.lines.is_empty() {
        return Err(Error::EmptyCart {
            cart_id: snapshot.cart.id,
        });
    }

    if request.identification_picture.trim().is_empty() {
        return Err(Error::validation("identification_picture is required"));
    }

    let (start, end) = validate_period(&request.start_date, &request.end_date, now)?;
    check_availability(&snapshot.lines)?;

    let quote = pricing::quote(
        start,
        end,
        snapshot.lines.iter().map(|line| LineInput {
            product_id: line.product.id,
            quantity: line.item.quantity,
            unit_price_cents: line.product.price_cents,
        }),
    )?;

    let rent = rent::ActiveModel {
        user_id: Set(request.user_id),
        identification: Set(request.identification.trim().to_string()),
        phone: Set(request.phone.trim().to_string()),
        notes: Set(request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(ToString::to_string)),
        identification_picture: Set(request.identification_picture.trim().to_string()),
        pickup_picture: Set(None),
        return_picture: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let order = order::ActiveModel {
        rent_id: Set(rent.id),
        invoice_number: Set(generate_invoice_number(now)),
        start_date: Set(start),
        end_date: Set(end),
        rental_days: Set(quote.rental_days),
        total_cost_cents: Set(quote.total_cost_cents),
        order_status: Set(OrderStatus::Waiting),
        payment_status: Set(PaymentStatus::Unpaid),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut lines = Vec::with_capacity(quote.lines.len());
    for priced in &quote.lines {
        inventory::decrement_stock(&txn, priced.product_id, priced.quantity).await?;

        let line = order_line::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(priced.product_id),
            quantity: Set(priced.quantity),
            unit_price_cents: Set(priced.unit_price_cents),
            line_cost_cents: Set(priced.line_cost_cents),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        lines.push(line);
    }

    cart::clear_cart(&txn, snapshot.cart.id).await?;
    txn.commit().await?;

    info!(
        order_id = order.id,
        invoice = %order.invoice_number,
        total_cost_cents = order.total_cost_cents,
        "Reservation created"
    );

    Ok(Reservation { rent, order, lines })
}

/// Touches the cart row so the transaction holds the write lock before it reads.
///
/// A no-op when the cart does not exist; the snapshot reports that right after.
async fn claim_cart<C>(db: &C, cart_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Cart::update_many()
        .col_expr(
            cart_entity::Column::UserId,
            SimpleExpr::from(Expr::col(cart_entity::Column::UserId)),
        )
        .filter(cart_entity::Column::Id.eq(cart_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Whether a database error means another connection held the lock.
fn is_lock_contention(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("database is locked") || message.contains("database table is locked")
}

/// Parses and checks the rental period against `now` (day granularity for the start).
fn validate_period(
    start_date: &str,
    end_date: &str,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = pricing::parse_date(start_date, "start_date")?;
    let end = pricing::parse_date(end_date, "end_date")?;

    if start.date_naive() < now.date_naive() {
        return Err(Error::validation(format!(
            "start_date {} is in the past",
            start.date_naive()
        )));
    }

    if end <= start {
        return Err(Error::validation("end_date must be after start_date"));
    }

    Ok((start, end))
}

/// Checks every line against the product state captured in the snapshot.
///
/// Quantities are summed per product, so two lines for the same product cannot
/// pass individually and oversell together.
fn check_availability(lines: &[CartLine]) -> Result<()> {
    let mut requested: BTreeMap<i64, i32> = BTreeMap::new();

    for line in lines {
        if line.item.quantity < 1 {
            return Err(Error::validation(format!(
                "Cart item {} has invalid quantity {}",
                line.item.id, line.item.quantity
            )));
        }

        let total = requested.entry(line.product.id).or_insert(0);
        *total = total.saturating_add(line.item.quantity);

        // Units of a product that is not rentable cannot be reserved at all
        if !line.product.is_rentable {
            return Err(Error::InsufficientStock {
                product_id: line.product.id,
                requested: *total,
                available: 0,
            });
        }
        if *total > line.product.quantity {
            return Err(Error::InsufficientStock {
                product_id: line.product.id,
                requested: *total,
                available: line.product.quantity,
            });
        }
    }

    Ok(())
}

/// Builds an invoice number such as `INV-20240101093000-3F9A0C1B`.
///
/// The timestamp keeps invoices traceable; the random suffix avoids collisions
/// between reservations created in the same second.
#[must_use]
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(8)
        .collect();
    format!("INV-{}-{suffix}", now.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::inventory,
        entities::{CartItem, Order, OrderLine, Rent, cart_item},
        test_utils::*,
    };
    use sea_orm::{ConnectionTrait, PaginatorTrait};
    use std::sync::Arc;

    async fn count_orders(db: &DatabaseConnection) -> Result<u64> {
        Ok(Order::find().count(db).await?)
    }

    async fn count_cart_items(db: &DatabaseConnection, cart_id: i64) -> Result<u64> {
        Ok(CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .count(db)
            .await?)
    }

    #[tokio::test]
    async fn test_create_reservation_happy_path() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let light = create_test_product(&db, "Light", 5_000, 3).await?;
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 2), (light.id, 1)]).await?;

        let reservation =
            create_reservation_at(&db, &reservation_request(1, cart.id), test_now()).await?;

        // 2024-01-02 .. 2024-01-05 is three days: 100*2*3 + 50*1*3 = 750.00
        assert_eq!(reservation.order.rental_days, 3);
        assert_eq!(reservation.order.total_cost_cents, 75_000);
        assert_eq!(reservation.order.order_status, OrderStatus::Waiting);
        assert_eq!(reservation.order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(reservation.order.rent_id, reservation.rent.id);
        assert!(reservation.order.invoice_number.starts_with("INV-20240101090000-"));
        assert_eq!(reservation.rent.user_id, 1);
        assert_eq!(reservation.rent.notes, None);

        assert_eq!(reservation.lines.len(), 2);
        assert_eq!(reservation.lines[0].product_id, camera.id);
        assert_eq!(reservation.lines[0].quantity, 2);
        assert_eq!(reservation.lines[0].unit_price_cents, 10_000);
        assert_eq!(reservation.lines[0].line_cost_cents, 60_000);
        assert_eq!(reservation.lines[1].line_cost_cents, 15_000);

        assert_eq!(stock_of(&db, camera.id).await?, 3);
        assert_eq!(stock_of(&db, light.id).await?, 2);
        assert_eq!(count_cart_items(&db, cart.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_order_line_price_is_frozen() -> Result<()> {
        let (db, product, reservation) = setup_with_reservation(5, 1).await?;

        let mut active: crate::entities::product::ActiveModel = product.into();
        active.price_cents = Set(99_999);
        active.update(&db).await?;

        let line = OrderLine::find_by_id(reservation.lines[0].id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(line.unit_price_cents, 2_500);

        Ok(())
    }

    #[tokio::test]
    async fn test_precondition_order() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let empty = cart::create_cart(&db, 1).await?;

        // Ownership is checked before emptiness
        let result = create_reservation_at(&db, &reservation_request(2, empty.id), test_now()).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        let result =
            create_reservation_at(&db, &reservation_request(1, empty.id + 50), test_now()).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        // Emptiness is checked before the picture
        let mut request = reservation_request(1, empty.id);
        request.identification_picture = String::new();
        let result = create_reservation_at(&db, &request, test_now()).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyCart { .. }));

        // The picture is checked before the dates
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 99)]).await?;
        let mut request = reservation_request(1, cart.id);
        request.identification_picture = "  ".to_string();
        request.start_date = "garbage".to_string();
        let err = create_reservation_at(&db, &request, test_now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("identification_picture"));

        // The dates are checked before stock
        let mut request = reservation_request(1, cart.id);
        request.start_date = "garbage".to_string();
        let err = create_reservation_at(&db, &request, test_now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("start_date"));

        // Finally stock
        let result = create_reservation_at(&db, &reservation_request(1, cart.id), test_now()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock { requested: 99, .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_date_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 1)]).await?;

        let cases = [
            ("2023-12-31", "2024-01-05"), // start before today
            ("2024-01-03", "2024-01-03"), // empty period
            ("2024-01-05", "2024-01-03"), // reversed
            ("2024-01-03", "not-a-date"),
        ];
        for (start, end) in cases {
            let mut request = reservation_request(1, cart.id);
            request.start_date = start.to_string();
            request.end_date = end.to_string();
            let result = create_reservation_at(&db, &request, test_now()).await;
            assert!(
                matches!(result, Err(Error::Validation { .. })),
                "expected validation error for {start}..{end}"
            );
        }

        // Starting today is allowed even though the current time is past midnight
        let mut request = reservation_request(1, cart.id);
        request.start_date = "2024-01-01".to_string();
        request.end_date = "2024-01-03".to_string();
        let reservation = create_reservation_at(&db, &request, test_now()).await?;
        assert_eq!(reservation.order.rental_days, 2);

        assert_eq!(stock_of(&db, camera.id).await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_product_not_rentable() -> Result<()> {
        let db = setup_test_db().await?;
        let broken =
            inventory::create_product(&db, "Broken drone".to_string(), 1_000, 3, false).await?;
        let cart = create_cart_with_items(&db, 1, &[(broken.id, 1)]).await?;

        let err = create_reservation_at(&db, &reservation_request(1, cart.id), test_now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock {
                requested: 1,
                available: 0,
                ..
            }
        ));
        assert_eq!(err.body().available, Some(0));
        assert_eq!(stock_of(&db, broken.id).await?, 3);
        assert_eq!(count_orders(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_other_lines_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let lens = create_test_product(&db, "Lens", 4_000, 2).await?;
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 2), (lens.id, 3)]).await?;

        let err = create_reservation_at(&db, &reservation_request(1, cart.id), test_now())
            .await
            .unwrap_err();
        match &err {
            Error::InsufficientStock {
                product_id,
                requested,
                available,
            } => {
                assert_eq!(*product_id, lens.id);
                assert_eq!(*requested, 3);
                assert_eq!(*available, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(err.body().available, Some(2));

        assert_eq!(stock_of(&db, camera.id).await?, 5);
        assert_eq!(stock_of(&db, lens.id).await?, 2);
        assert_eq!(count_orders(&db).await?, 0);
        assert_eq!(count_cart_items(&db, cart.id).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_failure_after_decrement_rolls_everything_back() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 2)]).await?;

        // Order lines are written after the stock decrement; make that write fail
        db.execute_unprepared(
            "CREATE TRIGGER fail_order_lines BEFORE INSERT ON order_lines \
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
        )
        .await?;

        let err = create_reservation_at(&db, &reservation_request(1, cart.id), test_now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Internal");

        assert_eq!(stock_of(&db, camera.id).await?, 5);
        assert_eq!(count_orders(&db).await?, 0);
        assert_eq!(Rent::find().count(&db).await?, 0);
        assert_eq!(count_cart_items(&db, cart.id).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_failure_on_second_decrement_restores_first() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let lens = create_test_product(&db, "Lens", 4_000, 5).await?;
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 2), (lens.id, 1)]).await?;

        db.execute_unprepared(&format!(
            "CREATE TRIGGER fail_lens_update BEFORE UPDATE ON products WHEN OLD.id = {} \
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
            lens.id
        ))
        .await?;

        let result = create_reservation_at(&db, &reservation_request(1, cart.id), test_now()).await;
        assert!(matches!(result, Err(Error::Database(_))));

        assert_eq!(stock_of(&db, camera.id).await?, 5);
        assert_eq!(stock_of(&db, lens.id).await?, 5);
        assert_eq!(count_orders(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_lost_stock_race_is_a_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 2)]).await?;

        // Drain the stock between the availability check and the decrement,
        // as a competing reservation committing in between would.
        db.execute_unprepared(&format!(
            "CREATE TRIGGER steal_stock AFTER INSERT ON orders \
             BEGIN UPDATE products SET quantity = 0 WHERE id = {}; END;",
            camera.id
        ))
        .await?;

        let err = create_reservation_at(&db, &reservation_request(1, cart.id), test_now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Conflict {
                available: 0,
                ..
            }
        ));
        assert_eq!(err.kind(), "Conflict");

        assert_eq!(stock_of(&db, camera.id).await?, 5);
        assert_eq!(count_orders(&db).await?, 0);
        assert_eq!(count_cart_items(&db, cart.id).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_is_consumed_once() -> Result<()> {
        let db = setup_test_db().await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let cart = create_cart_with_items(&db, 1, &[(camera.id, 1)]).await?;

        create_reservation_at(&db, &reservation_request(1, cart.id), test_now()).await?;
        let second = create_reservation_at(&db, &reservation_request(1, cart.id), test_now()).await;
        assert!(matches!(second.unwrap_err(), Error::EmptyCart { .. }));

        assert_eq!(stock_of(&db, camera.id).await?, 4);
        assert_eq!(count_orders(&db).await?, 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reservations_never_oversell() -> Result<()> {
        const STOCK: i32 = 10;
        const PER_CART: i32 = 3;
        const USERS: i64 = 8;

        // A real file with several pooled connections, so transactions overlap
        let (db, _dir) = setup_file_test_db(8).await?;
        let db = Arc::new(db);
        let camera = create_test_product(&db, "Camera", 10_000, STOCK).await?;

        let mut carts = Vec::new();
        for user_id in 1..=USERS {
            carts.push(create_cart_with_items(&db, user_id, &[(camera.id, PER_CART)]).await?);
        }

        let handles: Vec<_> = carts
            .into_iter()
            .map(|cart| {
                let db = Arc::clone(&db);
                tokio::spawn(async move {
                    create_reservation_at(&db, &reservation_request(cart.user_id, cart.id), test_now())
                        .await
                })
            })
            .collect();

        let mut reserved = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(reservation) => reserved += reservation.lines[0].quantity,
                Err(Error::InsufficientStock { .. } | Error::Conflict { .. }) => refused += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        let stock_left = stock_of(&db, camera.id).await?;
        assert!(reserved <= STOCK);
        assert_eq!(stock_left, STOCK - reserved);
        assert_eq!(count_orders(&db).await?, u64::try_from(reserved / PER_CART).unwrap());
        // Every refusal was for stock that really ran out
        assert!(refused == 0 || stock_left < PER_CART);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reservation_waits_for_a_concurrent_writer() -> Result<()> {
        let (db, _dir) = setup_file_test_db(4).await?;
        let camera = create_test_product(&db, "Camera", 10_000, 5).await?;
        let first = create_cart_with_items(&db, 1, &[(camera.id, 2)]).await?;
        let second = create_cart_with_items(&db, 2, &[(camera.id, 2)]).await?;

        // Both start from the same stock level on separate connections
        let req_a = reservation_request(1, first.id);
        let req_b = reservation_request(2, second.id);
        let (a, b) = tokio::join!(
            create_reservation_at(&db, &req_a, test_now()),
            create_reservation_at(&db, &req_b, test_now()),
        );
        a?;
        b?;

        assert_eq!(stock_of(&db, camera.id).await?, 1);
        assert_eq!(count_orders(&db).await?, 2);

        Ok(())
    }

    #[test]
    fn test_invoice_numbers_are_unique_and_traceable() {
        let now = test_now();
        let first = generate_invoice_number(now);
        let second = generate_invoice_number(now);

        assert_ne!(first, second);
        assert!(first.starts_with("INV-20240101090000-"));
        assert_eq!(first.len(), "INV-20240101090000-".len() + 8);
    }
}
