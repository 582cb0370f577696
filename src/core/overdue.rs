//! Overdue sweep - promotes expired rentals from ONRENT to OVERDUE.
//!
//! [`run_overdue_sweep`] is a single pass and can be called directly (tests do).
//! [`OverdueScheduler`] runs that pass on a fixed interval in a background task
//! whose lifetime is owned by the process through [`SchedulerHandle`].
//!
//! Every order is moved by its own conditional update, so one failing record is
//! logged and skipped without blocking the rest. The sweep never restocks: an
//! overdue item is still out with the renter.

use crate::{
    config::SweepConfig,
    entities::{Order, OrderStatus, order},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, QueryOrder, prelude::*, sea_query::Expr};
use serde::Serialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Summary of one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Expired ONRENT orders found
    pub scanned: usize,
    /// Orders moved to OVERDUE
    pub transitioned: usize,
    /// Orders whose update failed
    pub failed: usize,
    /// Reference time used for expiry
    pub ran_at: DateTime<Utc>,
}

/// Runs one sweep against the current time.
pub async fn run_overdue_sweep(db: &DatabaseConnection) -> Result<SweepReport> {
    run_overdue_sweep_at(db, Utc::now()).await
}

/// Runs one sweep, treating orders whose `end_date` is before `now` as expired.
///
/// # Errors
/// Only the initial query can fail the sweep; per-order failures are counted in
/// [`SweepReport::failed`].
#[instrument(skip(db))]
pub async fn run_overdue_sweep_at(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<SweepReport> {
    let expired = Order::find()
        .filter(order::Column::OrderStatus.eq(OrderStatus::OnRent.as_str()))
        .filter(order::Column::EndDate.lt(now))
        .order_by_asc(order::Column::EndDate)
        .all(db)
        .await?;

    let mut report = SweepReport {
        scanned: expired.len(),
        transitioned: 0,
        failed: 0,
        ran_at: now,
    };

    for expired_order in &expired {
        match mark_overdue(db, expired_order.id, now).await {
            Ok(true) => report.transitioned += 1,
            Ok(false) => debug!(
                "Order {} left ONRENT before it could be marked overdue",
                expired_order.id
            ),
            Err(e) => {
                report.failed += 1;
                error!("Failed to mark order {} overdue: {}", expired_order.id, e);
            }
        }
    }

    info!(
        scanned = report.scanned,
        transitioned = report.transitioned,
        failed = report.failed,
        "Overdue sweep finished"
    );
    Ok(report)
}

/// Moves one order to OVERDUE if it is still ONRENT. Returns whether it moved.
async fn mark_overdue(db: &DatabaseConnection, order_id: i64, now: DateTime<Utc>) -> Result<bool> {
    let result = Order::update_many()
        .col_expr(
            order::Column::OrderStatus,
            Expr::value(OrderStatus::Overdue.as_str()),
        )
        .col_expr(order::Column::UpdatedAt, Expr::value(now))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::OrderStatus.eq(OrderStatus::OnRent.as_str()))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Background runner for the overdue sweep.
pub struct OverdueScheduler {
    db: DatabaseConnection,
    config: SweepConfig,
}

impl OverdueScheduler {
    /// Creates a scheduler; nothing runs until [`Self::start`].
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: SweepConfig) -> Self {
        Self { db, config }
    }

    /// Spawns the sweep loop on the tokio runtime.
    #[must_use]
    pub fn start(self) -> SchedulerHandle {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task = tokio::spawn(async move { self.run(token).await });
        SchedulerHandle { shutdown, task }
    }

    async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.config.interval().as_secs(),
            run_on_startup = self.config.run_on_startup,
            "Overdue scheduler started"
        );

        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !self.config.run_on_startup {
            // The first tick completes immediately
            ticker.tick().await;
        }

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = run_overdue_sweep(&self.db).await {
                        error!("Overdue sweep failed: {}", e);
                    }
                }
            }
        }

        info!("Overdue scheduler stopped");
    }
}

/// Handle to a running [`OverdueScheduler`].
pub struct SchedulerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Whether the background task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the loop to stop and waits for it to finish. A sweep in progress
    /// completes first.
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            error!("Overdue scheduler task ended abnormally: {}", e);
        }
    }
}
