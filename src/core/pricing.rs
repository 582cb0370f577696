//! Pricing engine - rental-day counting and cost computation.
//!
//! Money is carried as integer minor units (cents) so totals are exact.
//! A rental is billed per started day: `rental_days = ceil((end - start) / 1 day)`,
//! never less than one, and every line costs `unit_price * rental_days * quantity`.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// One cart line as the pricing engine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
    /// Product being rented
    pub product_id: i64,
    /// Units requested
    pub quantity: i32,
    /// Per-day unit price at the moment of pricing
    pub unit_price_cents: i64,
}

/// A priced line, ready to become an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    /// Product being rented
    pub product_id: i64,
    /// Units requested
    pub quantity: i32,
    /// Per-day unit price used for the line
    pub unit_price_cents: i64,
    /// `unit_price_cents * rental_days * quantity`
    pub line_cost_cents: i64,
}

/// Full price breakdown of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Billed days
    pub rental_days: i32,
    /// Priced lines, in input order
    pub lines: Vec<PricedLine>,
    /// Sum of all line costs
    pub total_cost_cents: i64,
}

/// Parses a reservation date.
///
/// Accepts a plain calendar date (`2024-01-31`, read as midnight UTC) or a full
/// RFC 3339 timestamp.
///
/// # Errors
/// Returns [`Error::Validation`] naming `field` when the input matches neither form.
pub fn parse_date(input: &str, field: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            Error::validation(format!(
                "{field} must be a date (YYYY-MM-DD) or RFC 3339 timestamp, got '{input}'"
            ))
        })
}

/// Number of billed days between `start` and `end`.
///
/// # Errors
/// Returns [`Error::Validation`] unless `end` is strictly after `start`.
pub fn rental_days(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i32> {
    if end <= start {
        return Err(Error::validation(format!(
            "end_date ({end}) must be after start_date ({start})"
        )));
    }

    let millis = (end - start).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) > 0);

    i32::try_from(days.max(1))
        .map_err(|_| Error::validation(format!("Rental period of {days} days is too long")))
}

/// Cost of one line over the whole rental period.
///
/// # Errors
/// Returns [`Error::Validation`] if the product overflows the money range.
pub fn line_cost(unit_price_cents: i64, rental_days: i32, quantity: i32) -> Result<i64> {
    unit_price_cents
        .checked_mul(i64::from(rental_days))
        .and_then(|cost| cost.checked_mul(i64::from(quantity)))
        .ok_or_else(|| Error::validation("Line cost exceeds the supported amount"))
}

/// Prices every line for the period `[start, end)` and sums the total.
///
/// # Errors
/// Returns [`Error::Validation`] for an invalid period or an overflowing amount.
pub fn quote<I>(start: DateTime<Utc>, end: DateTime<Utc>, lines: I) -> Result<Quote>
where
    I: IntoIterator<Item = LineInput>,
{
    let rental_days = rental_days(start, end)?;

    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(PricedLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_cost_cents: line_cost(line.unit_price_cents, rental_days, line.quantity)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let total_cost_cents = lines
        .iter()
        .try_fold(0_i64, |total, line| total.checked_add(line.line_cost_cents))
        .ok_or_else(|| Error::validation("Total cost exceeds the supported amount"))?;

    Ok(Quote {
        rental_days,
        lines,
        total_cost_cents,
    })
}
