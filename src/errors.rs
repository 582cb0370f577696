//! Unified error type for the reservation engine.
//!
//! Every fallible operation returns [`Result`]. Each variant maps onto a stable,
//! machine-readable kind (see [`Error::kind`]) so a controller layer can turn it
//! into a JSON response with [`Error::body`] without matching on variants itself.

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// All failures surfaced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input, including unknown enum values
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A referenced cart, order, rent or product does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// The caller does not own the record it referenced
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable reason
        message: String,
    },

    /// The cart to reserve holds no items
    #[error("Cart {cart_id} has no items")]
    EmptyCart {
        /// Cart that was empty
        cart_id: i64,
    },

    /// A cart line asks for more units than the product currently has
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        /// Offending product
        product_id: i64,
        /// Quantity the cart asked for
        requested: i32,
        /// Units available when the check ran
        available: i32,
    },

    /// A conditional stock decrement lost a race with another reservation
    #[error("Stock for product {product_id} changed concurrently (available: {available})")]
    Conflict {
        /// Product whose conditional decrement matched no row
        product_id: i64,
        /// Units available after the race was lost
        available: i32,
    },

    /// An order changed status underneath a concurrent status update
    #[error("Order {order_id} was modified concurrently")]
    StaleOrder {
        /// Order whose conditional status write matched no row
        order_id: i64,
    },

    /// The requested order status is not reachable from the current one.
    /// Reported to callers as a validation failure.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// The configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Unexpected persistence failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Serializable error payload for the (external) HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error kind
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
    /// Current available stock, for stock-related failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i32>,
}

impl Error {
    /// Machine-readable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } | Self::InvalidTransition { .. } => "ValidationError",
            Self::NotFound { .. } => "NotFound",
            Self::Forbidden { .. } => "Forbidden",
            Self::EmptyCart { .. } => "EmptyCart",
            Self::InsufficientStock { .. } => "InsufficientStock",
            Self::Conflict { .. } | Self::StaleOrder { .. } => "Conflict",
            Self::Config { .. } | Self::Database(_) => "Internal",
        }
    }

    /// Available stock carried by stock-related errors.
    #[must_use]
    pub const fn available(&self) -> Option<i32> {
        match self {
            Self::InsufficientStock { available, .. } | Self::Conflict { available, .. } => {
                Some(*available)
            }
            _ => None,
        }
    }

    /// Builds the JSON-ready payload for this error.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            available: self.available(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
