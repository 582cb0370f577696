//! Core business logic - framework-agnostic reservation and order lifecycle operations.
//!
//! Every operation takes the database handle explicitly. Operations that must be
//! atomic open their own transaction; the building blocks they use are generic
//! over `ConnectionTrait` so they run inside the caller's transaction.

/// Cart reading and building
pub mod cart;
/// Atomic product stock operations
pub mod inventory;
/// Order and rent queries
pub mod order;
/// Order status state machine with restock side effects
pub mod order_status;
/// Periodic promotion of expired rentals to OVERDUE
pub mod overdue;
/// Rental-day and cost computation
pub mod pricing;
/// Cart to Rent + Order conversion
pub mod reservation;
