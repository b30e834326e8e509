//! SeaORM entities for the ticketing schema: users, organizers, events,
//! ticket tiers, vouchers, transactions and issued tickets.
//!
//! Field-level validation lives next to each entity; persistence operations
//! live in the `service` crate.

pub mod errors;
pub mod db;
pub mod enums;
pub mod user;
pub mod organizer;
pub mod event;
pub mod event_ticket;
pub mod voucher;
pub mod transaction;
pub mod ticket;

pub use enums::{EventCategory, EventLocation, TransactionStatus, UserRole};

#[cfg(test)]
mod tests;
