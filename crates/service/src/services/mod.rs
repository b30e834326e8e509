//! Per-entity bindings: unique keys, create/update inputs, relation loading
//! and the workflows built on them.

pub mod user_service;
pub mod organizer_service;
pub mod event_service;
pub mod event_ticket_service;
pub mod voucher_service;
pub mod transaction_service;
pub mod ticket_service;
