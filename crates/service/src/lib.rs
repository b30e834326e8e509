//! Typed data access for the ticketing schema.
//!
//! `crud` holds the generic operations; `services` binds each entity to them
//! and adds the checkout and voucher workflows. Everything runs on a SeaORM
//! connection or transaction, so callers compose operations freely.

pub mod errors;
pub mod pagination;
pub mod query;
pub mod crud;
pub mod aggregate;
pub mod relations;
pub mod transaction;
pub mod credentials;
pub mod services;
#[cfg(test)]
pub mod test_support;

pub use crud::{BatchPayload, Projection};
pub use errors::{ConstraintKind, Result, ServiceError};
pub use pagination::{Paged, Pagination};
pub use query::{CrudEntity, FindManyArgs, NumericUpdate};
pub use transaction::{batch, batch_op, run_in_transaction, TransactionOptions};
