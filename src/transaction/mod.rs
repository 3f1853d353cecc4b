//! Transactions: the records of money earned and spent.
//!
//! This module contains everything related to transactions:
//! - The [Transaction] model and the table definitions for both schema versions
//! - The [TransactionStore] seam and its SQLite implementation
//! - The [TransactionRepository] that scopes reads and writes to a user
//! - Input validation with sign normalization
//! - View handlers and HTMX endpoints for transaction pages

mod api;
pub(crate) mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod form;
pub(crate) mod repository;
mod schema;
pub(crate) mod store;
pub(crate) mod table;
mod transactions_page;
pub(crate) mod validation;

pub use api::get_transactions_json;
pub use self::core::{
    NewTransaction, Transaction, TransactionType, create_legacy_transaction_table,
    create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use repository::{Listing, TransactionRepository};
pub use schema::{
    OwnerColumnUpgrade, add_owner_column, assign_unowned_transactions,
    count_unowned_transactions, has_owner_column,
};
pub use store::{OwnerScope, SqliteTransactionStore, TransactionStore};
pub(crate) use transactions_page::current_user;
pub use transactions_page::get_transactions_page;
pub use validation::{TransactionInput, ValidationError, validate_input};
