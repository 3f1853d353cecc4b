//! The storage backend for transactions.
//!
//! [TransactionStore] is the seam between the data access layer and the
//! database. The application uses [SqliteTransactionStore], tests can
//! substitute their own implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::{
        core::{BASE_COLUMNS, NewTransaction, Transaction, map_transaction_row},
        schema::has_owner_column,
    },
};

/// Which rows a store operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Only rows whose `user_id` equals the given user.
    ///
    /// New rows are tagged with the user.
    Owner(UserID),
    /// Every row, ignoring the ownership column.
    ///
    /// New rows are written without an owner.
    Unscoped,
}

/// Select, insert and delete transactions.
///
/// Implementations must report a missing ownership column as
/// [Error::MissingOwnerColumn] so that callers can retry with
/// [OwnerScope::Unscoped].
pub trait TransactionStore: Send + Sync {
    /// Get the transactions in `scope`, newest date first, with ties broken
    /// by the most recently inserted first.
    ///
    /// # Errors
    /// Returns [Error::MissingOwnerColumn] if `scope` filters by owner and the
    /// column does not exist, or another error if the query failed.
    fn select(&self, scope: OwnerScope) -> Result<Vec<Transaction>, Error>;

    /// Store `transaction` and return it with the fields assigned by the store.
    ///
    /// # Errors
    /// Returns [Error::MissingOwnerColumn] if `scope` tags an owner and the
    /// column does not exist, or another error if the insert failed.
    fn insert(&self, transaction: &NewTransaction, scope: OwnerScope)
    -> Result<Transaction, Error>;

    /// Delete the transaction with `id` in `scope`, returning the number of
    /// rows removed.
    ///
    /// # Errors
    /// Returns [Error::MissingOwnerColumn] if `scope` filters by owner and the
    /// column does not exist, or another error if the delete failed.
    fn delete(&self, id: TransactionId, scope: OwnerScope) -> Result<usize, Error>;

    /// Whether the store can record owners.
    ///
    /// # Errors
    /// Returns an error if the schema could not be inspected.
    fn has_owner_column(&self) -> Result<bool, Error>;
}

/// A [TransactionStore] backed by the SQLite `transactions` table.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTransactionStore {
    /// Create a store that shares `connection` with the rest of the app.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl TransactionStore for SqliteTransactionStore {
    fn select(&self, scope: OwnerScope) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        let transactions = match scope {
            OwnerScope::Owner(user_id) => connection
                .prepare(&format!(
                    "SELECT {BASE_COLUMNS}, user_id FROM transactions \
                    WHERE user_id = ?1 ORDER BY date DESC, id DESC"
                ))?
                .query_map((user_id.as_i64(),), map_transaction_row)?
                .collect::<Result<Vec<_>, _>>()?,
            OwnerScope::Unscoped => connection
                .prepare(&format!(
                    "SELECT {BASE_COLUMNS} FROM transactions ORDER BY date DESC, id DESC"
                ))?
                .query_map([], map_transaction_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(transactions)
    }

    fn insert(
        &self,
        transaction: &NewTransaction,
        scope: OwnerScope,
    ) -> Result<Transaction, Error> {
        let connection = self.lock()?;
        let created_at = OffsetDateTime::now_utc();

        let inserted = match scope {
            OwnerScope::Owner(user_id) => connection
                .prepare(&format!(
                    "INSERT INTO transactions \
                    (created_at, amount, type, category, description, date, user_id) \
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                    RETURNING {BASE_COLUMNS}, user_id"
                ))?
                .query_row(
                    (
                        created_at,
                        transaction.amount,
                        transaction.type_,
                        &transaction.category,
                        &transaction.description,
                        transaction.date,
                        user_id.as_i64(),
                    ),
                    map_transaction_row,
                )?,
            OwnerScope::Unscoped => connection
                .prepare(&format!(
                    "INSERT INTO transactions \
                    (created_at, amount, type, category, description, date) \
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                    RETURNING {BASE_COLUMNS}"
                ))?
                .query_row(
                    (
                        created_at,
                        transaction.amount,
                        transaction.type_,
                        &transaction.category,
                        &transaction.description,
                        transaction.date,
                    ),
                    map_transaction_row,
                )?,
        };

        Ok(inserted)
    }

    fn delete(&self, id: TransactionId, scope: OwnerScope) -> Result<usize, Error> {
        let connection = self.lock()?;

        let rows_affected = match scope {
            OwnerScope::Owner(user_id) => connection.execute(
                "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
                (id, user_id.as_i64()),
            )?,
            OwnerScope::Unscoped => {
                connection.execute("DELETE FROM transactions WHERE id = ?1", (id,))?
            }
        };

        Ok(rows_affected)
    }

    fn has_owner_column(&self) -> Result<bool, Error> {
        let connection = self.lock()?;

        has_owner_column(&connection).map_err(Error::from)
    }
}
