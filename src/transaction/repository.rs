//! The data access layer for transactions.
//!
//! Every operation first tries to scope rows to the signed in user. If the
//! database predates the ownership column, the operation is retried without
//! the owner so that older databases keep working until they are migrated.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::{
        core::Transaction,
        store::{OwnerScope, TransactionStore},
        validation::{TransactionInput, validate_input},
    },
};

/// The result of listing transactions.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// At least one transaction, newest date first.
    Loaded(Vec<Transaction>),
    /// There is nothing to show, either because there is no signed in user
    /// or because the user has no transactions.
    Empty,
    /// The store could not be read. Holds a description of the failure.
    Failed(String),
}

impl Listing {
    /// The listed transactions, or an empty vector if there are none or the
    /// store could not be read.
    pub fn into_transactions(self) -> Vec<Transaction> {
        match self {
            Listing::Loaded(transactions) => transactions,
            Listing::Empty | Listing::Failed(_) => Vec::new(),
        }
    }

    /// The transactions without taking ownership of the listing.
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            Listing::Loaded(transactions) => transactions,
            Listing::Empty | Listing::Failed(_) => &[],
        }
    }
}

/// Lists, creates and deletes transactions on behalf of a user.
///
/// Cheap to clone, clones share the store and the cached schema capability.
#[derive(Clone)]
pub struct TransactionRepository {
    store: Arc<dyn TransactionStore>,
    owner_column: Arc<AtomicBool>,
}

impl Debug for TransactionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionRepository")
            .field("owner_column", &self.owner_column.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl TransactionRepository {
    /// Create a repository and detect whether `store` has the ownership column.
    ///
    /// # Errors
    /// Returns an error if the store's schema could not be inspected.
    pub fn new(store: Arc<dyn TransactionStore>) -> Result<Self, Error> {
        let has_owner_column = store.has_owner_column()?;

        if !has_owner_column {
            tracing::warn!(
                "The transactions table has no user_id column. Transactions will not be \
                scoped to users until the database is migrated with the migrate binary."
            );
        }

        Ok(Self::with_owner_column(store, has_owner_column))
    }

    /// Create a repository with a known schema capability.
    pub fn with_owner_column(store: Arc<dyn TransactionStore>, has_owner_column: bool) -> Self {
        Self {
            store,
            owner_column: Arc::new(AtomicBool::new(has_owner_column)),
        }
    }

    /// Whether operations are currently scoped to the owner.
    pub fn has_owner_column(&self) -> bool {
        self.owner_column.load(Ordering::Relaxed)
    }

    /// List the transactions of `owner`, newest date first.
    ///
    /// Never fails: store errors are reported as [Listing::Failed].
    /// Without an owner the store is not queried.
    pub fn list_transactions(&self, owner: Option<UserID>) -> Listing {
        let Some(owner) = owner else {
            return Listing::Empty;
        };

        match self.run_scoped(owner, "list", |scope| self.store.select(scope)) {
            Ok(transactions) if transactions.is_empty() => Listing::Empty,
            Ok(transactions) => Listing::Loaded(transactions),
            Err(error) => {
                tracing::error!("Could not list transactions for user {owner}: {error}");
                Listing::Failed(error.to_string())
            }
        }
    }

    /// Validate `input` and store it as a transaction belonging to `owner`.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::AuthRequired] if there is no owner.
    /// - [Error::Validation] if `input` is invalid. The store is not called.
    /// - any other error from the store.
    pub fn create_transaction(
        &self,
        owner: Option<UserID>,
        input: TransactionInput,
    ) -> Result<Transaction, Error> {
        let owner = owner.ok_or(Error::AuthRequired)?;
        let new_transaction = validate_input(&input)?;

        self.run_scoped(owner, "create", |scope| {
            self.store.insert(&new_transaction, scope)
        })
    }

    /// Delete the transaction with `id` belonging to `owner`.
    ///
    /// Deleting a transaction that does not exist succeeds.
    ///
    /// # Errors
    /// Returns [Error::AuthRequired] if there is no owner, or any error from
    /// the store.
    pub fn delete_transaction(&self, owner: Option<UserID>, id: TransactionId) -> Result<(), Error> {
        let owner = owner.ok_or(Error::AuthRequired)?;

        let rows_affected = self.run_scoped(owner, "delete", |scope| self.store.delete(id, scope))?;

        if rows_affected == 0 {
            tracing::debug!("Transaction {id} was already gone when user {owner} deleted it");
        }

        Ok(())
    }

    /// Run `operation` scoped to `owner`, retrying once unscoped if the
    /// ownership column turns out to be missing.
    fn run_scoped<T>(
        &self,
        owner: UserID,
        operation_name: &str,
        operation: impl Fn(OwnerScope) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.has_owner_column() {
            match operation(OwnerScope::Owner(owner)) {
                Err(Error::MissingOwnerColumn) => {
                    tracing::warn!(
                        "The user_id column is missing from the transactions table, \
                        no longer scoping transactions to users"
                    );
                    self.owner_column.store(false, Ordering::Relaxed);
                }
                result => return result,
            }
        }

        tracing::warn!("Running unscoped {operation_name} of transactions for user {owner}");
        operation(OwnerScope::Unscoped)
    }
}
