//! Defines the core data models and table definitions for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{auth::UserID, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, stored with a positive amount.
    Income,
    /// Money going out, stored with a negative amount.
    Expense,
}

/// The suggested categories for income transactions.
pub const INCOME_CATEGORIES: [&str; 5] = ["Salary", "Freelance", "Investments", "Gift", "Other"];

/// The suggested categories for expense transactions.
pub const EXPENSE_CATEGORIES: [&str; 9] = [
    "Food",
    "Housing",
    "Transport",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Education",
    "Shopping",
    "Other",
];

impl TransactionType {
    /// The text stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The categories offered in the form for this type.
    ///
    /// The store does not enforce these, so rows may carry other categories.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => &INCOME_CATEGORIES,
            TransactionType::Expense => &EXPENSE_CATEGORIES,
        }
    }

    /// Whether `category` is one of the suggested categories for this type.
    pub fn is_known_category(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "Income"),
            TransactionType::Expense => write!(f, "Expense"),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type \"{other}\"").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are immutable once stored. They can only be created or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: TransactionId,
    /// When the transaction was recorded, assigned by the store.
    pub created_at: OffsetDateTime,
    /// The signed amount of money: positive for income, negative for expenses.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub type_: TransactionType,
    /// What the money was earned from or spent on, e.g. "Salary" or "Food".
    pub category: String,
    /// Free text detailing the transaction.
    pub description: String,
    /// When the transaction happened, as opposed to when it was recorded.
    pub date: Date,
    /// The user that created the transaction.
    ///
    /// `None` for rows stored without an ownership column, or written before
    /// the column was added.
    pub owner_id: Option<UserID>,
}

impl Transaction {
    /// The size of the amount regardless of which sign convention wrote it.
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }
}

/// A validated transaction that is ready to be written to the store.
///
/// Construct one with [crate::transaction::validate_input] so that the
/// amount's sign matches the transaction type.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The signed amount, negative for expenses and positive for income.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub type_: TransactionType,
    /// The non-empty category.
    pub category: String,
    /// Free text detailing the transaction, may be empty.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

// ============================================================================
// TABLES
// ============================================================================

/// Create the transactions table with the `user_id` ownership column.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                user_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    create_date_index(connection)
}

/// Create the transactions table as it was before the ownership column existed.
///
/// Databases created with this schema are upgraded by the `migrate` binary.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_legacy_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL
                )",
        (),
    )?;

    create_date_index(connection)
}

fn create_date_index(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);",
        (),
    )?;

    Ok(())
}

/// The columns shared by both schema versions, in the order [map_transaction_row] reads them.
pub(crate) const BASE_COLUMNS: &str = "id, created_at, amount, type, category, description, date";

/// Map a database row to a Transaction.
///
/// Expects the columns in [BASE_COLUMNS] order, optionally followed by `user_id`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let owner_id = match row.as_ref().column_count() {
        count if count > 7 => row.get::<_, Option<i64>>(7)?.map(UserID::new),
        _ => None,
    };

    Ok(Transaction {
        id: row.get(0)?,
        created_at: row.get(1)?,
        amount: row.get(2)?,
        type_: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        owner_id,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{TransactionType, create_legacy_transaction_table, create_transaction_table};
    use crate::transaction::schema::has_owner_column;

    #[test]
    fn owned_table_has_user_id_column() {
        let conn = Connection::open_in_memory().unwrap();
        create_transaction_table(&conn).unwrap();

        assert!(has_owner_column(&conn).unwrap());
    }

    #[test]
    fn legacy_table_has_no_user_id_column() {
        let conn = Connection::open_in_memory().unwrap();
        create_legacy_transaction_table(&conn).unwrap();

        assert!(!has_owner_column(&conn).unwrap());
    }

    #[test]
    fn categories_match_type() {
        assert!(TransactionType::Income.is_known_category("Salary"));
        assert!(!TransactionType::Income.is_known_category("Food"));
        assert!(TransactionType::Expense.is_known_category("Food"));
        assert!(TransactionType::Expense.is_known_category("Other"));
        assert!(!TransactionType::Expense.is_known_category(""));
    }

    #[test]
    fn type_round_trips_through_sql() {
        let conn = Connection::open_in_memory().unwrap();

        for want in [TransactionType::Income, TransactionType::Expense] {
            let got: TransactionType = conn
                .query_row("SELECT ?1", [want], |row| row.get(0))
                .unwrap();
            assert_eq!(got, want);
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();

        let result: Result<TransactionType, _> =
            conn.query_row("SELECT 'transfer'", [], |row| row.get(0));

        assert!(result.is_err());
    }
}
