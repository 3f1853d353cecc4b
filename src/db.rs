//! Creates the application's tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{auth::create_user_table, transaction::create_transaction_table};

/// Create the tables the application needs if they do not exist yet.
///
/// An existing `transactions` table is left as is, so a database created
/// before transactions had owners keeps its legacy schema until it is
/// upgraded with the `migrate` binary.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;
    use crate::transaction::{create_legacy_transaction_table, has_owner_column};

    #[test]
    fn new_database_gets_owned_schema() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert!(has_owner_column(&connection).unwrap());
    }

    #[test]
    fn legacy_database_keeps_its_schema() {
        let connection = Connection::open_in_memory().unwrap();
        create_legacy_transaction_table(&connection).unwrap();

        initialize(&connection).unwrap();

        assert!(!has_owner_column(&connection).unwrap());
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert!(initialize(&connection).is_ok());
    }
}
