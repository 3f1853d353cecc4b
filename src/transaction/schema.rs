//! Introspection and upgrades for the two versions of the transactions table.
//!
//! Older databases have a transactions table without the `user_id` column.
//! The server still reads and writes those databases, and the `migrate`
//! binary upgrades them with [add_owner_column].

use rusqlite::Connection;

use crate::auth::UserID;

/// The name of the column that records which user created a transaction.
pub const OWNER_COLUMN: &str = "user_id";

/// Check whether the transactions table has the ownership column.
///
/// Returns `false` if the table does not exist.
///
/// # Errors
/// Returns an error if the table info cannot be queried.
pub fn has_owner_column(connection: &Connection) -> Result<bool, rusqlite::Error> {
    let mut statement = connection.prepare("SELECT name FROM pragma_table_info('transactions')")?;
    let mut rows = statement.query([])?;

    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;

        if name == OWNER_COLUMN {
            return Ok(true);
        }
    }

    Ok(false)
}

/// What [add_owner_column] did to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerColumnUpgrade {
    /// The column was missing and has been added.
    Added,
    /// The column already existed, nothing was changed.
    AlreadyPresent,
}

/// Add the nullable `user_id` column to a legacy transactions table.
///
/// Existing rows are left without an owner until they are assigned with
/// [assign_unowned_transactions].
///
/// # Errors
/// Returns an error if the table cannot be inspected or altered.
pub fn add_owner_column(connection: &Connection) -> Result<OwnerColumnUpgrade, rusqlite::Error> {
    if has_owner_column(connection)? {
        return Ok(OwnerColumnUpgrade::AlreadyPresent);
    }

    connection.execute(
        "ALTER TABLE transactions ADD COLUMN user_id INTEGER \
        REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE",
        (),
    )?;

    Ok(OwnerColumnUpgrade::Added)
}

/// Give every transaction without an owner to `user_id`.
///
/// Returns the number of transactions that were updated.
///
/// # Errors
/// Returns an error if the ownership column is missing or the update fails.
pub fn assign_unowned_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, rusqlite::Error> {
    connection.execute(
        "UPDATE transactions SET user_id = ?1 WHERE user_id IS NULL",
        (user_id.as_i64(),),
    )
}

/// Count the transactions that do not belong to any user.
///
/// # Errors
/// Returns an error if the ownership column is missing or the query fails.
pub fn count_unowned_transactions(connection: &Connection) -> Result<usize, rusqlite::Error> {
    connection.query_row(
        "SELECT COUNT(id) FROM transactions WHERE user_id IS NULL",
        [],
        |row| row.get(0),
    )
}
