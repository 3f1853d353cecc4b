//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{PasswordHash, cookie::get_user_id_from_auth_cookie},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The signed in user as shown in the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    /// The user's ID, used to scope their transactions.
    pub id: UserID,
    /// The user's email.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateEmail] if another user has registered `email`.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    email: EmailAddress,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (email.as_str(), password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email,
        password_hash,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: EmailAddress::new_unchecked(raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(Error::from)
}

/// Get the user that registered with `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - no user registered with `email` ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(Error::from)
}

/// Get the user identified by the auth cookie in `jar`.
///
/// Returns `None` if there is no valid auth cookie or the user no longer exists.
pub fn get_current_user(jar: &PrivateCookieJar, connection: &Connection) -> Option<CurrentUser> {
    let user_id = get_user_id_from_auth_cookie(jar).ok()?;

    match get_user_by_id(user_id, connection) {
        Ok(user) => Some(CurrentUser {
            id: user.id,
            email: user.email.to_string(),
        }),
        Err(Error::NotFound) => {
            tracing::warn!("The auth cookie names user {user_id}, who does not exist");
            None
        }
        Err(error) => {
            tracing::error!("Could not get the current user {user_id}: {error}");
            None
        }
    }
}

#[cfg(test)]
mod user_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use super::{
        CurrentUser, UserID, create_user, create_user_table, get_current_user, get_user_by_email,
        get_user_by_id,
    };
    use crate::{
        Error,
        auth::{DEFAULT_COOKIE_DURATION, PasswordHash, set_auth_cookie},
    };

    fn get_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();

        connection
    }

    fn email(raw: &str) -> EmailAddress {
        raw.parse().unwrap()
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = create_user(email("foo@bar.baz"), password_hash.clone(), &connection).unwrap();

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.email, email("foo@bar.baz"));
        assert_eq!(user.password_hash, password_hash);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let connection = get_db_connection();
        let hash = PasswordHash::new_unchecked("hunter2");
        create_user(email("foo@bar.baz"), hash.clone(), &connection).unwrap();

        let result = create_user(email("foo@bar.baz"), hash, &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_id_and_email() {
        let connection = get_db_connection();
        let inserted = create_user(
            email("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        assert_eq!(get_user_by_id(inserted.id, &connection), Ok(inserted.clone()));
        assert_eq!(get_user_by_email("foo@bar.baz", &connection), Ok(inserted));
    }

    #[test]
    fn missing_user_is_not_found() {
        let connection = get_db_connection();

        assert_eq!(
            get_user_by_id(UserID::new(42), &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_user_by_email("nobody@example.com", &connection),
            Err(Error::NotFound)
        );
    }

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::from(&Sha512::digest(b"foobar")))
    }

    #[test]
    fn current_user_comes_from_cookie() {
        let connection = get_db_connection();
        let user = create_user(
            email("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let jar = set_auth_cookie(get_jar(), user.id, DEFAULT_COOKIE_DURATION).unwrap();

        let got = get_current_user(&jar, &connection);

        assert_eq!(
            got,
            Some(CurrentUser {
                id: user.id,
                email: "foo@bar.baz".to_owned()
            })
        );
    }

    #[test]
    fn no_current_user_without_cookie_or_user() {
        let connection = get_db_connection();
        let jar = set_auth_cookie(get_jar(), UserID::new(7), DEFAULT_COOKIE_DURATION).unwrap();

        assert_eq!(get_current_user(&get_jar(), &connection), None);
        assert_eq!(get_current_user(&jar, &connection), None);
    }
}
