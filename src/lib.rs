//! ExpenseEdge is a web app for tracking personal income and expenses.
//!
//! This library provides a REST API that directly serves HTML pages.
//! Transactions are recorded per user, summarised on a dashboard and charted
//! month by month.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod landing;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email};
pub use dashboard::{MonthlyAggregate, Summary, compute_monthly_series, compute_summary};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    Listing, NewTransaction, OwnerColumnUpgrade, OwnerScope, SqliteTransactionStore, Transaction,
    TransactionInput, TransactionRepository, TransactionStore, TransactionType, ValidationError,
    add_owner_column, assign_unowned_transactions, count_unowned_transactions,
    create_legacy_transaction_table, create_transaction_table, has_owner_column, validate_input,
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The transaction input failed validation.
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    /// The transactions table does not have the `user_id` column.
    ///
    /// The data access layer handles this error by retrying without the
    /// owner, so it should not reach request handlers.
    #[error("the transactions table has no user_id column")]
    MissingOwnerColumn,

    /// An operation that needs a signed in user was attempted without one.
    #[error("you must be logged in to do that")]
    AuthRequired,

    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email is already used by another user.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// The email is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

/// Whether `error` says that the `user_id` column of the transactions table
/// does not exist.
fn is_missing_owner_column(error: &rusqlite::Error) -> bool {
    let message = error.to_string();

    message.contains("no such column: user_id")
        || message.contains("table transactions has no column named user_id")
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            ref error if is_missing_owner_column(error) => Error::MissingOwnerColumn,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert for HTMX requests.
    ///
    /// Client errors are explained to the user, everything else is logged and
    /// shown as a generic error.
    fn into_alert_response(self) -> Response {
        match self {
            Error::Validation(error) => Alert::error("Invalid transaction", &error.to_string())
                .into_response(StatusCode::BAD_REQUEST),
            Error::AuthRequired => Alert::error(
                "Not logged in",
                "Your session has ended. Log in again and retry.",
            )
            .into_response(StatusCode::UNAUTHORIZED),
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response(StatusCode::INTERNAL_SERVER_ERROR),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;
    use rusqlite::Connection;

    use crate::{
        Error, ValidationError,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[test]
    fn missing_column_on_select_is_classified() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE transactions (id INTEGER PRIMARY KEY)", ())
            .unwrap();

        let error = connection
            .prepare("SELECT id FROM transactions WHERE user_id = 1")
            .unwrap_err();

        assert_eq!(Error::from(error), Error::MissingOwnerColumn);
    }

    #[test]
    fn missing_column_on_insert_is_classified() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE transactions (id INTEGER PRIMARY KEY)", ())
            .unwrap();

        let error = connection
            .execute("INSERT INTO transactions (id, user_id) VALUES (1, 1)", ())
            .unwrap_err();

        assert_eq!(Error::from(error), Error::MissingOwnerColumn);
    }

    #[test]
    fn other_missing_columns_are_not_classified() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE transactions (id INTEGER PRIMARY KEY)", ())
            .unwrap();

        let error = connection
            .prepare("SELECT id FROM transactions WHERE owner = 1")
            .unwrap_err();

        assert!(matches!(Error::from(error), Error::SqlError(_)));
    }

    #[tokio::test]
    async fn validation_error_renders_bad_request_alert() {
        let response =
            Error::Validation(ValidationError::CategoryRequired).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Select a category"), "got alert text {text:?}");
    }

    #[tokio::test]
    async fn store_error_renders_generic_alert() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_alert_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
