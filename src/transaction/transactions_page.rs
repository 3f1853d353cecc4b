//! Defines the route handler for the page that lists the user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{CurrentUser, get_current_user},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{TransactionRepository, repository::Listing, table::listing_view},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The key for reading the auth cookie.
    pub cookie_key: Key,
    /// The database connection for looking up the current user.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Lists the transactions of the current user.
    pub transactions: TransactionRepository,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
            transactions: state.transactions.clone(),
        }
    }
}

impl FromRef<TransactionsPageState> for Key {
    fn from_ref(state: &TransactionsPageState) -> Self {
        state.cookie_key.clone()
    }
}

/// Look up the user named by the auth cookie, holding the database lock only for the lookup.
pub(crate) fn current_user(
    jar: &PrivateCookieJar,
    db_connection: &Mutex<Connection>,
) -> Result<Option<CurrentUser>, Error> {
    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(get_current_user(jar, &connection))
}

fn transactions_view(user: Option<&CurrentUser>, listing: &Listing) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW)
        .with_user_email(user.map(|user| user.email.as_str()))
        .into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-4"
            {
                div class="flex items-center justify-between"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a
                        href=(endpoints::NEW_TRANSACTION_VIEW)
                        class={ "max-w-fit " (BUTTON_PRIMARY_STYLE) }
                    {
                        "New Transaction"
                    }
                }

                (listing_view(
                    listing,
                    true,
                    "No transactions yet. Add one to start tracking your spending.",
                ))
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Render every transaction of the logged in user, newest first.
///
/// A listing that could not be read is shown as a banner instead of an error page.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let user = current_user(&jar, &state.db_connection)?;
    let listing = state
        .transactions
        .list_transactions(user.as_ref().map(|user| user.id));

    Ok(transactions_view(user.as_ref(), &listing).into_response())
}
