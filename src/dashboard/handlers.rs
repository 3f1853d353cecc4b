//! Dashboard HTTP handler and view rendering.

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
    dashboard::{
        aggregation::{compute_monthly_series, compute_summary},
        cards::summary_cards_view,
        charts::{build_dashboard_charts, charts_script, charts_view},
    },
    endpoints,
    html::{ECHARTS_SCRIPT, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    transaction::{
        Listing, Transaction, TransactionRepository, current_user,
        table::{listing_failed_banner, transactions_table},
    },
};

/// The number of transactions in the recent transactions table.
const RECENT_TRANSACTIONS: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The key for reading the auth cookie.
    pub cookie_key: Key,
    /// The database connection for looking up the current user.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Lists the transactions of the current user.
    pub transactions: TransactionRepository,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
            transactions: state.transactions.clone(),
        }
    }
}

impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// Display a page with an overview of the user's transactions.
///
/// Shows summary totals, monthly charts and the most recent transactions.
/// A listing that could not be read is shown as a banner instead of an error page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let user = current_user(&jar, &state.db_connection)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW)
        .with_user_email(user.as_ref().map(|user| user.email.as_str()));

    let listing = state
        .transactions
        .list_transactions(user.as_ref().map(|user| user.id));

    let view = match listing {
        Listing::Loaded(transactions) => dashboard_view(nav_bar, &transactions),
        Listing::Empty => dashboard_no_data_view(nav_bar),
        Listing::Failed(_) => dashboard_failed_view(nav_bar),
    };

    Ok(view.into_response())
}

/// Renders the dashboard page when the user has no transactions.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) data-empty-state="true"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your totals and charts will show up here once you start by "
                (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the dashboard page when the transactions could not be loaded.
fn dashboard_failed_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl"
            {
                (listing_failed_banner())
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with summary cards, charts and recent transactions.
///
/// `transactions` must be ordered newest first.
fn dashboard_view(nav_bar: NavBar, transactions: &[Transaction]) -> Markup {
    let nav_bar = nav_bar.into_html();
    let summary = compute_summary(transactions);
    let charts = build_dashboard_charts(&compute_monthly_series(transactions));
    let recent = &transactions[..transactions.len().min(RECENT_TRANSACTIONS)];

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 py-4 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&summary))

            (charts_view(&charts))

            section id="recent-transactions" class="w-full mb-8"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h3 class="text-xl font-semibold" { "Recent Transactions" }

                    a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
                }

                (transactions_table(recent, false))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}
