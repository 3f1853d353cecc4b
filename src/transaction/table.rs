//! HTML rendering of transaction listings, shared by the transactions page and the dashboard.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
    transaction::{
        core::{Transaction, TransactionType},
        repository::Listing,
    },
};

fn amount_class(type_: TransactionType) -> &'static str {
    match type_ {
        TransactionType::Expense => "text-red-700 dark:text-red-300",
        TransactionType::Income => "text-green-700 dark:text-green-300",
    }
}

/// The amount as shown to the user, signed by the transaction type.
///
/// Rows written with positive expense amounts are displayed the same as
/// rows written with negative ones.
fn display_amount(transaction: &Transaction) -> f64 {
    match transaction.type_ {
        TransactionType::Expense => -transaction.magnitude(),
        TransactionType::Income => transaction.magnitude(),
    }
}

fn transaction_row_view(transaction: &Transaction, show_actions: bool) -> Markup {
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = if transaction.description.is_empty() {
        "Are you sure you want to delete this transaction? This cannot be undone.".to_owned()
    } else {
        format!(
            "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
            transaction.description
        )
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (transaction.date) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(TABLE_CELL_STYLE) { (transaction.type_) }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(transaction.type_)) }
            {
                (format_currency(display_amount(transaction)))
            }

            @if show_actions {
                td class=(TABLE_CELL_STYLE)
                {
                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// A table of `transactions` in the given order.
///
/// With `show_actions` each row gets a button that deletes it.
pub(crate) fn transactions_table(transactions: &[Transaction], show_actions: bool) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }

                        @if show_actions {
                            th scope="col" class=(TABLE_CELL_STYLE)
                            {
                                span class="sr-only" { "Actions" }
                            }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row_view(transaction, show_actions))
                    }
                }
            }
        }
    }
}

/// A notice that the transactions could not be loaded.
pub(crate) fn listing_failed_banner() -> Markup {
    html! {
        div
            role="alert"
            data-listing-failed="true"
            class="w-full p-4 mb-4 rounded-lg border text-red-800 bg-red-50 border-red-300
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        {
            p class="font-semibold" { "Could not load transactions" }
            p class="text-sm" { "Try refreshing the page. If the problem persists, check the server logs." }
        }
    }
}

/// The table for a loaded listing, a banner for a failed one and `empty_message` otherwise.
pub(crate) fn listing_view(listing: &Listing, show_actions: bool, empty_message: &str) -> Markup {
    match listing {
        Listing::Loaded(transactions) => transactions_table(transactions, show_actions),
        Listing::Failed(_) => listing_failed_banner(),
        Listing::Empty => html! {
            p data-empty-state="true" class="w-full px-6 py-4 text-center text-gray-500 dark:text-gray-400"
            {
                (empty_message)
            }
        },
    }
}
