//! Cards showing the total income, total expenses and balance.

use maud::{Markup, html};

use crate::{dashboard::aggregation::Summary, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 border-l-4 rounded-lg p-4 shadow-md";

fn summary_card(title: &str, amount: f64, accent: &str, amount_style: &str) -> Markup {
    html! {
        div
            class={ (CARD_STYLE) " " (accent) }
            data-summary-card=(title)
            aria-label=(format!("{title}: {}", format_currency(amount)))
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
            p class={ "text-2xl font-bold tabular-nums " (amount_style) }
            {
                (format_currency(amount))
            }
        }
    }
}

/// Renders the three summary cards in a responsive grid.
pub(super) fn summary_cards_view(summary: &Summary) -> Markup {
    let (balance_accent, balance_style) = if summary.balance >= 0.0 {
        ("border-l-purple-500", "text-purple-700 dark:text-purple-300")
    } else {
        ("border-l-orange-500", "text-orange-700 dark:text-orange-300")
    };

    html! {
        section id="summary" class="w-full grid gap-4 grid-cols-1 md:grid-cols-3"
        {
            (summary_card("Total Income", summary.total_income, "border-l-green-500", ""))
            (summary_card("Total Expenses", summary.total_expenses, "border-l-red-500", ""))
            (summary_card("Balance", summary.balance, balance_accent, balance_style))
        }
    }
}
