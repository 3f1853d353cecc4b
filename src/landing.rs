//! The public landing page at the root path.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::get_user_id_from_auth_cookie,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, base},
};

const FEATURES: [(&str, &str); 3] = [
    (
        "Track All Transactions",
        "Record and categorize both income and expenses in a few clicks.",
    ),
    (
        "Real-time Balance",
        "See your totals and monthly trends as soon as you add a transaction.",
    ),
    (
        "Private to You",
        "Every transaction belongs to your account and is only shown to you.",
    ),
];

/// Show the landing page to visitors, or send signed in users to the dashboard.
pub async fn get_landing_page(jar: PrivateCookieJar) -> Response {
    if get_user_id_from_auth_cookie(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    landing_view().into_response()
}

fn landing_view() -> Markup {
    let content = html!(
        header class="border-b border-gray-100 dark:border-gray-700"
        {
            div class="max-w-screen-xl mx-auto flex items-center justify-between p-4"
            {
                span class="text-2xl font-semibold dark:text-white" { "ExpenseEdge" }

                div class="flex items-center gap-4"
                {
                    a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in" }
                    a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Register" }
                }
            }
        }

        section
            class="max-w-3xl mx-auto px-6 py-16 text-center text-gray-900 dark:text-white"
        {
            h1 class="text-4xl font-bold mb-6" { "Take control of your financial future" }

            p class="text-lg text-gray-600 dark:text-gray-400 mb-8"
            {
                "ExpenseEdge helps you track income and expenses and see where your money goes."
            }

            div class="max-w-xs mx-auto"
            {
                a href=(endpoints::REGISTER_VIEW) data-get-started="true"
                {
                    button type="button" class=(BUTTON_PRIMARY_STYLE) { "Get Started" }
                }
            }
        }

        section class="max-w-screen-xl mx-auto px-6 pb-16 grid grid-cols-1 md:grid-cols-3 gap-8"
        {
            @for (title, description) in FEATURES {
                div
                    class="p-6 rounded-lg border border-gray-100 bg-white shadow-sm
                        dark:bg-gray-800 dark:border-gray-700"
                    data-feature=(title)
                {
                    h3 class="text-xl font-semibold mb-3 dark:text-white" { (title) }
                    p class="text-gray-600 dark:text-gray-400" { (description) }
                }
            }
        }
    );

    base("ExpenseEdge", &[], &content)
}
