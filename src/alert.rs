//! Alert messages for the results of HTMX requests.
//!
//! Forms swap the alert into `#alert-container` (see [crate::html::base]).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Success,
    Error,
}

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_html(self) -> Markup {
        let style = match self.alert_type {
            AlertType::Success => {
                "flex items-start gap-3 p-4 mb-4 rounded-lg shadow-lg border \
                text-green-800 bg-green-50 border-green-300 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
            }
            AlertType::Error => {
                "flex items-start gap-3 p-4 mb-4 rounded-lg shadow-lg border \
                text-red-800 bg-red-50 border-red-300 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
            }
        };

        html! {
            div class=(style) role="alert"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="text-sm" { (self.details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-auto text-lg leading-none"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        (status, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use super::Alert;
    use crate::test_utils::{assert_valid_html, parse_html_fragment};

    #[tokio::test]
    async fn renders_message_and_details() {
        let response = Alert::success("Saved", "All good").into_response(StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let paragraphs: Vec<String> = html
            .select(&Selector::parse("[role=alert] p").unwrap())
            .map(|p| p.text().collect())
            .collect();
        assert_eq!(paragraphs, vec!["Saved", "All good"]);
    }

    #[tokio::test]
    async fn omits_empty_details() {
        let response = Alert::error("Failed", "").into_response(StatusCode::BAD_REQUEST);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        let count = html.select(&Selector::parse("[role=alert] p").unwrap()).count();
        assert_eq!(count, 1);
    }
}
