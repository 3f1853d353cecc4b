//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    landing::get_landing_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_create_transaction_page,
        get_transactions_json, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_landing_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These API routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint).get(get_transactions_json),
            )
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;

    use super::build_router;
    use crate::{
        AppState,
        endpoints::{self, format_endpoint},
    };

    const STRONG_PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            "Etc/UTC",
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn register(server: &TestServer, email: &str) -> axum_test::TestResponse {
        server
            .post(endpoints::USERS)
            .form(&[
                ("email", email),
                ("password", STRONG_PASSWORD),
                ("confirm_password", STRONG_PASSWORD),
            ])
            .await
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_cookie() {
        let server = get_test_server();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
        ] {
            let response = server.get(endpoint).await;

            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
        }
    }

    #[tokio::test]
    async fn api_redirects_to_log_in_without_cookie() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS_API).await;

        assert_eq!(response.header("hx-redirect"), endpoints::LOG_IN_VIEW);
    }

    #[tokio::test]
    async fn root_shows_landing_page_until_signed_in() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;
        response.assert_status_ok();
        assert!(response.text().contains("Get Started"));

        let cookies = register(&server, "foo@example.com").await.cookies();
        let response = server.get(endpoints::ROOT).add_cookies(cookies).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/definitely/not/a/page").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_list_and_delete_transaction() {
        let server = get_test_server();
        let registration = register(&server, "foo@example.com").await;
        assert_eq!(registration.header("hx-redirect"), endpoints::DASHBOARD_VIEW);
        let cookies = registration.cookies();

        let created = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies.clone())
            .form(&[
                ("amount", "42.5"),
                ("type_", "expense"),
                ("category", "Food"),
                ("description", "groceries"),
                ("date", "2024-06-01"),
            ])
            .await;
        created.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(created.header("hx-redirect"), endpoints::TRANSACTIONS_VIEW);

        let listing = server
            .get(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies.clone())
            .await;
        listing.assert_status_ok();
        let json: Value = listing.json();
        assert_eq!(json["status"], "loaded");
        assert_eq!(json["transactions"][0]["amount"], -42.5);
        let id = json["transactions"][0]["id"].as_i64().unwrap();

        let deleted = server
            .delete(&format_endpoint(endpoints::TRANSACTION, id))
            .add_cookies(cookies.clone())
            .await;
        deleted.assert_status_ok();

        let listing = server
            .get(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies)
            .await;
        assert_eq!(listing.json::<Value>()["status"], "empty");
    }

    #[tokio::test]
    async fn users_only_see_their_own_transactions() {
        let server = get_test_server();
        let alice = register(&server, "alice@example.com").await.cookies();
        let bob = register(&server, "bob@example.com").await.cookies();

        server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookies(alice.clone())
            .form(&[
                ("amount", "3000"),
                ("type_", "income"),
                ("category", "Salary"),
                ("description", ""),
                ("date", "2024-06-01"),
            ])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let alice_listing = server
            .get(endpoints::TRANSACTIONS_API)
            .add_cookies(alice)
            .await
            .json::<Value>();
        let bob_listing = server
            .get(endpoints::TRANSACTIONS_API)
            .add_cookies(bob)
            .await
            .json::<Value>();

        assert_eq!(alice_listing["status"], "loaded");
        assert_eq!(bob_listing["status"], "empty");
    }

    #[tokio::test]
    async fn invalid_transaction_is_rejected_with_alert() {
        let server = get_test_server();
        let cookies = register(&server, "foo@example.com").await.cookies();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies)
            .form(&[
                ("amount", "-5"),
                ("type_", "expense"),
                ("category", "Food"),
                ("description", ""),
                ("date", "2024-06-01"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Enter an amount greater than zero"));
    }

    #[tokio::test]
    async fn blank_amount_is_rejected_with_alert() {
        let server = get_test_server();
        let cookies = register(&server, "foo@example.com").await.cookies();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies.clone())
            .form(&[
                ("amount", ""),
                ("type_", "expense"),
                ("category", "Food"),
                ("description", ""),
                ("date", "2024-06-01"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Enter an amount greater than zero"));

        let listing = server
            .get(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies)
            .await;
        assert_eq!(listing.json::<Value>()["status"], "empty");
    }

    #[tokio::test]
    async fn huge_amounts_are_rejected_and_dashboard_still_loads() {
        let server = get_test_server();
        let cookies = register(&server, "foo@example.com").await.cookies();

        for _ in 0..2 {
            let response = server
                .post(endpoints::TRANSACTIONS_API)
                .add_cookies(cookies.clone())
                .form(&[
                    ("amount", "100000000000000000"),
                    ("type_", "income"),
                    ("category", "Salary"),
                    ("description", ""),
                    ("date", "2024-06-01"),
                ])
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.text().contains("Enter an amount no more than"));
        }

        server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookies(cookies)
            .await
            .assert_status_ok();
    }
}
