//! The registration page and the endpoint that creates user accounts.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        email_input, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// Error messages to show next to each input of the registration form.
#[derive(Default)]
struct RegistrationErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(email: &str, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form("", RegistrationErrors::default());
    let content = log_in_register("Create an account", &form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a user account and log the new user in.
///
/// On success the client is redirected to the dashboard, otherwise the form
/// is returned with error messages next to the offending inputs.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let raw_email = user_data.email.trim();

    let email = match EmailAddress::from_str(raw_email) {
        Ok(email) => email,
        Err(error) => {
            tracing::debug!("Rejected registration with invalid email: {error}");
            let message = Error::InvalidEmail(raw_email.to_owned()).to_string();
            return registration_form(
                raw_email,
                RegistrationErrors {
                    email: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                raw_email,
                RegistrationErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            raw_email,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");

            return get_internal_server_error_redirect();
        }
    };

    let user = match state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| create_user(email, password_hash, &connection))
    {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            let message = Error::DuplicateEmail.to_string();
            return registration_form(
                raw_email,
                RegistrationErrors {
                    email: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");

            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::State,
        http::{Response, StatusCode},
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use scraper::Selector;

    use super::{RegisterForm, RegistrationState, register_user};
    use crate::{
        app_state::create_cookie_key,
        auth::{DEFAULT_COOKIE_DURATION, create_user_table, get_user_by_email},
        endpoints,
        test_utils::{assert_hx_redirect, assert_valid_html, parse_html_fragment},
    };

    const STRONG_PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_state() -> RegistrationState {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();

        RegistrationState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn post_form(
        state: RegistrationState,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let form = RegisterForm {
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        };

        register_user(State(state), jar, Form(form)).await
    }

    async fn error_messages(response: Response<Body>) -> Vec<String> {
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        html.select(&Selector::parse("p.text-red-500").unwrap())
            .map(|p| p.text().collect())
            .collect()
    }

    #[tokio::test]
    async fn creates_user_and_logs_in() {
        let state = get_test_state();

        let response = post_form(
            state.clone(),
            " foo@example.com ",
            STRONG_PASSWORD,
            STRONG_PASSWORD,
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert!(response.headers().get("set-cookie").is_some());
        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_email("foo@example.com", &connection).is_ok());
    }

    #[tokio::test]
    async fn rejects_invalid_email() {
        let response = post_form(get_test_state(), "not-an-email", STRONG_PASSWORD, STRONG_PASSWORD).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            error_messages(response).await,
            vec!["\"not-an-email\" is not a valid email address"]
        );
    }

    #[tokio::test]
    async fn rejects_weak_password() {
        let response = post_form(get_test_state(), "foo@example.com", "password", "password").await;

        let messages = error_messages(response).await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("password is too weak"), "got {messages:?}");
    }

    #[tokio::test]
    async fn rejects_mismatched_passwords() {
        let response = post_form(
            get_test_state(),
            "foo@example.com",
            STRONG_PASSWORD,
            "averysafeandsecurepasswore",
        )
        .await;

        assert_eq!(error_messages(response).await, vec!["Passwords do not match"]);
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let state = get_test_state();
        post_form(state.clone(), "foo@example.com", STRONG_PASSWORD, STRONG_PASSWORD).await;

        let response = post_form(state, "foo@example.com", STRONG_PASSWORD, STRONG_PASSWORD).await;

        assert_eq!(
            error_messages(response).await,
            vec!["the email is already in use"]
        );
    }
}
