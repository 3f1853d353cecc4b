//! Authentication middleware that validates cookies, extends sessions, and handles redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::cookie::{extend_auth_cookie_duration_if_needed, get_user_id_from_auth_cookie},
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How an unauthenticated request is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInRedirect {
    /// A plain `303 See Other` for full page loads.
    Page,
    /// An `HX-Redirect` header for requests made by HTMX.
    Htmx,
}

impl IntoResponse for LogInRedirect {
    fn into_response(self) -> Response {
        match self {
            LogInRedirect::Page => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
            LogInRedirect::Htmx => (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::OK,
            )
                .into_response(),
        }
    }
}

/// Run `next` with the user ID from the auth cookie placed in the request
/// extensions, or answer with `redirect` if there is no valid cookie.
async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect: LogInRedirect,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read the cookie jar: {error:?}");
            return redirect.into_response();
        }
    };

    let Ok(user_id) = get_user_id_from_auth_cookie(&jar) else {
        tracing::debug!("Request to {} has no valid auth cookie", parts.uri);
        return redirect.into_response();
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    refresh_auth_cookie(response, jar, state.cookie_duration)
}

/// Add the `Set-Cookie` headers for `jar`, with its expiry pushed back if it
/// is close to running out, to `response`.
fn refresh_auth_cookie(response: Response, jar: PrivateCookieJar, duration: Duration) -> Response {
    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), duration).unwrap_or_else(|error| {
        tracing::error!("Could not extend the auth cookie, keeping the old one: {error}");
        jar
    });

    let (mut parts, body) = response.into_parts();
    let jar_response = jar.into_response();

    for value in jar_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Only let requests with a valid auth cookie through to page routes.
///
/// Requests without one are redirected to the log-in page.
/// Handlers receive the user with `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::Page).await
}

/// Like [auth_guard], but for routes called by HTMX, which need the
/// `HX-Redirect` header to leave the current page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}
