//! Encrypted cookies that record which user is logged in and until when.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{Error, auth::UserID};

pub(crate) const COOKIE_USER_ID: &str = "user_id";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);
/// How long the auth cookie lasts when the user ticks "remember me".
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

fn auth_cookie<'a>(name: &'a str, value: String, expiry: OffsetDateTime) -> Cookie<'a> {
    Cookie::build((name, value))
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the auth cookies for `user_id` to `jar`, expiring `duration` from now.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] if the expiry cannot be formatted.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    // Formatted explicitly so that hours before 10am keep two digits.
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    Ok(jar
        .add(auth_cookie(COOKIE_USER_ID, user_id.as_i64().to_string(), expiry))
        .add(auth_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

/// Overwrite the auth cookies with expired values so the browser drops them.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut user_id_cookie =
        auth_cookie(COOKIE_USER_ID, "deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
    user_id_cookie.set_max_age(Duration::ZERO);
    let mut expiry_cookie =
        auth_cookie(COOKIE_EXPIRY, "deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
    expiry_cookie.set_max_age(Duration::ZERO);

    jar.add(user_id_cookie).add(expiry_cookie)
}

/// Push the expiry of the auth cookies in `jar` out to `duration` from now,
/// unless they already expire later than that.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] if either auth cookie is not in the jar.
/// - [Error::InvalidDateFormat] if the current expiry cannot be parsed, or the
///   new expiry overflows or cannot be formatted.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;
    let current_expiry = extract_date_time(&expiry_cookie)?;

    let new_expiry = OffsetDateTime::now_utc().checked_add(duration).ok_or_else(|| {
        Error::InvalidDateFormat("expiry overflowed".to_owned(), format!("now + {duration}"))
    })?;

    set_auth_cookie_expiry(jar, max(current_expiry, new_expiry))
}

/// Set the expiry of both auth cookies in `jar` to `expiry`.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
fn set_auth_cookie_expiry(
    jar: PrivateCookieJar,
    expiry: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    // Request cookies only carry a name and value, so the attributes are set again.
    let user_id = jar
        .get(COOKIE_USER_ID)
        .ok_or(Error::CookieMissing)?
        .value()
        .to_owned();
    if jar.get(COOKIE_EXPIRY).is_none() {
        return Err(Error::CookieMissing);
    }

    Ok(jar
        .add(auth_cookie(COOKIE_USER_ID, user_id, expiry))
        .add(auth_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

/// Read the logged in user's ID from `jar`.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if there is no auth cookie, or
/// [Error::InvalidCredentials] if it does not hold a user ID.
pub(crate) fn get_user_id_from_auth_cookie(jar: &PrivateCookieJar) -> Result<UserID, Error> {
    let cookie = jar.get(COOKIE_USER_ID).ok_or(Error::CookieMissing)?;

    cookie
        .value_trimmed()
        .parse()
        .map(UserID::new)
        .map_err(|_| Error::InvalidCredentials)
}

fn extract_date_time(cookie: &Cookie) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::parse(cookie.value_trimmed(), DATE_TIME_FORMAT).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), cookie.value_trimmed().to_owned())
    })
}
