//! Session cookies.
//!
//! All cookies are `HttpOnly; SameSite=Lax; Path=/`, plus `Secure` when the
//! deployment serves HTTPS.

use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use tracing::warn;

use crate::domains::auth::types::SessionTokens;

pub const ACCESS_TOKEN_COOKIE: &str = "lb-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "lb-refresh-token";
pub const CODE_VERIFIER_COOKIE: &str = "lb-code-verifier";

const REFRESH_TOKEN_MAX_AGE: i64 = 60 * 60 * 24 * 30;
const CODE_VERIFIER_MAX_AGE: i64 = 60 * 10;

/// Value of the named cookie across every `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Extract Bearer token from Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Access token from the Authorization header, falling back to the cookie.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| read_cookie(headers, ACCESS_TOKEN_COOKIE))
}

pub fn refresh_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, REFRESH_TOKEN_COOKIE)
}

pub fn set_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

pub fn session_cookies(tokens: &SessionTokens, secure: bool) -> Vec<String> {
    vec![
        set_cookie(ACCESS_TOKEN_COOKIE, &tokens.access_token, tokens.expires_in, secure),
        set_cookie(
            REFRESH_TOKEN_COOKIE,
            &tokens.refresh_token,
            REFRESH_TOKEN_MAX_AGE,
            secure,
        ),
    ]
}

pub fn clear_session_cookies(secure: bool) -> Vec<String> {
    vec![
        clear_cookie(ACCESS_TOKEN_COOKIE, secure),
        clear_cookie(REFRESH_TOKEN_COOKIE, secure),
    ]
}

pub fn code_verifier_cookie(verifier: &str, secure: bool) -> String {
    set_cookie(CODE_VERIFIER_COOKIE, verifier, CODE_VERIFIER_MAX_AGE, secure)
}

/// Append `Set-Cookie` headers. Values that are not valid header text are
/// dropped with a warning.
pub fn append_cookies(headers: &mut HeaderMap, cookies: impl IntoIterator<Item = String>) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Dropping unrepresentable cookie"),
        }
    }
}

/// Whether a response already sets the named cookie.
pub fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    let prefix = format!("{}=", name);
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
