//! Back-office session gate.
//!
//! The admin logs in with the shop's PIN and receives an `HttpOnly` session cookie. The
//! cookie carries a token generated when the process starts, so a restart logs everyone
//! out and the cookie cannot be forged by guessing a fixed value.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{admin::Empty, ApiError, AppState, Success};
use crate::config::Config;

pub const SESSION_COOKIE: &str = "admin_session";

#[derive(Debug)]
pub struct AdminSessions {
    token: String,
}

impl AdminSessions {
    pub fn new() -> Self { Self { token: Uuid::new_v4().simple().to_string() } }

    pub fn token(&self) -> &str { &self.token }

    pub fn is_valid(&self, presented: &str) -> bool { presented == self.token }
}

impl Default for AdminSessions {
    fn default() -> Self { Self::new() }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub pin: String,
}

/// Value of cookie `name` across all `Cookie` headers.
pub fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

fn session_cookie(config: &Config, value: &str, max_age: u64) -> String {
    let secure = if config.production { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={value}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Lax{secure}")
}

fn with_cookie(cookie: String) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(&cookie).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let mut response = Success::new(Empty {}).into_response();
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

pub async fn login(State(s): State<AppState>, payload: Result<Json<LoginRequest>, JsonRejection>) -> Result<Response, ApiError> {
    let Json(r) = payload?;
    if r.pin.trim() != s.config.admin_pin {
        tracing::warn!("admin login rejected");
        return Err(ApiError::InvalidPin);
    }
    tracing::info!("admin logged in");
    with_cookie(session_cookie(&s.config, s.sessions.token(), s.config.session_max_age_secs))
}

pub async fn logout(State(s): State<AppState>) -> Result<Response, ApiError> {
    with_cookie(session_cookie(&s.config, "", 0))
}

/// Rejects back-office requests without a valid session cookie.
pub async fn require_admin(State(s): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    match cookie(req.headers(), SESSION_COOKIE) {
        Some(token) if s.sessions.is_valid(token) => Ok(next.run(req).await),
        _ => {
            tracing::debug!(path = %req.uri().path(), "admin session missing");
            Err(ApiError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; admin_session=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(cookie(&headers, SESSION_COOKIE), Some("abc"));
        assert_eq!(cookie(&headers, "other"), Some("1"));
        assert_eq!(cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_session_cookie_flags() {
        let dev = session_cookie(&Config::default(), "t", 60);
        assert_eq!(dev, "admin_session=t; HttpOnly; Path=/; Max-Age=60; SameSite=Lax");
        let prod = session_cookie(&Config { production: true, ..Config::default() }, "t", 60);
        assert!(prod.ends_with("; Secure"));
    }

    #[test]
    fn test_sessions_reject_other_tokens() {
        let sessions = AdminSessions::new();
        assert!(sessions.is_valid(sessions.token()));
        assert!(!sessions.is_valid("true"));
        assert!(!sessions.is_valid(""));
    }
}
