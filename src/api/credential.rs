//! Resolving who is calling: a gateway session cookie or a forwarded
//! `Authorization` header.

use std::time::Duration;

use axum::http::{header, HeaderMap};

use crate::store::SessionStore;

/// What a route demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Never forwards a credential.
    Public,
    /// Forwards a credential when one resolves.
    Optional,
    /// Answers 401 when no credential resolves.
    Required,
}

/// A resolved caller credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A live gateway session; its backend token is sent as a bearer token.
    Session { id: String, token: String },
    /// An inbound `Authorization` header, forwarded verbatim.
    Header(String),
}

impl Credential {
    /// Value of the outbound `Authorization` header.
    pub fn authorization(&self) -> String {
        match self {
            Self::Session { token, .. } => format!("Bearer {}", token),
            Self::Header(value) => value.clone(),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Session { id, .. } => Some(id),
            Self::Header(_) => None,
        }
    }
}

/// Resolve the caller's credential. A live session cookie wins; an unknown
/// or expired one falls through to the `Authorization` header.
pub fn resolve(
    headers: &HeaderMap,
    sessions: &SessionStore,
    cookie_name: &str,
) -> Option<Credential> {
    if let Some(record) = cookie_value(headers, cookie_name).and_then(|id| sessions.get(id)) {
        return Some(Credential::Session {
            id: record.id,
            token: record.access_token,
        });
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| Credential::Header(v.to_string()))
}

/// Find a cookie by name across every `Cookie` header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie(name: &str, id: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name,
        id,
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value clearing the session cookie.
pub fn expired_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", Duration::ZERO, secure)
}
