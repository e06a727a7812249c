use chrono::{DateTime, Utc};
use serde_json::Value;

/// A signed-in browser session held by the gateway.
///
/// The browser only ever sees the session id in a cookie; the backend access
/// token stays server-side and is attached to proxied calls as a bearer token.
/// Records are **ephemeral**: they live in memory until they expire, the user
/// logs out, or the process restarts.
#[derive(Clone)]
pub struct SessionRecord {
    pub id: String,
    pub access_token: String,
    /// User profile returned by the backend at login, if any.
    pub user: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("id", &self.id)
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// What a successful login (or MFA verification) hands the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub access_token: String,
    pub user: Option<Value>,
}

const TOKEN_FIELDS: [&str; 3] = ["token", "accessToken", "access_token"];

impl LoginGrant {
    /// Pull the access token and user out of a backend login reply.
    ///
    /// Tokens are looked up at the top level first, then under `data`.
    /// Returns `None` when the reply carries no token, e.g. an MFA challenge.
    pub fn from_backend(body: &Value) -> Option<Self> {
        let data = body.get("data");
        let access_token = std::iter::once(Some(body))
            .chain(std::iter::once(data))
            .flatten()
            .find_map(|scope| {
                TOKEN_FIELDS
                    .iter()
                    .find_map(|field| scope.get(*field).and_then(Value::as_str))
            })
            .filter(|t| !t.is_empty())?
            .to_string();

        let user = body
            .get("user")
            .or_else(|| data.and_then(|d| d.get("user")))
            .filter(|u| !u.is_null())
            .cloned();

        Some(Self { access_token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grant_from_top_level_token() {
        let grant = LoginGrant::from_backend(&json!({
            "success": true,
            "token": "abc",
            "user": {"id": 7, "role": "editor"}
        }))
        .unwrap();
        assert_eq!(grant.access_token, "abc");
        assert_eq!(grant.user, Some(json!({"id": 7, "role": "editor"})));
    }

    #[test]
    fn grant_from_nested_access_token() {
        let grant = LoginGrant::from_backend(&json!({
            "status": "success",
            "data": {"accessToken": "xyz", "user": {"id": 1}}
        }))
        .unwrap();
        assert_eq!(grant.access_token, "xyz");
        assert_eq!(grant.user, Some(json!({"id": 1})));
    }

    #[test]
    fn no_grant_for_mfa_challenge() {
        let body = json!({"success": true, "mfaRequired": true, "mfaToken": "tmp"});
        assert!(LoginGrant::from_backend(&body).is_none());
    }

    #[test]
    fn empty_token_is_not_a_grant() {
        assert!(LoginGrant::from_backend(&json!({"token": ""})).is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let record = SessionRecord {
            id: "s1".into(),
            access_token: "secret-token".into(),
            user: None,
            created_at: Utc::now(),
            expires_at: Utc::now(),
        };
        assert!(!format!("{:?}", record).contains("secret-token"));
    }
}
