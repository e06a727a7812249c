//! Gateway configuration loaded from environment variables.

use std::{fmt::Display, str::FromStr, time::Duration};

/// Backend base URL used when neither `BACKEND_URL` nor `NEXT_PUBLIC_API_URL` is set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";

const DEFAULT_SESSION_COOKIE: &str = "newsdesk_session";
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_TRANSLATION_CACHE: usize = 1000;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Base URL every proxied path is appended to.
    pub backend_url: String,
    pub host: String,
    pub port: u16,
    /// Name of the cookie carrying the session id.
    pub session_cookie: String,
    pub session_ttl: Duration,
    /// Adds `Secure` to session cookies (from NEWSDESK_COOKIE_SECURE).
    pub cookie_secure: bool,
    /// Allowed CORS origins; `None` means permissive.
    pub cors_origins: Option<Vec<String>>,
    /// Requests per minute per client IP; `None` disables rate limiting.
    pub rate_limit: Option<u32>,
    pub translation_cache_capacity: usize,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url = lookup("BACKEND_URL")
            .or_else(|| lookup("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let cors_origins = lookup("NEWSDESK_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        Self {
            backend_url,
            host: lookup("NEWSDESK_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parsed(&lookup, "NEWSDESK_PORT").unwrap_or(3000),
            session_cookie: lookup("NEWSDESK_SESSION_COOKIE")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.into()),
            session_ttl: Duration::from_secs(
                parsed(&lookup, "NEWSDESK_SESSION_TTL_SECS").unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ),
            cookie_secure: parsed(&lookup, "NEWSDESK_COOKIE_SECURE").unwrap_or(false),
            cors_origins,
            // 0 means off, same as unset.
            rate_limit: parsed(&lookup, "NEWSDESK_RATE_LIMIT").filter(|n: &u32| *n > 0),
            translation_cache_capacity: parsed(&lookup, "NEWSDESK_TRANSLATION_CACHE")
                .unwrap_or(DEFAULT_TRANSLATION_CACHE)
                .max(1),
        }
    }

    /// Defaults pointed at `backend_url`, without reading the environment.
    pub fn for_backend(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            host: "127.0.0.1".into(),
            port: 3000,
            session_cookie: DEFAULT_SESSION_COOKIE.into(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            cookie_secure: false,
            cors_origins: None,
            rate_limit: None,
            translation_cache_capacity: DEFAULT_TRANSLATION_CACHE,
        }
    }

    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit = Some(per_minute);
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: Display,
{
    lookup(key).and_then(|v| parse_or_warn(key, &v))
}

fn parse_or_warn<T: FromStr>(key: &str, value: &str) -> Option<T>
where
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| tracing::warn!("Invalid {key} value {value:?}: {e}, using default"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_backend_uses_defaults() {
        let config = GatewayConfig::for_backend("http://backend.test/api");
        assert_eq!(config.backend_url, "http://backend.test/api");
        assert_eq!(config.session_cookie, "newsdesk_session");
        assert_eq!(config.session_ttl, Duration::from_secs(86400));
        assert!(config.rate_limit.is_none());
        assert!(config.cors_origins.is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn parse_or_warn_rejects_garbage() {
        assert_eq!(parse_or_warn::<u16>("X", "8080"), Some(8080));
        assert_eq!(parse_or_warn::<u16>("X", " 42 "), Some(42));
        assert_eq!(parse_or_warn::<u16>("X", "not-a-port"), None);
        assert_eq!(parse_or_warn::<bool>("X", "true"), Some(true));
    }

    fn lookup_from(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn backend_url_prefers_backend_over_public_url() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("NEXT_PUBLIC_API_URL", "http://public.test/api"),
            ("BACKEND_URL", "http://internal.test/api"),
        ]));
        assert_eq!(config.backend_url, "http://internal.test/api");

        let public_only = &[("NEXT_PUBLIC_API_URL", "http://public.test/api")];
        let config = GatewayConfig::from_lookup(lookup_from(public_only));
        assert_eq!(config.backend_url, "http://public.test/api");

        let config = GatewayConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let config = GatewayConfig::from_lookup(lookup_from(&[(
            "NEWSDESK_CORS_ORIGINS",
            " https://portal.example , ,https://admin.example",
        )]));
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "https://portal.example".to_string(),
                "https://admin.example".to_string()
            ])
        );
    }

    #[test]
    fn blank_cors_origins_stay_permissive() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("NEWSDESK_CORS_ORIGINS", "")]));
        assert_eq!(config.cors_origins, None);

        let config = GatewayConfig::from_lookup(lookup_from(&[("NEWSDESK_CORS_ORIGINS", " , ")]));
        assert_eq!(config.cors_origins, None);
    }

    #[test]
    fn zero_rate_limit_is_off() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("NEWSDESK_RATE_LIMIT", "0")]));
        assert_eq!(config.rate_limit, None);

        let config = GatewayConfig::from_lookup(lookup_from(&[("NEWSDESK_RATE_LIMIT", "30")]));
        assert_eq!(config.rate_limit, Some(30));
    }

    #[test]
    fn unparsable_values_fall_back_to_defaults() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("NEWSDESK_PORT", "http"),
            ("NEWSDESK_SESSION_TTL_SECS", "60"),
            ("NEWSDESK_TRANSLATION_CACHE", "0"),
        ]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.translation_cache_capacity, 1);
    }

    #[test]
    fn builders_override_fields() {
        let config = GatewayConfig::for_backend("http://b")
            .with_rate_limit(10)
            .with_session_ttl(Duration::from_secs(5));
        assert_eq!(config.rate_limit, Some(10));
        assert_eq!(config.session_ttl, Duration::from_secs(5));
    }
}
