mod credential;
mod envelope;
mod error;
mod handlers;
mod middleware;
mod proxy;

use std::sync::Arc;

use axum::{
    http::HeaderMap,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use credential::{
    cookie_value, expired_cookie, resolve, session_cookie, Access, Credential,
};
pub use envelope::{error_code, Family};
pub use error::{GatewayError, RouteError, INTERNAL_ERROR_MESSAGE};
pub use middleware::{cors_layer, rate_limit_middleware, RateLimiter};
pub use proxy::{forward, Inbound, ProxyRoute};

use crate::backend::{BackendClient, ClientError};
use crate::config::GatewayConfig;
use crate::store::{SessionStore, TranslationCache};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub backend: BackendClient,
    pub sessions: SessionStore,
    pub translations: TranslationCache,
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, ClientError> {
        let backend = BackendClient::new(&config.backend_url)?;
        Ok(Self {
            backend,
            sessions: SessionStore::new(config.session_ttl),
            translations: TranslationCache::new(config.translation_cache_capacity),
            rate_limiter: config
                .rate_limit
                .filter(|n| *n > 0)
                .map(RateLimiter::per_minute),
            config: Arc::new(config),
        })
    }

    /// Resolve the caller's credential from request headers.
    pub fn credential(&self, headers: &HeaderMap) -> Option<Credential> {
        credential::resolve(headers, &self.sessions, &self.config.session_cookie)
    }

    /// Drop expired sessions and idle rate-limit entries.
    pub fn sweep(&self) {
        let purged = self.sessions.purge_expired();
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }
        if let Some(ref limiter) = self.rate_limiter {
            limiter.cleanup();
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/auth/change-password", post(handlers::auth::change_password))
        .route("/auth/mfa/verify", post(handlers::auth::verify_mfa_login))
        // MFA management
        .route("/mfa/status", get(handlers::mfa_status))
        .route("/mfa/setup", post(handlers::mfa_setup))
        .route("/mfa/enable", post(handlers::mfa_enable))
        .route("/mfa/disable", post(handlers::mfa_disable))
        // News
        .route(
            "/news",
            get(handlers::list_news).post(handlers::create_news),
        )
        .route(
            "/news/{id}",
            get(handlers::get_news)
                .put(handlers::modify_news)
                .delete(handlers::modify_news),
        )
        .route(
            "/news/{id}/comments",
            get(handlers::list_news_comments).post(handlers::create_news_comment),
        )
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category)
                .put(handlers::modify_category)
                .delete(handlers::modify_category),
        )
        // Users
        .route("/users", get(handlers::users).post(handlers::users))
        .route(
            "/users/{id}",
            get(handlers::user).put(handlers::user).delete(handlers::user),
        )
        // Comments (moderation)
        .route("/comments", get(handlers::comments))
        .route(
            "/comments/{id}",
            put(handlers::comment).delete(handlers::comment),
        )
        // Dashboard
        .route("/dashboard/stats", get(handlers::dashboard_stats))
        // Bookmarks
        .route("/bookmarks", get(handlers::bookmarks).post(handlers::bookmarks))
        .route("/bookmarks/{id}", delete(handlers::bookmark))
        .route("/bookmarks/check/{news_id}", get(handlers::bookmark_check))
        // Reading history
        .route(
            "/reading-history",
            get(handlers::reading_history)
                .post(handlers::reading_history)
                .delete(handlers::reading_history),
        )
        .route("/reading-history/{id}", delete(handlers::reading_history_entry))
        // Fact-check
        .route("/fact-check", post(handlers::fact_check))
        .route("/fact-check/{news_id}", get(handlers::fact_check_result))
        // Translation
        .route("/translate", post(handlers::translate::translate))
        .route("/translate/batch", post(handlers::translate::translate_batch));

    let api = match state.rate_limiter.clone() {
        Some(limiter) => api.layer(from_fn_with_state(limiter, rate_limit_middleware)),
        None => api,
    };

    // Health sits outside the rate limiter.
    let api = api.route("/health", get(handlers::health));

    let cors = cors_layer(state.config.cors_origins.as_deref());

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
