//! Route handlers. Almost all of them are one-line relays: pick the backend
//! path, the access rule and the envelope family, then [`forward`].

pub mod auth;
pub mod translate;

use axum::{extract::Path, extract::State, response::IntoResponse, response::Response, Json};

use super::credential::Access;
use super::proxy::{forward, Inbound, ProxyRoute};
use super::AppState;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// MFA management
// ============================================================

pub async fn mfa_status(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Required, ["mfa", "status"])).await
}

pub async fn mfa_setup(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Required, ["mfa", "setup"])).await
}

pub async fn mfa_enable(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Required, ["mfa", "enable"])).await
}

pub async fn mfa_disable(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Required, ["mfa", "disable"])).await
}

// ============================================================
// News
// ============================================================

pub async fn list_news(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Optional, ["news"])).await
}

pub async fn create_news(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Required, ["news"])).await
}

pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Optional, ["news".to_string(), id])).await
}

/// PUT and DELETE on a single article.
pub async fn modify_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Required, ["news".to_string(), id])).await
}

pub async fn list_news_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let segments = ["news".to_string(), id, "comments".to_string()];
    forward(&state, inbound, ProxyRoute::standard(Access::Optional, segments)).await
}

pub async fn create_news_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let segments = ["news".to_string(), id, "comments".to_string()];
    forward(&state, inbound, ProxyRoute::standard(Access::Required, segments)).await
}

// ============================================================
// Categories
// ============================================================

pub async fn list_categories(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Public, ["categories"])).await
}

pub async fn create_category(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Required, ["categories"])).await
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::standard(Access::Public, ["categories".to_string(), id]);
    forward(&state, inbound, route).await
}

/// PUT and DELETE on a single category.
pub async fn modify_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::standard(Access::Required, ["categories".to_string(), id]);
    forward(&state, inbound, route).await
}

// ============================================================
// Users
// ============================================================

pub async fn users(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Required, ["users"])).await
}

pub async fn user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::standard(Access::Required, ["users".to_string(), id]);
    forward(&state, inbound, route).await
}

// ============================================================
// Comments (moderation)
// ============================================================

pub async fn comments(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Required, ["comments"])).await
}

pub async fn comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::standard(Access::Required, ["comments".to_string(), id]);
    forward(&state, inbound, route).await
}

// ============================================================
// Dashboard
// ============================================================

pub async fn dashboard_stats(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::standard(Access::Required, ["dashboard", "stats"])).await
}

// ============================================================
// Bookmarks
// ============================================================

pub async fn bookmarks(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Required, ["bookmarks"])).await
}

pub async fn bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::simple(Access::Required, ["bookmarks".to_string(), id]);
    forward(&state, inbound, route).await
}

pub async fn bookmark_check(
    State(state): State<AppState>,
    Path(news_id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::simple(
        Access::Required,
        ["bookmarks".to_string(), "check".to_string(), news_id],
    );
    forward(&state, inbound, route).await
}

// ============================================================
// Reading history
// ============================================================

/// List, record, or clear the caller's reading history.
pub async fn reading_history(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Required, ["reading-history"])).await
}

pub async fn reading_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::simple(Access::Required, ["reading-history".to_string(), id]);
    forward(&state, inbound, route).await
}

// ============================================================
// Fact-check
// ============================================================

pub async fn fact_check(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Optional, ["fact-check"])).await
}

pub async fn fact_check_result(
    State(state): State<AppState>,
    Path(news_id): Path<String>,
    inbound: Inbound,
) -> Response {
    let route = ProxyRoute::simple(Access::Optional, ["fact-check".to_string(), news_id]);
    forward(&state, inbound, route).await
}
