//! Authentication routes. Login and MFA verification turn a backend token
//! into a gateway session cookie; logout tears it down again.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::credential::{cookie_value, expired_cookie, session_cookie, Access};
use crate::api::proxy::{call, forward, relay, Inbound, ProxyRoute};
use crate::api::AppState;
use crate::backend::Outbound;
use crate::models::LoginGrant;

pub async fn login(State(state): State<AppState>, inbound: Inbound) -> Response {
    establish_session(&state, inbound, ProxyRoute::simple(Access::Public, ["auth", "login"])).await
}

/// Second login step for accounts with MFA enabled.
pub async fn verify_mfa_login(State(state): State<AppState>, inbound: Inbound) -> Response {
    let route = ProxyRoute::simple(Access::Public, ["auth", "mfa", "verify"]);
    establish_session(&state, inbound, route).await
}

pub async fn register(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Public, ["auth", "register"])).await
}

pub async fn me(State(state): State<AppState>, inbound: Inbound) -> Response {
    forward(&state, inbound, ProxyRoute::simple(Access::Required, ["auth", "me"])).await
}

pub async fn forgot_password(State(state): State<AppState>, inbound: Inbound) -> Response {
    let route = ProxyRoute::simple(Access::Public, ["auth", "forgot-password"]);
    forward(&state, inbound, route).await
}

pub async fn reset_password(State(state): State<AppState>, inbound: Inbound) -> Response {
    let route = ProxyRoute::simple(Access::Public, ["auth", "reset-password"]);
    forward(&state, inbound, route).await
}

pub async fn change_password(State(state): State<AppState>, inbound: Inbound) -> Response {
    let route = ProxyRoute::simple(Access::Required, ["auth", "change-password"]);
    forward(&state, inbound, route).await
}

/// Always succeeds from the browser's point of view: the backend is told
/// about the logout when a credential exists, the gateway session is
/// revoked, and the cookie is expired.
pub async fn logout(State(state): State<AppState>, inbound: Inbound) -> Response {
    if let Some(credential) = state.credential(&inbound.headers) {
        let outbound = Outbound::new(inbound.method.clone(), ["auth", "logout"])
            .authorization(Some(credential.authorization()));
        if let Err(e) = state.backend.send(outbound).await {
            tracing::warn!("Backend logout failed: {}", e);
        }
        if let Some(id) = credential.session_id() {
            state.sessions.revoke(id);
            tracing::info!(session = %id, "Session revoked");
        }
    }

    let mut response = Json(serde_json::json!({ "success": true })).into_response();
    append_cookie(
        &mut response,
        expired_cookie(&state.config.session_cookie, state.config.cookie_secure),
    );
    response
}

/// Forward a login-type request; if the backend hands out a token, open a
/// session and attach its cookie to the relayed reply.
async fn establish_session(state: &AppState, inbound: Inbound, route: ProxyRoute) -> Response {
    let reply = match call(state, &inbound, &route).await {
        Ok(reply) => reply,
        Err(e) => return e.into_response_for(route.family),
    };

    let grant = reply.body.as_ref().and_then(LoginGrant::from_backend);
    let mut response = relay(reply);

    if let Some(grant) = grant {
        if let Some(previous) = cookie_value(&inbound.headers, &state.config.session_cookie) {
            if state.sessions.revoke(previous) {
                tracing::info!(session = %previous, "Replaced session revoked");
            }
        }
        let record = state.sessions.create(grant);
        let cookie = session_cookie(
            &state.config.session_cookie,
            &record.id,
            state.sessions.ttl(),
            state.config.cookie_secure,
        );
        if append_cookie(&mut response, cookie) {
            tracing::info!(session = %record.id, "Session established");
        } else {
            state.sessions.revoke(&record.id);
        }
    }

    response
}

fn append_cookie(response: &mut Response, cookie: String) -> bool {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
            true
        }
        Err(e) => {
            tracing::error!("Could not encode session cookie: {}", e);
            false
        }
    }
}
