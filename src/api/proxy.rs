//! The relay every pass-through route is built from.
//!
//! A route names its backend path, what it requires of the caller and which
//! envelope family it answers in; [`forward`] does the rest: resolve the
//! credential, enforce access, forward method, query and JSON body, and relay
//! the backend's reply.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::credential::{Access, Credential};
use super::envelope::Family;
use super::error::GatewayError;
use super::AppState;
use crate::backend::{BackendReply, Outbound};

/// The parts of an inbound request a proxied route needs.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub method: Method,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl<S> FromRequest<S> for Inbound
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let query = req.uri().query().map(str::to_string);
        let headers = req.headers().clone();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Self {
            method,
            query,
            headers,
            body,
        })
    }
}

impl Inbound {
    /// Parse the body as JSON. An empty body means "no body".
    pub fn json_body(&self) -> Result<Option<Value>, GatewayError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| GatewayError::InvalidBody(e.to_string()))
    }
}

/// Where a route forwards to and how it treats the caller.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    pub segments: Vec<String>,
    pub access: Access,
    pub family: Family,
}

impl ProxyRoute {
    pub fn new<I, S>(family: Family, access: Access, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            access,
            family,
        }
    }

    pub fn simple<I, S>(access: Access, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Family::Simple, access, segments)
    }

    pub fn standard<I, S>(access: Access, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Family::Standard, access, segments)
    }
}

/// Resolve the credential a route may forward, enforcing `Access::Required`.
pub fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    access: Access,
) -> Result<Option<Credential>, GatewayError> {
    let credential = match access {
        Access::Public => None,
        Access::Optional | Access::Required => state.credential(headers),
    };
    if access == Access::Required && credential.is_none() {
        tracing::debug!("Missing credential for protected route");
        return Err(GatewayError::Unauthorized);
    }
    Ok(credential)
}

/// Run the outbound call for a route without rendering the result.
pub async fn call(
    state: &AppState,
    inbound: &Inbound,
    route: &ProxyRoute,
) -> Result<BackendReply, GatewayError> {
    let credential = authorize(state, &inbound.headers, route.access)?;
    let body = inbound.json_body()?;

    let outbound = Outbound::new(inbound.method.clone(), route.segments.clone())
        .query(inbound.query.clone())
        .authorization(credential.map(|c| c.authorization()))
        .json(body);

    Ok(state.backend.send(outbound).await?)
}

/// Proxy a request and relay the reply in the route's family.
pub async fn forward(state: &AppState, inbound: Inbound, route: ProxyRoute) -> Response {
    match call(state, &inbound, &route).await {
        Ok(reply) => relay(reply),
        Err(e) => e.into_response_for(route.family),
    }
}

/// Relay a backend reply with its status and JSON body untouched.
pub fn relay(reply: BackendReply) -> Response {
    match reply.body {
        Some(body) => (reply.status, Json(body)).into_response(),
        None => reply.status.into_response(),
    }
}
