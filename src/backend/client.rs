//! HTTP client for the content backend.
//!
//! The gateway never interprets backend payloads beyond what it needs to
//! relay them: success bodies come back as JSON values, failures are folded
//! into [`ClientError::Rejected`] with the backend's own status and message.

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Longest slice of a non-JSON error body relayed as a message.
const MAX_RAW_MESSAGE: usize = 200;

/// Backend client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Backend rejected request ({status}): {message}")]
    Rejected {
        status: StatusCode,
        message: String,
        /// Machine-readable code when the backend supplied `error.code`.
        code: Option<String>,
    },
}

/// A request to be sent to the backend.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub method: Method,
    /// Path segments below the backend base URL, unencoded.
    pub segments: Vec<String>,
    pub query: Option<String>,
    /// Value for the outbound `Authorization` header, sent verbatim.
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl Outbound {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: None,
            authorization: None,
            body: None,
        }
    }

    pub fn query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn authorization(mut self, authorization: Option<String>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn json(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Backend path for logging, e.g. `/news/42/comments`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// A successful backend reply. `body` is `None` for empty responses such as 204.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

/// HTTP client for the content backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    client: Client,
}

impl BackendClient {
    /// Create a client rooted at `base_url`, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build the full URL for a set of path segments. Segments are
    /// percent-encoded, so ids taken from inbound paths cannot escape the base.
    fn url_for(&self, segments: &[String], query: Option<&str>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    /// Send a request and classify the reply.
    pub async fn send(&self, outbound: Outbound) -> Result<BackendReply, ClientError> {
        let url = self.url_for(&outbound.segments, outbound.query.as_deref())?;

        let mut req = self
            .client
            .request(outbound.method.clone(), url)
            .header(header::ACCEPT, "application/json");
        if let Some(ref authorization) = outbound.authorization {
            req = req.header(header::AUTHORIZATION, authorization);
        }
        if let Some(ref body) = outbound.body {
            req = req.json(body);
        }

        let response = req.send().await?;
        tracing::debug!(
            method = %outbound.method,
            path = %outbound.path(),
            status = %response.status(),
            "Backend call"
        );
        self.handle_response(response).await
    }

    /// Handle response, converting non-2xx replies to `ClientError::Rejected`.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<BackendReply, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(BackendReply { status, body: None });
            }
            let body = serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::Decode(e.to_string()))?;
            Ok(BackendReply {
                status,
                body: Some(body),
            })
        } else {
            let text = String::from_utf8_lossy(&bytes);
            let (message, code) = describe_rejection(status, &text);
            Err(ClientError::Rejected {
                status,
                message,
                code,
            })
        }
    }

    /// Probe `<base>/health`. Used by the CLI `status` command.
    pub async fn health(&self) -> Result<BackendReply, ClientError> {
        self.send(Outbound::new(Method::GET, ["health"])).await
    }
}

/// Work out the message (and code, if any) to relay for a failed backend call.
///
/// JSON bodies are searched for `message`, `error`, `error.message` and
/// `detail` in that order; plain-text bodies are relayed trimmed and
/// shortened; anything else falls back to the status reason phrase.
pub fn describe_rejection(status: StatusCode, text: &str) -> (String, Option<String>) {
    let fallback = || status.canonical_reason().unwrap_or("Request failed").to_string();

    match serde_json::from_str::<Value>(text) {
        Ok(json) => {
            let candidates = [
                json.get("message"),
                json.get("error"),
                json.pointer("/error/message"),
                json.get("detail"),
            ];
            let message = candidates
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .map(str::trim)
                .find(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(fallback);
            let code = json
                .pointer("/error/code")
                .and_then(Value::as_str)
                .map(str::to_string);
            (message, code)
        }
        Err(_) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                (fallback(), None)
            } else {
                (trimmed.chars().take(MAX_RAW_MESSAGE).collect(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn url_for_appends_encoded_segments() {
        let client = BackendClient::new("http://backend.test/api").unwrap();
        let url = client
            .url_for(&["news".into(), "a b/../c".into()], Some("page=2"))
            .unwrap();
        assert_eq!(url.as_str(), "http://backend.test/api/news/a%20b%2F..%2Fc?page=2");
    }

    #[test]
    fn url_for_handles_trailing_slash_base() {
        let client = BackendClient::new("http://backend.test/api/").unwrap();
        let url = client.url_for(&["categories".into()], None).unwrap();
        assert_eq!(url.as_str(), "http://backend.test/api/categories");
    }

    #[test]
    fn url_for_drops_empty_query() {
        let client = BackendClient::new("http://backend.test").unwrap();
        let url = client.url_for(&["news".into()], Some("")).unwrap();
        assert_eq!(url.as_str(), "http://backend.test/news");
    }

    #[test]
    fn new_rejects_non_base_urls() {
        assert!(matches!(
            BackendClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            BackendClient::new("mailto:news@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn describe_rejection_prefers_message() {
        let (message, code) = describe_rejection(
            StatusCode::BAD_REQUEST,
            r#"{"status":"error","message":"Title is required","error":{"code":"VALIDATION_ERROR"}}"#,
        );
        assert_eq!(message, "Title is required");
        assert_eq!(code.as_deref(), Some("VALIDATION_ERROR"));
    }

    #[test]
    fn describe_rejection_reads_error_string_and_detail() {
        let (message, _) =
            describe_rejection(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid credentials"}"#);
        assert_eq!(message, "Invalid credentials");

        let (message, _) = describe_rejection(StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#);
        assert_eq!(message, "Not found.");

        let (message, _) = describe_rejection(
            StatusCode::CONFLICT,
            r#"{"error":{"message":"Slug taken","code":"DUPLICATE"}}"#,
        );
        assert_eq!(message, "Slug taken");
    }

    #[test]
    fn describe_rejection_falls_back_to_reason() {
        let (message, code) = describe_rejection(StatusCode::NOT_FOUND, "");
        assert_eq!(message, "Not Found");
        assert!(code.is_none());

        let (message, _) = describe_rejection(StatusCode::FORBIDDEN, r#"{"message":"  "}"#);
        assert_eq!(message, "Forbidden");
    }

    #[test]
    fn describe_rejection_truncates_plain_text() {
        let long = "x".repeat(500);
        let (message, _) = describe_rejection(StatusCode::BAD_GATEWAY, &long);
        assert_eq!(message.len(), MAX_RAW_MESSAGE);
    }

    #[tokio::test]
    async fn send_forwards_method_query_auth_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/news/7"))
            .and(query_param("draft", "true"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({"title": "Updated"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri()).unwrap();
        let reply = client
            .send(
                Outbound::new(Method::PUT, ["news", "7"])
                    .query(Some("draft=true".into()))
                    .authorization(Some("Bearer tok".into()))
                    .json(Some(serde_json::json!({"title": "Updated"}))),
            )
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, Some(serde_json::json!({"id": 7})));
    }

    #[tokio::test]
    async fn send_returns_none_for_empty_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri()).unwrap();
        let reply = client
            .send(Outbound::new(Method::DELETE, ["bookmarks", "3"]))
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::NO_CONTENT);
        assert!(reply.body.is_none());
    }

    #[tokio::test]
    async fn send_rejects_non_json_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri()).unwrap();
        let result = client.send(Outbound::new(Method::GET, ["news"])).await;

        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn send_maps_error_status_to_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "News not found"})),
            )
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri()).unwrap();
        let result = client.send(Outbound::new(Method::GET, ["news", "99"])).await;

        match result {
            Err(ClientError::Rejected { status, message, .. }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "News not found");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_reports_transport_failure() {
        let client = BackendClient::new("http://127.0.0.1:1").unwrap();
        let result = client.send(Outbound::new(Method::GET, ["news"])).await;
        assert!(matches!(result, Err(ClientError::Http(_))));
    }
}
