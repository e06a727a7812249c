use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body of the simple family.
///
/// Auth, MFA and the reader-facing routes answer failures with just
/// `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleError {
    pub error: String,
}

/// Outcome marker of a [`StandardEnvelope`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Envelope of the standard family used by the dashboard resources.
///
/// Errors always carry `data: null` and an `error.code`; successes may carry
/// pagination or other `metadata`, which is omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardEnvelope {
    pub status: EnvelopeStatus,
    pub message: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
}

impl StandardEnvelope {
    pub fn failure(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data: Value::Null,
            error: Some(ErrorDetail { code: code.into() }),
            metadata: None,
        }
    }
}
