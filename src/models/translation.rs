use serde::{Deserialize, Serialize};

/// Request body of `POST /api/translate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

/// Response body of `POST /api/translate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslateOutput {
    pub success: bool,
    pub translated_text: String,
    /// True when the text came from the gateway's translation cache.
    pub cached: bool,
}

/// Request body of `POST /api/translate/batch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBatchInput {
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

/// Response body of `POST /api/translate/batch`. `translations` keeps input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBatchOutput {
    pub success: bool,
    pub translations: Vec<String>,
    /// Number of entries answered from the cache.
    pub cached: usize,
}

/// Returns the trimmed language tag, or `None` when missing or blank.
pub fn normalize_language(lang: Option<&str>) -> Option<&str> {
    lang.map(str::trim).filter(|l| !l.is_empty())
}

/// Whether `text` needs no translation at all: blank input, or a source
/// language equal to the target.
pub fn is_passthrough(text: &str, source: Option<&str>, target: &str) -> bool {
    text.trim().is_empty()
        || normalize_language(source).is_some_and(|s| s.eq_ignore_ascii_case(target))
}
