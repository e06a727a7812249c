//! Translation routes, served from the gateway's cache when possible.

use std::collections::{HashMap, HashSet};

use axum::{extract::State, http::Method, Json};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::api::credential::{Access, Credential};
use crate::api::envelope::Family;
use crate::api::error::{GatewayError, RouteError};
use crate::api::proxy::{authorize, Inbound};
use crate::api::AppState;
use crate::backend::Outbound;
use crate::models::{
    is_passthrough, normalize_language, TranslateBatchInput, TranslateBatchOutput, TranslateInput,
    TranslateOutput,
};

const FAMILY: Family = Family::Simple;

pub async fn translate(
    State(state): State<AppState>,
    inbound: Inbound,
) -> Result<Json<TranslateOutput>, RouteError> {
    let credential =
        authorize(&state, &inbound.headers, Access::Optional).map_err(|e| e.within(FAMILY))?;
    let input: TranslateInput = parse_body(&inbound)?;
    let target = required_language(input.target_language.as_deref())?;
    let source = normalize_language(input.source_language.as_deref());

    if is_passthrough(&input.text, source, &target) {
        return Ok(Json(TranslateOutput {
            success: true,
            translated_text: input.text,
            cached: false,
        }));
    }

    if let Some(hit) = state.translations.get(&input.text, &target) {
        tracing::debug!(target_language = %target, "Translation cache hit");
        return Ok(Json(TranslateOutput {
            success: true,
            translated_text: hit,
            cached: true,
        }));
    }

    let mut payload = json!({ "text": input.text, "targetLanguage": target });
    if let Some(source) = source {
        payload["sourceLanguage"] = json!(source);
    }

    let body = send(&state, credential, ["translate"], payload).await?;
    let translated = translated_text(&body).ok_or_else(|| {
        GatewayError::UnexpectedPayload("translation reply has no translated text".into())
            .within(FAMILY)
    })?;

    state.translations.insert(&input.text, &target, translated.clone());

    Ok(Json(TranslateOutput {
        success: true,
        translated_text: translated,
        cached: false,
    }))
}

/// Translate many texts at once. Cached and blank entries are answered
/// locally; the remaining distinct texts go to the backend in one call.
pub async fn translate_batch(
    State(state): State<AppState>,
    inbound: Inbound,
) -> Result<Json<TranslateBatchOutput>, RouteError> {
    let credential =
        authorize(&state, &inbound.headers, Access::Optional).map_err(|e| e.within(FAMILY))?;
    let input: TranslateBatchInput = parse_body(&inbound)?;
    let target = required_language(input.target_language.as_deref())?;
    let source = normalize_language(input.source_language.as_deref());

    let mut slots: Vec<Option<String>> = Vec::with_capacity(input.texts.len());
    let mut hits = 0;
    let mut misses: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for text in &input.texts {
        if is_passthrough(text, source, &target) {
            slots.push(Some(text.clone()));
        } else if let Some(hit) = state.translations.get(text, &target) {
            hits += 1;
            slots.push(Some(hit));
        } else {
            if seen.insert(text.as_str()) {
                misses.push(text.clone());
            }
            slots.push(None);
        }
    }

    if !misses.is_empty() {
        let mut payload = json!({ "texts": misses, "targetLanguage": target });
        if let Some(source) = source {
            payload["sourceLanguage"] = json!(source);
        }

        let body = send(&state, credential, ["translate", "batch"], payload).await?;
        let translated = batch_translations(&body).ok_or_else(|| {
            GatewayError::UnexpectedPayload("batch reply has no translations".into()).within(FAMILY)
        })?;
        if translated.len() != misses.len() {
            return Err(GatewayError::UnexpectedPayload(format!(
                "expected {} translations, got {}",
                misses.len(),
                translated.len()
            ))
            .within(FAMILY));
        }

        let fresh: HashMap<&str, String> = misses
            .iter()
            .map(String::as_str)
            .zip(translated)
            .inspect(|(text, translation)| {
                state.translations.insert(text, &target, translation.clone())
            })
            .collect();

        for (slot, text) in slots.iter_mut().zip(&input.texts) {
            if slot.is_none() {
                *slot = fresh.get(text.as_str()).cloned();
            }
        }
    }

    Ok(Json(TranslateBatchOutput {
        success: true,
        translations: slots.into_iter().map(Option::unwrap_or_default).collect(),
        cached: hits,
    }))
}

fn parse_body<T: DeserializeOwned>(inbound: &Inbound) -> Result<T, RouteError> {
    let body = inbound
        .json_body()
        .map_err(|e| e.within(FAMILY))?
        .ok_or_else(|| GatewayError::BadRequest("Request body is required".into()).within(FAMILY))?;
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidBody(e.to_string()).within(FAMILY))
}

fn required_language(lang: Option<&str>) -> Result<String, RouteError> {
    normalize_language(lang)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::BadRequest("targetLanguage is required".into()).within(FAMILY))
}

async fn send<const N: usize>(
    state: &AppState,
    credential: Option<Credential>,
    segments: [&str; N],
    payload: Value,
) -> Result<Value, RouteError> {
    let outbound = Outbound::new(Method::POST, segments)
        .authorization(credential.map(|c| c.authorization()))
        .json(Some(payload));

    let reply = state
        .backend
        .send(outbound)
        .await
        .map_err(|e| GatewayError::from(e).within(FAMILY))?;
    reply.body.ok_or_else(|| {
        GatewayError::UnexpectedPayload("empty translation reply".into()).within(FAMILY)
    })
}

fn translated_text(body: &Value) -> Option<String> {
    ["/translatedText", "/translation", "/data/translatedText", "/data/translation"]
        .into_iter()
        .find_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
        .map(str::to_string)
}

fn batch_translations(body: &Value) -> Option<Vec<String>> {
    ["/translations", "/data/translations"]
        .into_iter()
        .find_map(|pointer| body.pointer(pointer).and_then(Value::as_array))?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}
