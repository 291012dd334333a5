//! Parameter validation for inbound chat requests.
//!
//! Validation works on raw JSON so that wrong-typed fields surface as
//! `validation_error` responses instead of framework rejections. The
//! validator only accepts or rejects; clamping is the request builder's
//! concern.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::api::models::ChatRequest;
use crate::core::error::AppError;

/// Maximum length of `userPrompt` in characters.
pub const MAX_USER_PROMPT_CHARS: usize = 8000;

/// Maximum length of `systemPrompt` in characters.
pub const MAX_SYSTEM_PROMPT_CHARS: usize = 4000;

/// Inclusive bounds for `temperature`, `presencePenalty` and `frequencyPenalty`.
pub const PENALTY_BOUNDS: (f64, f64) = (0.0, 2.0);

/// Inclusive bounds for `maxTokens`.
pub const MAX_TOKENS_BOUNDS: (i64, i64) = (1, 4000);

/// Fixed allow-list of model identifiers.
pub static ALLOWED_MODELS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "gpt-3.5-turbo",
        "gpt-3.5-turbo-16k",
        "gpt-4",
        "gpt-4-turbo",
        "gpt-4o",
        "gpt-4o-mini",
    ])
});

/// Validate raw JSON into a normalized [`ChatRequest`].
///
/// Every rule must pass; the first failure is returned with a specific
/// message. No side effects beyond the pass/fail decision.
pub fn validate(raw: &Value) -> Result<ChatRequest, AppError> {
    let body = raw
        .as_object()
        .ok_or_else(|| AppError::Validation("Request body must be a JSON object".to_string()))?;

    let user_prompt = match body.get("userPrompt") {
        None => return Err(AppError::Validation("userPrompt is required".to_string())),
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(AppError::Validation(
                "userPrompt must be a string".to_string(),
            ))
        }
    };
    if user_prompt.trim().is_empty() {
        return Err(AppError::Validation(
            "userPrompt must not be empty".to_string(),
        ));
    }
    if user_prompt.chars().count() > MAX_USER_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "userPrompt must be at most {} characters",
            MAX_USER_PROMPT_CHARS
        )));
    }

    let system_prompt = match body.get("systemPrompt") {
        None => None,
        Some(Value::String(s)) => {
            if s.chars().count() > MAX_SYSTEM_PROMPT_CHARS {
                return Err(AppError::Validation(format!(
                    "systemPrompt must be at most {} characters",
                    MAX_SYSTEM_PROMPT_CHARS
                )));
            }
            Some(s.clone())
        }
        Some(_) => {
            return Err(AppError::Validation(
                "systemPrompt must be a string".to_string(),
            ))
        }
    };

    let model = match body.get("model") {
        None => None,
        Some(Value::String(s)) if ALLOWED_MODELS.contains(s.as_str()) => Some(s.clone()),
        Some(_) => {
            let mut allowed: Vec<&str> = ALLOWED_MODELS.iter().copied().collect();
            allowed.sort_unstable();
            return Err(AppError::Validation(format!(
                "model must be one of: {}",
                allowed.join(", ")
            )));
        }
    };

    let temperature = bounded_number(body, "temperature", PENALTY_BOUNDS)?;
    let presence_penalty = bounded_number(body, "presencePenalty", PENALTY_BOUNDS)?;
    let frequency_penalty = bounded_number(body, "frequencyPenalty", PENALTY_BOUNDS)?;
    let max_tokens = bounded_integer(body, "maxTokens", MAX_TOKENS_BOUNDS)?;

    let stop_sequence = match body.get("stopSequence") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(AppError::Validation(
                "stopSequence must be a string".to_string(),
            ))
        }
    };

    Ok(ChatRequest {
        model,
        system_prompt,
        user_prompt: user_prompt.clone(),
        temperature,
        max_tokens,
        presence_penalty,
        frequency_penalty,
        stop_sequence,
    })
}

/// Check an optional numeric field against inclusive bounds.
fn bounded_number(
    body: &Map<String, Value>,
    field: &str,
    (min, max): (f64, f64),
) -> Result<Option<f64>, AppError> {
    let Some(value) = body.get(field) else {
        return Ok(None);
    };

    let number = value
        .as_f64()
        .ok_or_else(|| AppError::Validation(format!("{} must be a number", field)))?;

    if !(min..=max).contains(&number) {
        return Err(AppError::Validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }

    Ok(Some(number))
}

/// Check an optional integer field against inclusive bounds.
///
/// Fractional JSON numbers are rejected, not truncated.
fn bounded_integer(
    body: &Map<String, Value>,
    field: &str,
    (min, max): (i64, i64),
) -> Result<Option<i64>, AppError> {
    let Some(value) = body.get(field) else {
        return Ok(None);
    };

    let number = value
        .as_i64()
        .ok_or_else(|| AppError::Validation(format!("{} must be an integer", field)))?;

    if !(min..=max).contains(&number) {
        return Err(AppError::Validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }

    Ok(Some(number))
}
