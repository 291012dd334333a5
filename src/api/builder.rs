//! Assembly of the upstream chat-completion payload.
//!
//! The builder clamps every numeric parameter a second time and fills
//! defaults, so an out-of-bound value can never be forwarded even if
//! validation were bypassed.

use crate::api::models::{ChatMessage, ChatRequest, UpstreamRequest, DEFAULT_MODEL};

/// Default sampling temperature when the client omits one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion budget when the client omits one.
pub const DEFAULT_MAX_TOKENS: i64 = 1000;

/// At most this many stop sequences are forwarded.
const MAX_STOP_SEQUENCES: usize = 4;

/// Stop sequences longer than this are dropped.
const MAX_STOP_SEQUENCE_CHARS: usize = 100;

/// Build the exact payload forwarded upstream from a validated request.
pub fn build_payload(request: &ChatRequest) -> UpstreamRequest {
    let mut messages = Vec::with_capacity(2);

    if let Some(system) = request.system_prompt.as_deref() {
        let system = system.trim();
        if !system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
    }

    messages.push(ChatMessage {
        role: "user".to_string(),
        content: request.user_prompt.trim().to_string(),
    });

    UpstreamRequest {
        model: request
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        messages,
        temperature: request
            .temperature
            .unwrap_or(DEFAULT_TEMPERATURE)
            .clamp(0.0, 2.0),
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS).clamp(1, 4000) as u32,
        presence_penalty: request.presence_penalty.unwrap_or(0.0).clamp(0.0, 2.0),
        frequency_penalty: request.frequency_penalty.unwrap_or(0.0).clamp(0.0, 2.0),
        stop: split_stop_sequences(request.stop_sequence.as_deref()),
    }
}

/// Split a comma-separated stop-sequence string into the forwarded list.
///
/// Tokens are trimmed; empties and tokens over 100 characters are dropped;
/// at most the first 4 survivors are kept. An empty result means the stop
/// field is omitted entirely.
fn split_stop_sequences(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;

    let sequences: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.chars().count() <= MAX_STOP_SEQUENCE_CHARS)
        .take(MAX_STOP_SEQUENCES)
        .map(str::to_string)
        .collect();

    if sequences.is_empty() {
        None
    } else {
        Some(sequences)
    }
}
