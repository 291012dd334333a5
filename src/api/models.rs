//! API request and response models.
//!
//! Inbound fields use the camelCase names of the public HTTP surface;
//! the upstream payload uses the snake_case chat-completion wire format.

use serde::{Deserialize, Serialize};

/// Model used when the client does not name one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// A validated, normalized chat request.
///
/// Produced only by the parameter validator; a value of this type has
/// passed every validation rule.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub stop_sequence: Option<String>,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system" or "user"
    pub role: String,

    /// Message content
    pub content: String,
}

/// The exact payload forwarded to the upstream chat-completion API.
///
/// Every numeric field is guaranteed in-bounds by the request builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Upstream chat-completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamResponse {
    pub model: String,

    #[serde(default)]
    pub choices: Vec<Choice>,

    pub usage: Option<Usage>,
}

/// A single choice in the upstream response.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

/// Generated message inside a choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

/// Token usage statistics, passed through from upstream verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Error body shape returned by the upstream API on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorBody {
    pub error: Option<UpstreamErrorDetail>,
}

/// Detail object inside an upstream error body.
///
/// `code` is a Value because upstreams emit strings, numbers, or null here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorDetail {
    pub message: Option<String>,

    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub code: Option<serde_json::Value>,
}

/// Success envelope for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSuccess {
    pub success: bool,
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    pub model: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upstream_request_omits_empty_stop() {
        let payload = UpstreamRequest {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            temperature: 0.7,
            max_tokens: 1000,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            stop: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("stop").is_none());
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_upstream_response_tolerates_missing_fields() {
        let parsed: UpstreamResponse = serde_json::from_value(json!({
            "model": "gpt-4",
        }))
        .unwrap();
        assert!(parsed.choices.is_empty());
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn test_upstream_error_code_accepts_any_shape() {
        let body: UpstreamErrorBody = serde_json::from_value(json!({
            "error": {"message": "boom", "type": "server_error", "code": 500}
        }))
        .unwrap();
        assert_eq!(body.error.unwrap().code, Some(json!(500)));

        let body: UpstreamErrorBody = serde_json::from_value(json!({
            "error": {"message": "nope", "code": "invalid_api_key"}
        }))
        .unwrap();
        assert_eq!(
            body.error.unwrap().code.unwrap().as_str(),
            Some("invalid_api_key")
        );
    }
}
