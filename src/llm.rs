//! OpenAI-compatible chat completions with tool calling
//!
//! Only the subset of the wire format the agent loop needs: messages, tool
//! schemas and tool calls. Transient failures are retried with exponential
//! backoff by the middleware stack.

use crate::ScoutError;
use crate::config::LlmConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[default]
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Result of the tool call `call_id`
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::text(Role::Tool, content)
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Tool calls requested by this message, if any
    #[must_use]
    pub fn calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    /// Non-blank text content
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

/// Arguments arrive as a JSON-encoded string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSchema {
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: function_kind(),
            function: FunctionSchema {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Chat model backend
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion; returns the assistant message.
    async fn chat(&self, messages: &[ChatMessage], tools: Option<&[ToolSchema]>) -> Result<ChatMessage>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSchema]>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Client for any endpoint speaking the OpenAI chat completions protocol
pub struct OpenAiCompatClient {
    client: ClientWithMiddleware,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .with_context(|| "Failed to create LLM HTTP client")?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            endpoint: completions_url(&config.api_base),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }
}

fn completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn chat(&self, messages: &[ChatMessage], tools: Option<&[ToolSchema]>) -> Result<ChatMessage> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            tools,
        };
        let body = serde_json::to_vec(&request).with_context(|| "Failed to encode chat request")?;

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ScoutError::llm(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ScoutError::llm(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            warn!("LLM backend returned {}", status);
            return Err(ScoutError::llm(format!("{status}: {}", snippet(&text))).into());
        }

        debug!("LLM replied in {:.3}s", start.elapsed().as_secs_f64());
        parse_reply(&text)
    }
}

/// First choice of a completions response
fn parse_reply(body: &str) -> Result<ChatMessage> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ScoutError::llm(format!("unreadable response ({e}): {}", snippet(body))))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ScoutError::llm("response contained no choices"))?;

    if let Some(reason) = &choice.finish_reason {
        debug!("finish_reason: {}", reason);
    }
    Ok(choice.message)
}

fn snippet(text: &str) -> String {
    const LIMIT: usize = 300;
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completions_url() {
        assert_eq!(
            completions_url("https://generativelanguage.googleapis.com/v1beta/openai/"),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
        assert_eq!(completions_url("http://localhost:8080/v1"), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_parse_tool_call_reply() {
        let body = json!({
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{\"query\":\"Chamonix\"}"}
                    }]
                }
            }]
        })
        .to_string();

        let reply = parse_reply(&body).unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, None);
        assert_eq!(reply.calls().len(), 1);
        assert_eq!(reply.calls()[0].function.name, "web_search");
        assert_eq!(reply.calls()[0].function.arguments, r#"{"query":"Chamonix"}"#);
    }

    #[test]
    fn test_parse_text_reply_without_role() {
        let body = r#"{"choices":[{"message":{"content":"Hello"}}]}"#;
        let reply = parse_reply(body).unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.text_content(), Some("Hello"));
        assert!(reply.calls().is_empty());
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let err = parse_reply(r#"{"choices":[]}"#).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn test_garbage_body_is_an_error() {
        let err = parse_reply("<html>Bad Gateway</html>").unwrap_err();
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_request_serialization() {
        let messages = [
            ChatMessage::system("be brief"),
            ChatMessage::tool("call_1", "42"),
        ];
        let tools = [ToolSchema::function("web_search", "Search", json!({"type": "object"}))];
        let request = ChatRequest {
            model: "gemini-2.5-flash",
            messages: &messages,
            tools: Some(&tools),
        };

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["messages"][0]["role"], "system");
        assert!(value["messages"][0].get("tool_calls").is_none());
        assert_eq!(value["messages"][1]["role"], "tool");
        assert_eq!(value["messages"][1]["tool_call_id"], "call_1");
        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "web_search");
    }

    #[test]
    fn test_request_without_tools_omits_field() {
        let messages = [ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            tools: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_blank_content_is_not_text() {
        assert_eq!(ChatMessage::assistant("  \n").text_content(), None);
    }
}
