//! Ollama backend
//!
//! Talks to `/api/chat` with `stream: false`. Ollama returns call
//! arguments as JSON objects and leaves call ids empty, so both are
//! normalized before the message reaches the dialogue engine.

use crate::config::OllamaConfig;
use crate::error::{HelpyError, Result};
use crate::providers::{CompletionResponse, FunctionCall, Message, Provider, TokenUsage, ToolCall};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Chat completions served by a local or remote Ollama daemon
///
/// ```no_run
/// use helpy::config::OllamaConfig;
/// use helpy::providers::{Message, OllamaProvider, Provider};
///
/// # async fn example() -> helpy::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let completion = provider
///     .complete(&[Message::user("line 5 at stop 123")], &[])
///     .await?;
/// println!("{}", completion.message.text());
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    http: Client,
    config: OllamaConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireCall>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireCall {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: WireMessage,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaProvider {
    /// Build the provider; fails only if the HTTP client cannot be built
    ///
    /// ```
    /// use helpy::config::OllamaConfig;
    /// use helpy::providers::OllamaProvider;
    ///
    /// assert!(OllamaProvider::new(OllamaConfig::default()).is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("helpy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HelpyError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(host = %config.host, model = %config.model, "Ollama provider ready");
        Ok(Self { http, config })
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.config.host.trim_end_matches('/'))
    }
}

/// History in wire form; turns with neither text nor calls are dropped
fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .filter(|m| m.content.is_some() || m.tool_calls.is_some())
        .map(|m| WireMessage {
            role: m.role.clone(),
            content: m.text().to_string(),
            tool_calls: m
                .tool_calls
                .iter()
                .flatten()
                .map(|call| WireCall {
                    id: call.id.clone(),
                    function: WireFunction {
                        name: call.function.name.clone(),
                        arguments: serde_json::from_str(&call.function.arguments)
                            .unwrap_or_else(|_| Value::Object(Map::new())),
                    },
                })
                .collect(),
        })
        .collect()
}

/// Wrap `{name, description, parameters}` schemas as function tools
fn to_wire_tools(schemas: &[Value]) -> Vec<WireTool> {
    schemas
        .iter()
        .filter(|schema| schema.get("name").and_then(Value::as_str).is_some())
        .map(|schema| WireTool {
            kind: "function",
            function: schema.clone(),
        })
        .collect()
}

fn from_wire_message(wire: WireMessage) -> Message {
    if wire.tool_calls.is_empty() {
        return Message::assistant(wire.content);
    }
    let calls = wire
        .tool_calls
        .into_iter()
        .enumerate()
        .map(|(position, call)| ToolCall {
            id: if call.id.is_empty() {
                format!("call_{}", position)
            } else {
                call.id
            },
            function: FunctionCall {
                name: call.function.name,
                arguments: encode_arguments(call.function.arguments),
            },
        })
        .collect();
    Message::assistant_with_tools(calls)
}

/// Arguments come back either as an object or as an encoded string
fn encode_arguments(arguments: Value) -> String {
    match arguments {
        Value::String(encoded) => encoded,
        Value::Null => "{}".to_string(),
        object => object.to_string(),
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, messages: &[Message], tools: &[Value]) -> Result<CompletionResponse> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: to_wire_messages(messages),
            tools: to_wire_tools(tools),
            stream: false,
        };
        tracing::debug!(
            turns = request.messages.len(),
            tools = request.tools.len(),
            "Calling Ollama"
        );

        let response = self
            .http
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| HelpyError::Provider(format!("Ollama unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Ollama rejected the request: {}", body);
            return Err(HelpyError::Provider(format!("Ollama returned {}: {}", status, body)).into());
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| HelpyError::Provider(format!("Unreadable Ollama reply: {}", e)))?;

        let counted = reply.prompt_eval_count + reply.eval_count > 0;
        let usage = TokenUsage::new(reply.prompt_eval_count, reply.eval_count);
        let message = from_wire_message(reply.message);
        Ok(if counted {
            CompletionResponse::with_usage(message, usage)
        } else {
            CompletionResponse::new(message)
        })
    }

    fn get_current_model(&self) -> Result<String> {
        Ok(self.config.model.clone())
    }
}
