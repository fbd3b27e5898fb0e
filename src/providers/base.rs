//! Conversation turns and the `Provider` seam
//!
//! The dialogue engine only ever sees these types; each backend converts
//! them to and from its own wire format.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One turn replayed to the language model
///
/// `role` is `system`, `user` or `assistant`. Assistant turns proposing an
/// operation carry `tool_calls` and usually no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    fn text_turn(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Rider input
    ///
    /// ```
    /// use helpy::providers::Message;
    ///
    /// let turn = Message::user("When does line 5 arrive at stop 123?");
    /// assert_eq!(turn.role, "user");
    /// assert_eq!(turn.text(), "When does line 5 arrive at stop 123?");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::text_turn("user", content)
    }

    /// Assistant text
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text_turn("assistant", content)
    }

    /// Instructions placed at the top of the history
    pub fn system(content: impl Into<String>) -> Self {
        Self::text_turn("system", content)
    }

    /// Assistant turn proposing operation calls instead of text
    ///
    /// ```
    /// use helpy::providers::{FunctionCall, Message, ToolCall};
    ///
    /// let turn = Message::assistant_with_tools(vec![ToolCall {
    ///     id: "call_1".to_string(),
    ///     function: FunctionCall {
    ///         name: "get_lines_at_stop".to_string(),
    ///         arguments: r#"{"stop_number":"123"}"#.to_string(),
    ///     },
    /// }]);
    /// assert!(turn.content.is_none());
    /// assert_eq!(turn.tool_calls.map(|calls| calls.len()), Some(1));
    /// ```
    pub fn assistant_with_tools(calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(calls),
        }
    }

    /// Content as a string slice, empty when absent
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Operation name plus its JSON-encoded arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON text, validated by the dialogue engine
    pub arguments: String,
}

/// A proposed operation call, identified for the provider's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionCall,
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: usize,
    /// Tokens in the completion
    pub completion_tokens: usize,
    /// Sum of both
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new usage record; the total is computed
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Assistant message returned by a provider, with usage when reported
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub message: Message,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    /// Response carrying token counts
    pub fn with_usage(message: Message, usage: TokenUsage) -> Self {
        Self {
            message,
            usage: Some(usage),
        }
    }
}

/// Provider trait for NLU backends
///
/// The dialogue engine treats the provider as an oracle: given the cleaned
/// history and the operation schemas it either answers in text or proposes
/// a single operation call.
///
/// # Examples
///
/// ```no_run
/// use helpy::providers::{CompletionResponse, Message, Provider};
/// use helpy::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(
///         &self,
///         messages: &[Message],
///         _tools: &[serde_json::Value],
///     ) -> Result<CompletionResponse> {
///         let last = messages.last().map(|m| m.text().to_string()).unwrap_or_default();
///         Ok(CompletionResponse::new(Message::assistant(last)))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation with the given messages and operation schemas
    ///
    /// # Arguments
    ///
    /// * `messages` - Conversation history
    /// * `tools` - Operation schemas as `{name, description, parameters}` objects
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<CompletionResponse>;

    /// Name of the model answering requests
    fn get_current_model(&self) -> Result<String> {
        Err(crate::error::HelpyError::Provider(
            "This provider does not report its model".to_string(),
        )
        .into())
    }
}
