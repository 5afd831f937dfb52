//! Chat assistant relay.
//!
//! The storefront's chat widget speaks to this tier, never to the model
//! provider: the provider API key stays server-side and the marketplace
//! system prompt is pinned here. The upstream is any endpoint speaking the
//! OpenAI chat-completions shape; payloads go over the wire as
//! [`async_openai::types::chat`] structures.

use async_openai::types::chat::{CreateChatCompletionRequest, CreateChatCompletionResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use utoipa::ToSchema;

use crate::config::AssistantConfig;
use crate::errors::Error;

/// One turn of the widget conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant is disabled")]
    Disabled,

    #[error("assistant upstream error: {0}")]
    Upstream(String),

    #[error("assistant unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<AssistantError> for Error {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Disabled => Error::AssistantUnavailable,
            AssistantError::Upstream(message) => Error::Internal {
                operation: format!("relay assistant chat: {message}"),
            },
            AssistantError::Transport(e) => Error::Internal {
                operation: format!("relay assistant chat: {e}"),
            },
        }
    }
}

/// Keep only the most recent turns. The widget resends its whole transcript on
/// every message; the cap bounds upstream token spend.
fn clip_history(turns: &[ChatTurn], max: usize) -> &[ChatTurn] {
    let start = turns.len().saturating_sub(max);
    &turns[start..]
}

/// Relay client for the configured chat-completions endpoint.
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(api_key) = &config.api_key
            && let Ok(bearer) = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
        {
            headers.insert(reqwest::header::AUTHORIZATION, bearer);
        }
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http, config })
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send the conversation upstream and return the assistant's reply text.
    #[instrument(skip_all, fields(turns = turns.len()))]
    pub async fn chat(&self, turns: &[ChatTurn]) -> Result<String, AssistantError> {
        if !self.config.enabled {
            return Err(AssistantError::Disabled);
        }

        let mut messages = vec![json!({ "role": "system", "content": self.config.system_prompt })];
        for turn in clip_history(turns, self.config.max_history) {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            messages.push(json!({ "role": role, "content": turn.content }));
        }

        // Round-trip through the typed request so malformed payloads fail here,
        // not at the provider
        let request: CreateChatCompletionRequest =
            serde_json::from_value(json!({ "model": self.config.model, "messages": messages }))
                .map_err(|e| AssistantError::Upstream(format!("invalid chat payload: {e}")))?;

        let response = self.http.post(self.config.api_url.clone()).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream(format!("completions endpoint returned {status}: {body}")));
        }

        let completion: CreateChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Upstream(format!("unexpected completion payload: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AssistantError::Upstream("completion carried no message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer, enabled: bool) -> AssistantConfig {
        AssistantConfig {
            enabled,
            api_url: Url::parse(&format!("{}/v1/chat/completions", server.uri())).unwrap(),
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            max_history: 4,
            system_prompt: "You are the Bayfront shopping assistant.".to_string(),
        }
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1736000000,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn test_chat_prepends_system_prompt_and_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [{ "role": "system", "content": "You are the Bayfront shopping assistant." }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Try the portfolio category.")))
            .expect(1)
            .mount(&server)
            .await;

        let client = AssistantClient::new(test_config(&server, true)).unwrap();
        let turns = vec![ChatTurn {
            role: ChatRole::User,
            content: "What template should I use for a design portfolio?".to_string(),
        }];
        let reply = client.chat(&turns).await.unwrap();
        assert_eq!(reply, "Try the portfolio category.");
    }

    #[tokio::test]
    async fn test_disabled_assistant_refuses() {
        let server = MockServer::start().await;
        let client = AssistantClient::new(test_config(&server, false)).unwrap();
        let result = client.chat(&[]).await;
        assert!(matches!(result, Err(AssistantError::Disabled)));
    }

    #[tokio::test]
    async fn test_upstream_failures_surface() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = AssistantClient::new(test_config(&server, true)).unwrap();
        let turns = vec![ChatTurn {
            role: ChatRole::User,
            content: "hi".to_string(),
        }];
        let result = client.chat(&turns).await;
        assert!(matches!(result, Err(AssistantError::Upstream(_))));
    }

    #[test]
    fn test_clip_history_keeps_the_tail() {
        let turns: Vec<ChatTurn> = (0..6)
            .map(|i| ChatTurn {
                role: if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant },
                content: format!("turn {i}"),
            })
            .collect();

        let clipped = clip_history(&turns, 4);
        assert_eq!(clipped.len(), 4);
        assert_eq!(clipped[0].content, "turn 2");
        assert_eq!(clipped[3].content, "turn 5");

        assert_eq!(clip_history(&turns, 10).len(), 6);
        assert!(clip_history(&[], 4).is_empty());
    }
}
