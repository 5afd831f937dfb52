//! HTTP handler for the chat assistant widget.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    assistant::ChatTurn,
    errors::{Error, Result},
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The widget's transcript so far, oldest first
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}

#[utoipa::path(
    post,
    path = "/assistant/chat",
    tag = "assistant",
    summary = "Ask the shopping assistant",
    request_body = ChatRequest,
    responses(
        (status = 200, body = ChatResponse),
        (status = 503, description = "Assistant disabled on this storefront"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Result<Json<ChatResponse>> {
    if request.messages.is_empty() {
        return Err(Error::BadRequest {
            message: "conversation must contain at least one message".to_string(),
        });
    }

    let reply = state.assistant.chat(&request.messages).await?;
    Ok(Json(ChatResponse { reply }))
}
