use crate::error::ChatError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Payload of the streaming chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// What a chat stream yields. Exactly one of `Complete` or `Error` ends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Chunk(String),
    Complete,
    Error(ChatError),
}

impl ChatEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChatEvent::Chunk(_))
    }
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// The wire side of the chatbot: one call per session, one per reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn create_session(&self) -> Result<String, ChatError>;

    /// Opens the reply body. Implementations return `ChatError::Status` for a
    /// non-success response and never buffer the whole body.
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ChatError>;
}
