use crate::config::Config;
use async_trait::async_trait;
use domain::chat::{ByteStream, ChatRequest, ChatTransport, CreateSessionResponse};
use domain::error::ChatError;
use futures::StreamExt;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

const SESSION_PATH: &str = "/session";
const STREAM_PATH: &str = "/chat/stream";

/// reqwest-backed chatbot transport.
#[derive(Clone)]
pub struct HttpChatTransport {
    client: Arc<Client>,
    base_url: String,
    timeout: Duration,
}

impl HttpChatTransport {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().connect_timeout(config.timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.chatbot_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn create_session(&self) -> Result<String, ChatError> {
        let url = self.url(SESSION_PATH);
        debug!(%url, "POST chatbot session");
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "session request failed");
                ChatError::Session(e.to_string())
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %body, "session request rejected");
            return Err(ChatError::Session(format!("status {status}")));
        }
        let created: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Session(e.to_string()))?;
        info!(session_id = %created.session_id, "chat session created");
        Ok(created.session_id)
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
        let url = self.url(STREAM_PATH);
        debug!(
            %url,
            session_id = %request.session_id,
            bill_id = ?request.bill_id,
            meeting_id = ?request.meeting_id,
            "POST chat stream"
        );
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = response
            .bytes_stream()
            .map(|piece| piece.map_err(|e| ChatError::Transport(e.to_string())));
        Ok(Box::pin(body))
    }
}
