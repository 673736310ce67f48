use domain::chat::{ChatEvent, ChatRequest};
use domain::error::ChatError;
use domain::session::{ChatScope, ChatSession, ChatTranscript};
use futures::StreamExt;
use infrastructure::chat_stream::ChatStreamClient;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input, or a reply is still streaming.
    Ignored,
    Completed { message_id: u64 },
    Failed { error: ChatError },
}

/// One chat widget: a scope, a lazily created session and its transcript.
pub struct ChatService {
    client: ChatStreamClient,
    scope: ChatScope,
    session: Option<ChatSession>,
    transcript: ChatTranscript,
}

impl ChatService {
    pub fn new(client: ChatStreamClient, scope: ChatScope) -> Self {
        let transcript = ChatTranscript::new(&scope);
        Self {
            client,
            scope,
            session: None,
            transcript,
        }
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Sends one user message and streams the reply into the transcript.
    ///
    /// `on_chunk` sees every fragment as it lands. Failures are rendered into
    /// the transcript as the apology bubble and reported in the outcome.
    pub async fn send<F>(&mut self, text: &str, cancel: CancellationToken, mut on_chunk: F) -> SendOutcome
    where
        F: FnMut(&str),
    {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.transcript.is_streaming() {
            return SendOutcome::Ignored;
        }
        self.transcript.push_user(trimmed);

        let session_id = match self.ensure_session().await {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, "chatbot session unavailable");
                self.transcript.push_bot_error();
                return SendOutcome::Failed { error: err };
            }
        };

        let Some(message_id) = self.transcript.begin_bot_reply() else {
            return SendOutcome::Ignored;
        };

        let request = ChatRequest {
            message: trimmed.to_string(),
            session_id,
            bill_id: self.scope.bill_id(),
            meeting_id: self.scope.meeting_id(),
        };
        let mut events = self.client.send_message_stream(request, cancel);
        while let Some(event) = events.next().await {
            match event {
                ChatEvent::Chunk(chunk) => {
                    self.transcript.append_chunk(&chunk);
                    on_chunk(&chunk);
                }
                ChatEvent::Complete => {
                    self.transcript.finish_streaming();
                    debug!(message_id, "reply complete");
                    return SendOutcome::Completed { message_id };
                }
                ChatEvent::Error(err) => {
                    error!(error = %err, "reply stream failed");
                    self.transcript.fail_streaming();
                    return SendOutcome::Failed { error: err };
                }
            }
        }
        // The stream always ends with a terminal event; keep the invariant anyway.
        self.transcript.finish_streaming();
        SendOutcome::Completed { message_id }
    }

    async fn ensure_session(&mut self) -> Result<String, ChatError> {
        if let Some(session) = &self.session {
            return Ok(session.id.clone());
        }
        let id = self.client.create_session().await?;
        info!(session_id = %id, "chat session started");
        self.session = Some(ChatSession::new(id.clone()));
        Ok(id)
    }
}
