//! Streaming chat client: turns a reply body into ordered `ChatEvent`s.

use crate::sse_decoder::{LineEvent, SseLineDecoder};
use domain::chat::{ByteStream, ChatEvent, ChatRequest, ChatTransport};
use domain::error::ChatError;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub type ChatStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

#[derive(Clone)]
pub struct ChatStreamClient {
    transport: Arc<dyn ChatTransport>,
}

impl ChatStreamClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// One request, no retry.
    pub async fn create_session(&self) -> Result<String, ChatError> {
        self.transport.create_session().await
    }

    /// Sends `request` and yields the reply as it arrives.
    ///
    /// The stream ends with exactly one `Complete` or `Error` and then yields
    /// `None`. Nothing is sent until the stream is first polled.
    /// `request.session_id` must come from `create_session`.
    pub fn send_message_stream(&self, request: ChatRequest, cancel: CancellationToken) -> ChatStream {
        let state = ReplyState {
            transport: Arc::clone(&self.transport),
            request: Some(request),
            body: None,
            decoder: SseLineDecoder::new(),
            queued: VecDeque::new(),
            cancel,
            finished: false,
        };
        Box::pin(stream::unfold(state, |mut state| async move {
            let event = state.next_event().await?;
            Some((event, state))
        }))
    }

    /// Callback form of `send_message_stream`. `on_complete` and `on_error`
    /// are mutually exclusive and each runs at most once.
    pub async fn send_message_stream_with<C, D, E>(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
        mut on_chunk: C,
        on_complete: D,
        on_error: E,
    ) where
        C: FnMut(String),
        D: FnOnce(),
        E: FnOnce(ChatError),
    {
        let mut events = self.send_message_stream(request, cancel);
        while let Some(event) = events.next().await {
            match event {
                ChatEvent::Chunk(text) => on_chunk(text),
                ChatEvent::Complete => {
                    on_complete();
                    return;
                }
                ChatEvent::Error(err) => {
                    on_error(err);
                    return;
                }
            }
        }
    }
}

enum Read {
    Cancelled,
    Piece(Option<Result<bytes::Bytes, ChatError>>),
}

struct ReplyState {
    transport: Arc<dyn ChatTransport>,
    request: Option<ChatRequest>,
    body: Option<ByteStream>,
    decoder: SseLineDecoder,
    queued: VecDeque<ChatEvent>,
    cancel: CancellationToken,
    finished: bool,
}

impl ReplyState {
    async fn next_event(&mut self) -> Option<ChatEvent> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                if event.is_terminal() {
                    self.close();
                }
                return Some(event);
            }
            if self.finished {
                return None;
            }
            if self.cancel.is_cancelled() {
                return Some(self.terminate(ChatEvent::Error(ChatError::Cancelled)));
            }

            if self.body.is_none() {
                let Some(request) = self.request.take() else {
                    return Some(self.terminate(ChatEvent::Complete));
                };
                let opened = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(ChatError::Cancelled),
                    opened = self.transport.open_stream(&request) => opened,
                };
                match opened {
                    Ok(body) => self.body = Some(body),
                    Err(err) => {
                        warn!(error = %err, "chat stream request failed");
                        return Some(self.terminate(ChatEvent::Error(err)));
                    }
                }
                continue;
            }

            let read = match self.body.as_mut() {
                Some(body) => tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Read::Cancelled,
                    piece = body.next() => Read::Piece(piece),
                },
                None => continue,
            };

            match read {
                Read::Cancelled => {
                    debug!("chat stream cancelled by caller");
                    return Some(self.terminate(ChatEvent::Error(ChatError::Cancelled)));
                }
                Read::Piece(None) => {
                    self.decoder.finish();
                    debug!("chat stream ended without sentinel");
                    return Some(self.terminate(ChatEvent::Complete));
                }
                Read::Piece(Some(Err(err))) => {
                    warn!(error = %err, "chat stream read failed");
                    return Some(self.terminate(ChatEvent::Error(err)));
                }
                Read::Piece(Some(Ok(bytes))) => {
                    for line in self.decoder.feed(&bytes) {
                        match line {
                            LineEvent::Data(text) => self.queued.push_back(ChatEvent::Chunk(text)),
                            LineEvent::Done => {
                                // Whatever the server sends after the sentinel is abandoned.
                                self.body = None;
                                self.queued.push_back(ChatEvent::Complete);
                            }
                        }
                    }
                }
            }
        }
    }

    fn terminate(&mut self, event: ChatEvent) -> ChatEvent {
        self.close();
        event
    }

    fn close(&mut self) {
        self.finished = true;
        self.body = None;
        self.queued.clear();
    }
}
