use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const APOLOGY_TEXT: &str = "죄송합니다. 일시적인 오류가 발생했습니다.";
pub const GENERIC_GREETING: &str = "안녕하세요! 무엇을 도와드릴까요?";

/// Chat backend session. Lives as long as the widget, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
}

impl ChatSession {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

/// What the conversation is about; forwarded to the backend as scope ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatScope {
    General,
    Bill { id: i64, name: String },
    Meeting { id: i64 },
}

impl ChatScope {
    pub fn bill_id(&self) -> Option<i64> {
        match self {
            ChatScope::Bill { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn meeting_id(&self) -> Option<i64> {
        match self {
            ChatScope::Meeting { id } => Some(*id),
            _ => None,
        }
    }

    pub fn greeting(&self) -> String {
        match self {
            ChatScope::Bill { name, .. } => {
                format!("안녕하세요! \"{name}\" 법률안에 대해 무엇이든 질문해주세요.")
            }
            _ => GENERIC_GREETING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// Message list of one chat widget.
///
/// At most one bot message is streaming at a time; `begin_bot_reply` refuses
/// to open a second one.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    next_id: u64,
    streaming_id: Option<u64>,
}

impl ChatTranscript {
    pub fn new(scope: &ChatScope) -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            next_id: 1,
            streaming_id: None,
        };
        transcript.push(scope.greeting(), false);
        transcript
    }

    fn push(&mut self, text: String, is_user: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            text,
            is_user,
            timestamp: Utc::now(),
        });
        id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn get(&self, id: u64) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn streaming_id(&self) -> Option<u64> {
        self.streaming_id
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming_id.is_some()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        self.push(text.into(), true)
    }

    /// Opens an empty bot bubble and marks it streaming.
    pub fn begin_bot_reply(&mut self) -> Option<u64> {
        if self.streaming_id.is_some() {
            return None;
        }
        let id = self.push(String::new(), false);
        self.streaming_id = Some(id);
        Some(id)
    }

    /// Appends to the streaming bubble. Returns false when nothing streams.
    pub fn append_chunk(&mut self, chunk: &str) -> bool {
        let Some(id) = self.streaming_id else {
            return false;
        };
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text.push_str(chunk);
                true
            }
            None => false,
        }
    }

    pub fn finish_streaming(&mut self) {
        self.streaming_id = None;
    }

    /// Replaces whatever arrived so far with the apology text.
    pub fn fail_streaming(&mut self) {
        if let Some(id) = self.streaming_id.take() {
            if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
                message.text = APOLOGY_TEXT.to_string();
            }
        }
    }

    /// Failure before any bot bubble existed (e.g. session creation).
    pub fn push_bot_error(&mut self) -> u64 {
        self.push(APOLOGY_TEXT.to_string(), false)
    }
}
