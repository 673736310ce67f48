//! Incremental decoder for the chatbot's line protocol.
//!
//! The reply body is a sequence of `\n`-terminated lines. Blank lines are
//! skipped, `data:<payload>` lines carry text, and the payload `[DONE]` ends
//! the reply. Payloads encode newlines as the two characters `\` `n`.
//!
//! Bytes arrive in arbitrary pieces, so the decoder carries both an
//! incomplete UTF-8 sequence and an unterminated line between calls.

use tracing::debug;

const DATA_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Data(String),
    Done,
}

#[derive(Debug, Default)]
pub struct SseLineDecoder {
    utf8_carry: Vec<u8>,
    pending: String,
    done: bool,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds one read. Returns the events of every line completed by it,
    /// stopping at the sentinel.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<LineEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        let text = self.decode_utf8(bytes);
        self.pending.push_str(&text);

        let Some(last_newline) = self.pending.rfind('\n') else {
            return events;
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        for line in complete.split('\n') {
            match parse_line(line) {
                Some(LineEvent::Done) => {
                    self.done = true;
                    self.pending.clear();
                    events.push(LineEvent::Done);
                    return events;
                }
                Some(event) => events.push(event),
                None => {}
            }
        }
        events
    }

    /// Ends decoding at natural end of body. An unterminated last line is
    /// dropped, not delivered; it is returned for diagnostics.
    pub fn finish(&mut self) -> Option<String> {
        let carry = std::mem::take(&mut self.utf8_carry);
        if !carry.is_empty() {
            self.pending.push_str(&String::from_utf8_lossy(&carry));
        }
        let leftover = std::mem::take(&mut self.pending);
        self.done = true;
        if leftover.is_empty() {
            None
        } else {
            debug!(bytes = leftover.len(), "dropping unterminated trailing line");
            Some(leftover)
        }
    }

    fn decode_utf8(&mut self, bytes: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.utf8_carry);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut input: &[u8] = &buf;
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    input = &[];
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[len..];
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }
        self.utf8_carry = input.to_vec();
        out
    }
}

/// Classifies one complete line (without its `\n`).
pub fn parse_line(line: &str) -> Option<LineEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return None;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        debug!(line, "ignoring non-data line");
        return None;
    };
    if payload == DONE_SENTINEL {
        return Some(LineEvent::Done);
    }
    if payload.is_empty() {
        return None;
    }
    Some(LineEvent::Data(payload.replace("\\n", "\n")))
}
