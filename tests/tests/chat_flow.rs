use application::chat_service::{ChatService, SendOutcome};
use bytes::Bytes;
use domain::chat::ChatEvent;
use domain::error::ChatError;
use domain::session::{ChatScope, APOLOGY_TEXT};
use futures::StreamExt;
use infrastructure::chat_stream::ChatStreamClient;
use std::sync::Arc;
use tests::FakeTransport;
use tokio_util::sync::CancellationToken;

fn bill_scope() -> ChatScope {
    ChatScope::Bill {
        id: 101,
        name: "주택임대차보호법 일부개정법률안".into(),
    }
}

#[tokio::test]
async fn first_message_creates_session_and_streams_reply() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_lines(&["법안은 ", "~에 관한 내용입니다.", "[DONE]"]);
    let mut chat = ChatService::new(ChatStreamClient::new(transport.clone()), bill_scope());

    let mut seen = Vec::new();
    let outcome = chat
        .send("이 법안은 무엇인가요?", CancellationToken::new(), |chunk| {
            seen.push(chunk.to_string())
        })
        .await;

    let SendOutcome::Completed { message_id } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(transport.sessions_created(), 1);
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].session_id, "session-1");
    assert_eq!(requests[0].message, "이 법안은 무엇인가요?");
    assert_eq!(requests[0].bill_id, Some(101));
    assert_eq!(requests[0].meeting_id, None);

    assert_eq!(seen, vec!["법안은 ", "~에 관한 내용입니다."]);
    let reply = chat.transcript().get(message_id).unwrap();
    assert_eq!(reply.text, "법안은 ~에 관한 내용입니다.");
    assert!(!reply.is_user);
    assert!(!chat.transcript().is_streaming());
}

#[tokio::test]
async fn meeting_scope_is_forwarded() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_lines(&["요약입니다", "[DONE]"]);
    let mut chat = ChatService::new(
        ChatStreamClient::new(transport.clone()),
        ChatScope::Meeting { id: 9 },
    );
    chat.send("회의 요약해줘", CancellationToken::new(), |_| {}).await;
    let request = &transport.requests()[0];
    assert_eq!(request.meeting_id, Some(9));
    assert_eq!(request.bill_id, None);
}

#[tokio::test]
async fn hangul_split_mid_character_is_reassembled() {
    let line = "data:국회 본회의\n".as_bytes().to_vec();
    let transport = Arc::new(FakeTransport::new());
    // Cut inside the first syllable, then inside the last one.
    transport.push_reads(vec![
        Bytes::copy_from_slice(&line[..6]),
        Bytes::copy_from_slice(&line[6..line.len() - 2]),
        Bytes::copy_from_slice(&line[line.len() - 2..]),
    ]);
    let client = ChatStreamClient::new(transport);
    let request = domain::chat::ChatRequest {
        message: "q".into(),
        session_id: "s".into(),
        bill_id: None,
        meeting_id: None,
    };
    let events: Vec<_> = client
        .send_message_stream(request, CancellationToken::new())
        .collect()
        .await;
    assert_eq!(
        events,
        vec![ChatEvent::Chunk("국회 본회의".into()), ChatEvent::Complete]
    );
}

#[tokio::test]
async fn escaped_newlines_reach_the_transcript() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_reads(vec!["data:a\\nb\n", "data:[DONE]\n"]);
    let mut chat = ChatService::new(ChatStreamClient::new(transport), ChatScope::General);
    let outcome = chat.send("hi", CancellationToken::new(), |_| {}).await;
    assert!(matches!(outcome, SendOutcome::Completed { .. }));
    assert_eq!(chat.transcript().last().unwrap().text, "a\nb");
}

#[tokio::test]
async fn missing_body_fails_the_bubble() {
    // Nothing queued: the fake reports an unreadable body.
    let transport = Arc::new(FakeTransport::new());
    let mut chat = ChatService::new(ChatStreamClient::new(transport), bill_scope());
    let outcome = chat.send("hello", CancellationToken::new(), |_| {}).await;
    assert!(matches!(
        outcome,
        SendOutcome::Failed {
            error: ChatError::Unreadable(_)
        }
    ));
    assert_eq!(chat.transcript().last().unwrap().text, APOLOGY_TEXT);
    // The session survives for the next attempt.
    assert!(chat.session().is_some());
}

#[tokio::test]
async fn input_is_accepted_again_after_a_reply() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_lines(&["one", "[DONE]"]);
    transport.push_lines(&["two"]);
    let mut chat = ChatService::new(ChatStreamClient::new(transport.clone()), ChatScope::General);
    chat.send("first", CancellationToken::new(), |_| {}).await;
    let outcome = chat.send("second", CancellationToken::new(), |_| {}).await;
    assert!(matches!(outcome, SendOutcome::Completed { .. }));
    assert_eq!(chat.transcript().last().unwrap().text, "two");
    assert_eq!(transport.sessions_created(), 1);

    let ids: Vec<u64> = chat.transcript().messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}
