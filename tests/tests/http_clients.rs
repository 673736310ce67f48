use application::vote_service::VoteService;
use domain::backend::BillBackend;
use domain::chat::{ChatEvent, ChatRequest, ChatTransport};
use domain::error::{ApiError, ChatError, VoteError};
use domain::vote::{VoteChoice, VoteStatus, VoteTally};
use futures::StreamExt;
use infrastructure::api_client::ApiClient;
use infrastructure::chat_stream::ChatStreamClient;
use infrastructure::chatbot_client::HttpChatTransport;
use infrastructure::config::Config;
use infrastructure::memory_store::MemoryStore;
use infrastructure::vote_storage::VoteGuard;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config::load()
        .with_api_base_url(&server.uri())
        .with_chatbot_base_url(&format!("{}/api/chatbot", server.uri()))
}

fn bill_json(id: i64, agree: u64, disagree: u64, has_voted: bool) -> serde_json::Value {
    json!({
        "id": id,
        "billNo": 2200000 + id,
        "billName": "주택임대차보호법 일부개정법률안",
        "tag": "주거",
        "proposeDate": "2024-06-03",
        "totalCount": agree + disagree,
        "agreeCount": agree,
        "disagreeCount": disagree,
        "hasVoted": has_voted,
        "summaryHighlight": "[전세 보증금 보호 강화]"
    })
}

fn request(session_id: &str) -> ChatRequest {
    ChatRequest {
        message: "이 법안은 무엇인가요?".into(),
        session_id: session_id.into(),
        bill_id: Some(101),
        meeting_id: None,
    }
}

#[tokio::test]
async fn session_is_created_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessionId": "abc-123"})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpChatTransport::new(&config_for(&server)).unwrap();
    assert_eq!(transport.create_session().await.unwrap(), "abc-123");
}

#[tokio::test]
async fn session_rejection_is_a_session_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot/session"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let transport = HttpChatTransport::new(&config_for(&server)).unwrap();
    assert!(matches!(
        transport.create_session().await,
        Err(ChatError::Session(_))
    ));
}

#[tokio::test]
async fn streamed_reply_is_decoded_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot/chat/stream"))
        .and(body_json(json!({
            "message": "이 법안은 무엇인가요?",
            "sessionId": "abc-123",
            "billId": 101
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(
                    "data:법안은 \n\ndata:~에 관한\\n내용입니다.\n\ndata:[DONE]\n\ndata:ignored\n",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = Arc::new(HttpChatTransport::new(&config_for(&server)).unwrap());
    let client = ChatStreamClient::new(transport);
    let events: Vec<_> = client
        .send_message_stream(request("abc-123"), CancellationToken::new())
        .collect()
        .await;
    assert_eq!(
        events,
        vec![
            ChatEvent::Chunk("법안은 ".into()),
            ChatEvent::Chunk("~에 관한\n내용입니다.".into()),
            ChatEvent::Complete,
        ]
    );
}

#[tokio::test]
async fn server_error_surfaces_status_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot/chat/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let transport = Arc::new(HttpChatTransport::new(&config_for(&server)).unwrap());
    let client = ChatStreamClient::new(transport);
    let events: Vec<_> = client
        .send_message_stream(request("abc-123"), CancellationToken::new())
        .collect()
        .await;
    assert_eq!(
        events,
        vec![ChatEvent::Error(ChatError::Status {
            status: 500,
            body: "boom".into()
        })]
    );
}

#[tokio::test]
async fn missing_bill_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bills/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = ApiClient::new(&config_for(&server)).unwrap();
    match api.get_bill(999).await {
        Err(ApiError::NotFound { entity, id }) => {
            assert_eq!(entity, "bill");
            assert_eq!(id, "999");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn bill_pages_are_requested_with_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bills/search"))
        .and(query_param("keyword", "주택"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [bill_json(1, 3, 1, false)],
            "page": 0,
            "size": 9,
            "totalElements": 1,
            "totalPages": 1,
            "hasNext": false,
            "hasPrevious": false
        })))
        .mount(&server)
        .await;

    let api = ApiClient::new(&config_for(&server)).unwrap();
    let page = api.search_bills("주택", 0).await.unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].highlight(), "전세 보증금 보호 강화");
    assert_eq!(page.content[0].counts().total, 4);
}

#[tokio::test]
async fn meetings_follow_the_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/meetings"))
        .and(query_param("cursor", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meetings": [{"id": 29, "title": "제415회 본회의", "discussion_items": ["예산안"]}],
            "size": 1,
            "has_next": true,
            "next_cursor": 29,
            "total_count": 120
        })))
        .mount(&server)
        .await;

    let api = ApiClient::new(&config_for(&server)).unwrap();
    let page = api.meetings(Some(30), None).await.unwrap();
    assert_eq!(page.meetings[0].discussion_items, vec!["예산안"]);
    assert_eq!(page.next_cursor, Some(29));
}

#[tokio::test]
async fn vote_round_trip_records_locally_and_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bills/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_json(42, 11, 4, true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bills/42/votes/agree"))
        .and(query_param("n", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api: Arc<dyn BillBackend> = Arc::new(ApiClient::new(&config_for(&server)).unwrap());
    let service = VoteService::new(api, VoteGuard::new(Arc::new(MemoryStore::new())));
    let bill: domain::models::Bill = serde_json::from_value(bill_json(42, 10, 4, false)).unwrap();

    let mut tally = VoteTally::new(bill.counts());
    let fresh = service
        .cast_vote(&bill, VoteChoice::Agree, &mut tally)
        .await
        .unwrap()
        .unwrap();

    assert!(fresh.has_voted);
    assert_eq!(tally.pending(), None);
    assert_eq!(tally.displayed().agree, 11);
    assert_eq!(
        service.guard().get_vote_status(42),
        VoteStatus::voted(VoteChoice::Agree)
    );
    // Locked now, even against the stale bill the caller still holds.
    assert!(matches!(
        service.cast_vote(&bill, VoteChoice::Disagree, &mut tally).await,
        Err(VoteError::AlreadyVoted(42))
    ));
}

#[tokio::test]
async fn rejected_vote_rolls_back_and_leaves_no_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bills/42/votes/disagree"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api: Arc<dyn BillBackend> = Arc::new(ApiClient::new(&config_for(&server)).unwrap());
    let service = VoteService::new(api, VoteGuard::new(Arc::new(MemoryStore::new())));
    let bill: domain::models::Bill = serde_json::from_value(bill_json(42, 10, 4, false)).unwrap();

    let mut tally = VoteTally::new(bill.counts());
    let result = service.cast_vote(&bill, VoteChoice::Disagree, &mut tally).await;
    assert!(matches!(
        result,
        Err(VoteError::Backend(ApiError::Status { status: 500, .. }))
    ));
    assert_eq!(tally.displayed(), bill.counts());
    assert_eq!(service.guard().get_vote_status(42), VoteStatus::not_voted());
}
