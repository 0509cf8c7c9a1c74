use super::*;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {
                "parts": [{"text": text}],
                "role": "model"
            },
            "finishReason": "STOP"
        }]
    }))
}

fn provider_for(server: &MockServer) -> GeminiProvider {
    GeminiProvider::with_base_url(
        "test_key".to_string(),
        "gemini-2.0-flash".to_string(),
        server.uri(),
    )
}

#[tokio::test]
async fn send_returns_reply_and_appends_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(text_response("Hello! How can I help you?"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut history = ChatHistory::new();
    let reply = provider.send(&mut history, "Hi").await.unwrap();

    assert_eq!(reply, "Hello! How can I help you?");
    assert_eq!(history.len(), 2);
    assert_eq!(history.turns[0].role, "user");
    assert_eq!(history.turns[0].text, "Hi");
    assert_eq!(history.turns[1].role, "model");
    assert_eq!(history.turns[1].text, "Hello! How can I help you?");
}

#[tokio::test]
async fn send_includes_prior_history_in_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "first"}]},
                {"role": "model", "parts": [{"text": "first reply"}]},
                {"role": "user", "parts": [{"text": "second"}]}
            ]
        })))
        .respond_with(text_response("second reply"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut history = ChatHistory::new();
    history.push(Turn::user("first"));
    history.push(Turn::model("first reply"));

    let reply = provider.send(&mut history, "second").await.unwrap();
    assert_eq!(reply, "second reply");
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn failed_send_leaves_history_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "Internal error"}
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut history = ChatHistory::new();
    let result = provider.send(&mut history, "Hi").await;

    assert!(result.is_err());
    assert!(history.is_empty());
}

#[tokio::test]
async fn api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "API key not valid"}
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut history = ChatHistory::new();
    let err = provider.send(&mut history, "Hi").await.unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("400"), "Error: {}", msg);
    assert!(msg.contains("API key not valid"), "Error: {}", msg);
}

#[tokio::test]
async fn generate_once_sends_inline_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(text_response("A small test image."))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let attachment = Attachment {
        name: "pic.png".to_string(),
        mime: "image/png".to_string(),
        bytes: vec![1, 2, 3, 4],
        width: 1,
        height: 1,
    };

    let reply = provider
        .generate_once(&attachment, "What is this?")
        .await
        .unwrap();
    assert_eq!(reply, "A small test image.");

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
    assert_eq!(parts[1]["text"], "What is this?");
}

#[tokio::test]
async fn set_model_changes_request_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-pro:generateContent"))
        .respond_with(text_response("From the new model."))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    provider.set_model("gemini-2.5-pro".to_string());
    assert_eq!(provider.model_name(), "gemini-2.5-pro");

    let mut history = ChatHistory::new();
    let reply = provider.send(&mut history, "Hi").await.unwrap();
    assert_eq!(reply, "From the new model.");
}

#[tokio::test]
async fn response_without_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut history = ChatHistory::new();
    let err = provider.send(&mut history, "Hi").await.unwrap_err();
    assert!(err.to_string().contains("No candidates"));
}
