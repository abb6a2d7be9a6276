//! OpenAI-compatible provider against a wiremock server

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use folio::config::OpenAiConfig;
use folio::error::FolioError;
use folio::providers::{OpenAiProvider, Provider};

fn provider_for(server: &MockServer, api_key: Option<&str>) -> OpenAiProvider {
    let config = OpenAiConfig {
        api_base: format!("{}/v1", server.uri()),
        api_key: api_key.map(str::to_string),
        model: "gpt-test".to_string(),
        ..Default::default()
    };
    OpenAiProvider::new(config).expect("provider")
}

#[tokio::test]
async fn test_complete_prompt_sends_options_and_trims_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "max_tokens": 800,
            "stream": false,
            "messages": [
                {"role": "system", "content": "system text"},
                {"role": "user", "content": "user text"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  SELECT 1  "}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    let reply = provider
        .complete_prompt("system text", "user text", 0.1, 800)
        .await
        .unwrap();
    assert_eq!(reply, "SELECT 1");
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server, None);
    let err = provider
        .complete_prompt("s", "u", 0.5, 400)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FolioError>(),
        Some(FolioError::MissingCredentials(_))
    ));
}

#[tokio::test]
async fn test_unauthorized_maps_to_missing_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-wrong"));
    let err = provider.complete_prompt("s", "u", 0.5, 400).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FolioError>(),
        Some(FolioError::MissingCredentials(_))
    ));
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    let err = provider.complete_prompt("s", "u", 0.5, 400).await.unwrap_err();
    let folio = err.downcast_ref::<FolioError>().unwrap();
    assert!(matches!(folio, FolioError::Provider(_)));
    assert!(folio.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_empty_choices_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    assert!(provider.complete_prompt("s", "u", 0.5, 400).await.is_err());
}
