//! Outbound provider tests against a local stub HTTP server.
//!
//! The stub records every request it receives and answers with a canned
//! status and body, so the real Tavily and Gemini clients can be exercised
//! end to end without leaving localhost.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use word_meaning::config::{GenerationConfig, SearchConfig};
use word_meaning::generation::{
    ClientFailure, CompletionClient, DisabledGenerator, GeminiGenerator, TextGenerator,
    GENERATION_FAILURE_MARKER,
};
use word_meaning::models::RelationType;
use word_meaning::search::{
    SearchProvider, SearchQuery, TavilySearch, WebSearchClient, SEARCH_FAILURE_MARKER,
};

// ─── Stub server ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct SeenRequest {
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    goog_api_key: Option<String>,
    body: Value,
}

struct Stub {
    status: StatusCode,
    body: String,
    seen: Mutex<Vec<SeenRequest>>,
}

async fn record(
    State(stub): State<Arc<Stub>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    stub.seen.lock().unwrap().push(SeenRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_str("authorization"),
        goog_api_key: header_str("x-goog-api-key"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
}

/// Starts a stub answering every request with `status` and `body`.
/// Returns its base URL and the shared request log.
async fn start_stub(status: StatusCode, body: &str) -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub {
        status,
        body: body.to_string(),
        seen: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(record).with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), stub)
}

fn search_config(base_url: &str, key_env: &str) -> SearchConfig {
    std::env::set_var(key_env, "tavily-test-key");
    SearchConfig {
        provider: "tavily".into(),
        base_url: base_url.to_string(),
        api_key_env: key_env.to_string(),
        timeout_secs: 5,
        ..SearchConfig::default()
    }
}

fn generation_config(base_url: &str, key_env: &str) -> GenerationConfig {
    std::env::set_var(key_env, "gemini-test-key");
    GenerationConfig {
        provider: "gemini".into(),
        base_url: base_url.to_string(),
        api_key_env: key_env.to_string(),
        timeout_secs: 5,
        ..GenerationConfig::default()
    }
}

// ─── Tavily ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tavily_sends_bearer_token_and_reads_content() {
    let (base_url, stub) = start_stub(
        StatusCode::OK,
        r#"{"results":[{"content":"الأول"},{"title":"no content"},{"content":"الثاني"}]}"#,
    )
    .await;
    let config = search_config(&base_url, "WM_TEST_TAVILY_KEY_OK");
    let provider = TavilySearch::new(&config).unwrap();

    let query = SearchQuery::for_word("سعيد", RelationType::Synonyms, &config);
    let snippets = provider.search(&query).await.unwrap();
    assert_eq!(snippets, vec!["الأول", "الثاني"]);

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/search");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tavily-test-key"));
    assert_eq!(
        seen[0].body,
        json!({
            "query": "ما synonyms كلمة سعيد",
            "search_depth": "basic",
            "include_answer": false,
            "max_results": 3
        })
    );
}

#[tokio::test]
async fn test_tavily_error_status_is_a_search_failure() {
    let (base_url, _stub) =
        start_stub(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"upstream down"}"#).await;
    let config = search_config(&base_url, "WM_TEST_TAVILY_KEY_500");
    let provider = Arc::new(TavilySearch::new(&config).unwrap());

    let query = SearchQuery::for_word("قلم", RelationType::Plural, &config);
    let err = provider.search(&query).await.unwrap_err().to_string();
    assert!(err.contains("Tavily API error 500"), "got {}", err);
    assert!(err.contains("upstream down"), "got {}", err);

    // A disabled generator would surface as a generation failure, so a
    // search failure here also shows generation was never attempted.
    let client = WebSearchClient::new(
        provider,
        CompletionClient::new(Arc::new(DisabledGenerator)),
        config,
    );
    let failure = client
        .search_and_generate("قلم", RelationType::Plural)
        .await
        .unwrap_err();
    assert!(matches!(failure, ClientFailure::Search(_)));
    let text = failure.to_string();
    assert!(text.starts_with(SEARCH_FAILURE_MARKER), "got {}", text);
    assert!(text.contains("Tavily API error 500"), "got {}", text);
}

// ─── Gemini ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_gemini_sends_key_header_and_joins_parts() {
    let (base_url, stub) = start_stub(
        StatusCode::OK,
        r#"{"candidates":[{"content":{"parts":[{"text":"مبت"},{"text":"هج"}],"role":"model"}}]}"#,
    )
    .await;
    let config = generation_config(&base_url, "WM_TEST_GEMINI_KEY_OK");
    let generator = GeminiGenerator::new(&config).unwrap();

    let text = generator.generate("prompt text").await.unwrap();
    assert_eq!(text, "مبتهج");

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].path,
        "/v1beta/models/gemini-2.5-flash:generateContent"
    );
    assert_eq!(seen[0].query, None);
    assert_eq!(seen[0].goog_api_key.as_deref(), Some("gemini-test-key"));
    assert_eq!(
        seen[0].body,
        json!({ "contents": [{ "parts": [{ "text": "prompt text" }] }] })
    );
}

#[tokio::test]
async fn test_gemini_error_status_is_a_generation_failure() {
    let (base_url, _stub) =
        start_stub(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"quota exceeded"}"#).await;
    let config = generation_config(&base_url, "WM_TEST_GEMINI_KEY_429");
    let generator = Arc::new(GeminiGenerator::new(&config).unwrap());

    let err = generator.generate("prompt").await.unwrap_err().to_string();
    assert!(err.contains("Gemini API error 429"), "got {}", err);
    assert!(err.contains("quota exceeded"), "got {}", err);

    let failure = CompletionClient::new(generator)
        .complete("سعيد", "", RelationType::Synonyms)
        .await
        .unwrap_err();
    assert!(matches!(failure, ClientFailure::Generation(_)));
    let text = failure.to_string();
    assert!(text.starts_with(GENERATION_FAILURE_MARKER), "got {}", text);
    assert!(text.contains("Gemini API error 429"), "got {}", text);
}

#[tokio::test]
async fn test_gemini_reply_without_candidates_is_an_error() {
    let (base_url, _stub) = start_stub(StatusCode::OK, r#"{"candidates":[]}"#).await;
    let config = generation_config(&base_url, "WM_TEST_GEMINI_KEY_EMPTY");
    let generator = GeminiGenerator::new(&config).unwrap();

    let err = generator.generate("prompt").await.unwrap_err().to_string();
    assert!(err.contains("missing candidate parts"), "got {}", err);
}
