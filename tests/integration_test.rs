//! Integration tests for the project endpoints.
//!
//! File links and web pages are served by a local axum server; the vector
//! store is in memory and the model services are stubs, so no external
//! service is needed.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{header, Request, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

use project_rag::api;
use project_rag::config::Config;
use project_rag::llm::{ChatModel, CompletionRequest, Embedder, RerankResult, Reranker};
use project_rag::state::{AppState, Services};
use project_rag::vector::{InMemoryVectorStore, VectorStore};

const DIM: usize = 8;

// ─── Stub services ─────────────────────────────────────

struct ByteEmbedder;

#[async_trait]
impl Embedder for ByteEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0f32; DIM];
                for (i, b) in t.to_lowercase().bytes().enumerate() {
                    v[i % DIM] += b as f32;
                }
                v
            })
            .collect())
    }
}

/// Keeps the similarity order.
struct IdentityReranker;

#[async_trait]
impl Reranker for IdentityReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankResult>> {
        Ok((0..documents.len().min(top_n))
            .map(|index| RerankResult {
                index,
                score: 1.0 / (index + 1) as f32,
            })
            .collect())
    }
}

/// Answers with the context it was given.
#[derive(Default)]
struct EchoChat {
    models: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatModel for EchoChat {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.models.lock().push(request.model.clone());
        Ok(request.messages[0].content.clone())
    }
}

struct TestApp {
    app: Router,
    state: AppState,
    store: Arc<InMemoryVectorStore>,
    chat: Arc<EchoChat>,
}

fn test_app(max_project_pages: usize) -> TestApp {
    let mut config = Config::default();
    config.llm.embedding_dim = DIM;
    config.max_project_pages = max_project_pages;

    let store = Arc::new(InMemoryVectorStore::new());
    let chat = Arc::new(EchoChat::default());
    let services = Services {
        vector_store: store.clone(),
        embedder: Arc::new(ByteEmbedder),
        reranker: Arc::new(IdentityReranker),
        chat: chat.clone(),
    };
    let state = AppState::with_services(config, services, reqwest::Client::new());

    TestApp {
        app: api::router(state.clone()),
        state,
        store,
        chat,
    }
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, &body.to_string()).await
}

/// POST `body` verbatim as `application/json` and parse the reply as JSON.
async fn post_raw(app: &Router, path: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ─── Source server ─────────────────────────────────────

fn notes_text() -> String {
    let first: Vec<String> = (0..12)
        .map(|i| format!("Invoice {i} is due thirty days after the delivery date."))
        .collect();
    let second: Vec<String> = (0..12)
        .map(|i| format!("Support ticket {i} is answered within one business day."))
        .collect();
    format!("{}\n\n{}", first.join(" "), second.join(" "))
}

fn docx_bytes() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>The onboarding checklist has five steps.</w:t></w:r></w:p>
<w:p><w:r><w:t>Every new hire receives a laptop on day one.</w:t></w:r></w:p>
</w:body></w:document>"#,
    )
    .unwrap();
    zip.finish().unwrap().into_inner()
}

async fn page(Path(n): Path<usize>) -> Html<String> {
    Html(format!(
        r#"<html><head><title>Guide page {n}</title></head><body>
<nav><a href="/">Home</a></nav>
<article>
<p>Section {n} of the travel guide explains how to reach the old harbour, where ferries leave every hour, and which tickets are valid on weekends.</p>
<p>Visitors staying longer than three days should buy the regional pass, which also covers buses, trams, and the funicular railway.</p>
</article>
</body></html>"#
    ))
}

async fn spawn_source_server() -> String {
    let app = Router::new()
        .route(
            "/files/notes",
            get(|| async { ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], notes_text()) }),
        )
        .route(
            "/files/brief",
            get(|| async {
                (
                    [(
                        header::CONTENT_TYPE,
                        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                    )],
                    docx_bytes(),
                )
            }),
        )
        .route(
            "/files/picture",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8, b'P', b'N', b'G']) }),
        )
        .route(
            "/files/gone",
            get(|| async { StatusCode::NOT_FOUND.into_response() }),
        )
        .route("/pages/{n}", get(page));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn page_urls(base: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{base}/pages/{i}")).collect()
}

// ─── createAiPorject ───────────────────────────────────

#[tokio::test]
async fn test_create_project_from_text_file_link() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "type": "file",
            "fileLink": format!("{base}/files/notes"),
            "collectionName": "billing",
            "bestGuess": 0.2,
            "language": "en",
            "noOfPages": 0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Project created successfully");
    assert_eq!(body["noOfPages"], 1);

    assert_eq!(t.store.dimensions("billing"), Some(DIM));
    assert!(t.store.point_count("billing").unwrap() >= 3);
    assert_eq!(t.state.ledger_pages("billing"), 1);
}

#[tokio::test]
async fn test_create_project_from_docx_file_link() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "fileLink": format!("{base}/files/brief"),
            "collectionName": "hr"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["noOfPages"], 1);
    assert_eq!(t.store.point_count("hr"), Some(1));
}

#[tokio::test]
async fn test_create_project_from_urls() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "type": "url",
            "urls": page_urls(&base, 2),
            "collectionName": "travel",
            "noOfPages": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["noOfPages"], 2);
    assert!(t.store.point_count("travel").unwrap() >= 2);
}

#[tokio::test]
async fn test_page_limit_rejects_before_ingesting() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "type": "url",
            "urls": page_urls(&base, 21),
            "collectionName": "travel",
            "noOfPages": 480
        }),
    )
    .await;

    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        body,
        json!({"success": false, "message": "Assistant page limit reached"})
    );
    assert!(t.store.list_collections().await.unwrap().is_empty());
    assert_eq!(t.state.ledger_pages("travel"), 0);
}

#[tokio::test]
async fn test_page_limit_accepts_float_page_count() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "type": "url",
            "urls": page_urls(&base, 21),
            "collectionName": "travel",
            "noOfPages": 480.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED, "{body}");
    assert_eq!(body["message"], "Assistant page limit reached");

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "type": "url",
            "urls": page_urls(&base, 2),
            "collectionName": "travel",
            "noOfPages": 480.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["noOfPages"], 2);
}

#[tokio::test]
async fn test_create_project_unreadable_body() {
    let t = test_app(500);

    let (status, body) = post_raw(&t.app, "/api/v1/createAiPorject", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Invalid request body"})
    );

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({"type": "url", "urls": "https://example.com", "collectionName": "travel"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request body");
    assert!(t.store.list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_page_limit_counts_pages_ingested_by_this_process() {
    let base = spawn_source_server().await;
    let t = test_app(4);
    let request = json!({
        "type": "url",
        "urls": page_urls(&base, 3),
        "collectionName": "travel",
        "noOfPages": 0
    });

    let (status, _) = post_json(&t.app, "/api/v1/createAiPorject", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let stored = t.store.point_count("travel");

    // The caller still reports zero pages, but three are already stored.
    let (status, _) = post_json(&t.app, "/api/v1/createAiPorject", request).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(t.store.point_count("travel"), stored);
}

#[tokio::test]
async fn test_unsupported_download_is_415() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "fileLink": format!("{base}/files/picture"),
            "collectionName": "images"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);
    assert!(t.store.list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_download_is_500() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "fileLink": format!("{base}/files/gone"),
            "collectionName": "missing"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "message": "Something went wrong"})
    );
}

#[tokio::test]
async fn test_missing_collection_name_is_400() {
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({"type": "url", "urls": ["http://127.0.0.1:1/"]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "collectionName is required");
}

// ─── answerQuery ───────────────────────────────────────

#[tokio::test]
async fn test_answer_query_after_ingest() {
    let base = spawn_source_server().await;
    let t = test_app(500);

    let (status, _) = post_json(
        &t.app,
        "/api/v1/createAiPorject",
        json!({
            "fileLink": format!("{base}/files/notes"),
            "collectionName": "billing"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/answerQuery",
        json!({
            "type": "file",
            "filename": "notes.txt",
            "fileIndex": 0,
            "collectionName": "billing",
            "model": "gpt-4",
            "query": "When is an invoice due?"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.starts_with("Use the following pieces of context"));
    assert!(answer.contains("Invoice") || answer.contains("Support ticket"));
    assert_eq!(t.chat.models.lock().as_slice(), ["gpt-4".to_string()]);
}

#[tokio::test]
async fn test_answer_query_defaults_model() {
    let t = test_app(500);
    t.store.create_collection("empty", DIM).await.unwrap();

    let (status, body) = post_json(
        &t.app,
        "/api/v1/answerQuery",
        json!({"collectionName": "empty", "query": "anything?"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        t.chat.models.lock().as_slice(),
        [Config::default().llm.chat_model]
    );
}

#[tokio::test]
async fn test_answer_query_missing_collection() {
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/answerQuery",
        json!({"collectionName": "nope", "query": "Where is the harbour?"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": false}));
}

#[tokio::test]
async fn test_answer_query_without_query() {
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/answerQuery",
        json!({"collectionName": "billing"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": false}));
}

#[tokio::test]
async fn test_answer_query_unreadable_body() {
    let t = test_app(500);

    let (status, body) = post_raw(&t.app, "/api/v1/answerQuery", "{not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": false}));

    let (status, body) = post_json(
        &t.app,
        "/api/v1/answerQuery",
        json!({"collectionName": ["billing"], "query": "Who pays?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": false}));
    assert!(t.chat.models.lock().is_empty());
}

// ─── collection management ─────────────────────────────

#[tokio::test]
async fn test_delete_collection() {
    let t = test_app(500);
    t.store.create_collection("old", DIM).await.unwrap();
    t.state.add_pages("old", 7);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/collection/delete",
        json!({"collectionName": "old"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Collection deleted successfully"})
    );
    assert!(t.store.list_collections().await.unwrap().is_empty());
    assert_eq!(t.state.ledger_pages("old"), 0);
}

#[tokio::test]
async fn test_edit_collection_does_not_rename() {
    let t = test_app(500);
    t.store.create_collection("before", DIM).await.unwrap();

    let (status, body) = post_json(
        &t.app,
        "/api/v1/collection/edit",
        json!({"oldCollectionName": "before", "newCollectionName": "after"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("not supported"));
    assert_eq!(t.store.list_collections().await.unwrap(), vec!["before"]);
}

#[tokio::test]
async fn test_edit_collection_requires_both_names() {
    let t = test_app(500);

    let (status, body) = post_json(
        &t.app,
        "/api/v1/collection/edit",
        json!({"oldCollectionName": "before"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": false, "message": "newCollectionName is required"})
    );
}

#[tokio::test]
async fn test_edit_collection_unreadable_body() {
    let t = test_app(500);

    let (status, body) =
        post_raw(&t.app, "/api/v1/collection/edit", "oldCollectionName=a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request body");

    let (status, body) = post_json(
        &t.app,
        "/api/v1/collection/edit",
        json!({"oldCollectionName": "before", "newCollectionName": 7}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn test_delete_collection_unreadable_body() {
    let t = test_app(500);
    t.store.create_collection("keep", DIM).await.unwrap();

    let (status, body) =
        post_raw(&t.app, "/api/v1/collection/delete", r#"{"collectionName":"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": false, "message": "Invalid request body"})
    );

    let (status, body) = post_json(
        &t.app,
        "/api/v1/collection/delete",
        json!({"collectionName": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request body");
    assert_eq!(t.store.list_collections().await.unwrap(), vec!["keep"]);
}

#[tokio::test]
async fn test_delete_collection_without_name() {
    let t = test_app(500);

    let (status, body) = post_json(&t.app, "/api/v1/collection/delete", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": false, "message": "collectionName is required"})
    );
}
