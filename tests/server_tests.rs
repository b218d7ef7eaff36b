mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use studyrouter::client::{CHAT_SETUP_HINT, CHAT_UNAVAILABLE};
use studyrouter::providers::CompletionProvider;
use studyrouter::server;
use studyrouter::storage::ObjectStore;
use studyrouter::{Error, StudyClient};

use common::{config_with, ScriptedProvider};

fn app(
  groq: bool
, openrouter: bool
, provider: Arc<ScriptedProvider>
) -> Router
{   let adapter: Arc<dyn CompletionProvider> = provider;
    server::router(StudyClient::with_parts(
      config_with(groq, openrouter, false)
    , adapter
    , None
    ))
}

struct FixedStore;

#[async_trait]
impl ObjectStore for FixedStore
{   async fn store(
      &self
    , _bytes: Vec<u8>
    , _content_type: &str
    ) -> Result<String, Error>
    {   Ok("https://proj.supabase.co/storage/v1/object/public/handwriting/a.png".to_string())
    }
}

fn upload_app(
  groq: bool
, provider: Arc<ScriptedProvider>
) -> Router
{   let adapter: Arc<dyn CompletionProvider> = provider;
    let store: Arc<dyn ObjectStore> = Arc::new(FixedStore);
    server::router(StudyClient::with_parts(
      config_with(groq, false, false)
    , adapter
    , Some(store)
    ))
}

fn image_upload() -> Request<Body>
{   let boundary = "XBOUNDARY";
    let body = format!(
      "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
       Content-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
      b = boundary
    );
    Request::builder()
      .method("POST")
      .uri("/upload")
      .header(
        header::CONTENT_TYPE
      , format!("multipart/form-data; boundary={}", boundary)
      )
      .body(Body::from(body))
      .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body>
{   Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
}

fn get(uri: &str) -> Request<Body>
{   Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>)
{   let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value)
{   let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_generate_success()
{   let app = app(true, false, ScriptedProvider::always("4"));
    let (status, body) = send_json(
      app
    , post_json("/generate", r#"{"featureKey":"mathSolver","userInput":"2+2"}"#)
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "4");
    assert_eq!(body["provider"], "groq");
    assert_eq!(body["model"], "llama-3.3-70b-versatile");
}

#[tokio::test]
async fn test_generate_validation_errors()
{   let provider = ScriptedProvider::always("unused");
    let (status, body) = send_json(
      app(true, false, provider.clone())
    , post_json("/generate", r#"{"userInput":"2+2"}"#)
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing featureKey" }));

    let (status, body) = send_json(
      app(true, false, provider.clone())
    , post_json("/generate", r#"{"featureKey":"nope","userInput":"x"}"#)
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid featureKey: nope");

    let (status, body) = send_json(
      app(true, false, provider.clone())
    , post_json("/generate", "{not json")
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_generate_without_providers_is_500()
{   let (status, body) = send_json(
      app(false, false, ScriptedProvider::always("unused"))
    , post_json("/generate", r#"{"featureKey":"mathSolver","userInput":"2+2"}"#)
    ).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("No AI providers configured."));
}

#[tokio::test]
async fn test_generate_exhausted_is_502_without_raw_body()
{   let provider = ScriptedProvider::new(|_, _| Err(Error::ApiError
    {   status: 500
      , body: "secret upstream trace".to_string()
    }));
    let (status, body) = send_json(
      app(true, true, provider)
    , post_json("/generate", r#"{"featureKey":"translator","userInput":"hola"}"#)
    ).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("2 attempts"));
    assert!(!message.contains("secret upstream trace"));
}

#[tokio::test]
async fn test_chat_reply()
{   let (status, body) = send_json(
      app(true, false, ScriptedProvider::always("Hi! How can I help?"))
    , post_json("/chat", r#"{"messages":[{"role":"user","content":"hey"}]}"#)
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["role"], "assistant");
    assert_eq!(body["message"]["content"], "Hi! How can I help?");
    assert!(body["message"]["id"].is_string());
    assert!(body.get("detail").is_none());
}

#[tokio::test]
async fn test_chat_without_groq_returns_setup_hint()
{   let (status, body) = send_json(
      app(false, true, ScriptedProvider::always("unused"))
    , post_json("/chat", "garbage")
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["content"], CHAT_SETUP_HINT);
}

#[tokio::test]
async fn test_chat_failure_is_an_apology()
{   let provider = ScriptedProvider::new(|_, _| Err(Error::Timeout));
    let (status, body) = send_json(
      app(true, false, provider.clone())
    , post_json("/chat", r#"{"messages":[]}"#)
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["content"], CHAT_UNAVAILABLE);
    assert!(body["detail"].as_str().unwrap().contains("Request timed out"));
    assert_eq!(provider.calls().len(), 3);
}

#[tokio::test]
async fn test_upload_without_file_field()
{   let boundary = "XBOUNDARY";
    let body = format!(
      "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
      b = boundary
    );
    let request = Request::builder()
      .method("POST")
      .uri("/upload")
      .header(
        header::CONTENT_TYPE
      , format!("multipart/form-data; boundary={}", boundary)
      )
      .body(Body::from(body))
      .unwrap();

    let (status, bytes) = send(app(true, false, ScriptedProvider::always("x")), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(bytes).unwrap(), "No file provided");
}

#[tokio::test]
async fn test_upload_rejects_non_images()
{   let boundary = "XBOUNDARY";
    let body = format!(
      "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
       Content-Type: text/plain\r\n\r\nhello\r\n--{b}--\r\n",
      b = boundary
    );
    let request = Request::builder()
      .method("POST")
      .uri("/upload")
      .header(
        header::CONTENT_TYPE
      , format!("multipart/form-data; boundary={}", boundary)
      )
      .body(Body::from(body))
      .unwrap();

    let (status, bytes) = send(app(true, false, ScriptedProvider::always("x")), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(bytes).unwrap(), "Only image files are supported");
}

#[tokio::test]
async fn test_health()
{   let (status, body) = send_json(
      app(false, false, ScriptedProvider::always("x"))
    , get("/health")
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_status_reports_presence_not_values()
{   let (status, bytes) = send(
      app(true, false, ScriptedProvider::always("x"))
    , get("/status")
    ).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    assert!(!text.contains("test-groq"));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["credentials"]["GROQ_API_KEY"], true);
    assert_eq!(body["credentials"]["OPENROUTER_API_KEY"], false);
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_upload_success()
{   let (status, body) = send_json(
      upload_app(true, ScriptedProvider::always("x + 1 = 3"))
    , image_upload()
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "x + 1 = 3");
    assert!(body["publicUrl"].as_str().unwrap().ends_with("/a.png"));
}

#[tokio::test]
async fn test_upload_without_groq_is_400()
{   let provider = ScriptedProvider::always("unused");
    let (status, bytes) = send(upload_app(false, provider.clone()), image_upload()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(bytes).unwrap().contains("GROQ_API_KEY"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_upload_ocr_failure_is_500()
{   let provider = ScriptedProvider::new(|_, _| Err(Error::EmptyCompletion));
    let (status, _) = send(upload_app(true, provider.clone()), image_upload()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(provider.calls().len(), 2);
}
