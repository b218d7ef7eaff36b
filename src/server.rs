//! HTTP surface

use std::net::SocketAddr;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{debug, info, warn};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::client::StudyClient;
use crate::error::{Error, ErrorKind};
use crate::request::{
  ChatPayload, ErrorResponse, GeneratePayload, GenerateResponse,
};
use crate::storage::MAX_UPLOAD_BYTES;

/// Request body ceiling. Above the upload limit so oversized images
/// reach validation and get a readable error.
pub const BODY_LIMIT_BYTES: usize = 3 * MAX_UPLOAD_BYTES;

pub const ENDPOINTS: &[&str] = &[
    "/generate"
  , "/chat"
  , "/upload"
  , "/health"
  , "/status"
];

fn status_of(e: &Error) -> StatusCode
{   StatusCode::from_u16(e.http_status())
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// JSON `{ error }` body with the mapped status
struct JsonError(Error);

impl IntoResponse for JsonError
{   fn into_response(self) -> Response
    {   let body = ErrorResponse { error: self.0.user_message() };
        (status_of(&self.0), Json(body)).into_response()
    }
}

/// Plain-text body for `/upload`. A missing OCR key is the caller's
/// setup problem (400); every storage or model failure is a 500.
struct TextError(Error);

impl IntoResponse for TextError
{   fn into_response(self) -> Response
    {   let status = match (&self.0, self.0.kind())
        {   (Error::MissingApiKey(_), _)
          | (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST
          , _ => StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.0.user_message()).into_response()
    }
}

pub fn router(client: StudyClient) -> Router
{   Router::new()
      .route("/generate", post(generate_handler))
      .route("/chat", post(chat_handler))
      .route("/upload", post(upload_handler))
      .route("/health", get(health_handler))
      .route("/status", get(status_handler))
      .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
      .layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any)
      )
      .with_state(client)
}

pub async fn serve(
  client: StudyClient
, addr: SocketAddr
) -> Result<(), Error>
{   let app = router(client);
    let listener = tokio::net::TcpListener::bind(addr).await
      .map_err(|e| Error::Other(format!("bind {}: {}", addr, e)))?;
    info!("studyrouter listening on {}", addr);
    axum::serve(listener, app).await
      .map_err(|e| Error::Other(e.to_string()))
}

async fn generate_handler(
  State(client): State<StudyClient>
, body: Bytes
) -> Result<Json<GenerateResponse>, JsonError>
{   let payload: GeneratePayload = serde_json::from_slice(&body)
      .map_err(|e| {
        debug!("Bad generate body: {}", e);
        JsonError(Error::InvalidPayload("Invalid JSON body".to_string()))
      })?;

    let completion = client.generate(&payload).await
      .map_err(JsonError)?;
    Ok(Json(GenerateResponse
    {   output: completion.text
      , provider: completion.provider
      , model: completion.model
    }))
}

async fn chat_handler(
  State(client): State<StudyClient>
, body: Bytes
) -> Response
{   let payload: ChatPayload = serde_json::from_slice(&body)
      .unwrap_or_default();
    Json(client.chat(&payload).await).into_response()
}

async fn upload_handler(
  State(client): State<StudyClient>
, mut multipart: Multipart
) -> Result<Response, TextError>
{   let mut file = None;
    loop
    {   let field = multipart.next_field().await.map_err(|e| {
          warn!("Malformed multipart body: {}", e);
          TextError(Error::InvalidUpload(format!("Malformed upload: {}", e)))
        })?;
        let Some(field) = field else { break };
        if field.name() != Some("file")
        {   continue;
        }
        let content_type = field.content_type()
          .unwrap_or("application/octet-stream")
          .to_string();
        let bytes = field.bytes().await.map_err(|e| {
          TextError(Error::InvalidUpload(format!("Malformed upload: {}", e)))
        })?;
        file = Some((bytes.to_vec(), content_type));
        break;
    }

    let (bytes, content_type) = file.ok_or_else(|| {
      TextError(Error::InvalidUpload("No file provided".to_string()))
    })?;
    debug!("Upload of {} bytes ({})", bytes.len(), content_type);

    let receipt = client.upload(bytes, &content_type).await
      .map_err(TextError)?;
    Ok(Json(receipt).into_response())
}

async fn health_handler(
  State(client): State<StudyClient>
) -> impl IntoResponse
{   Json(json!({
      "status": "ok",
      "uptimeSecs": client.uptime().as_secs(),
      "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn status_handler(
  State(client): State<StudyClient>
) -> impl IntoResponse
{   let credentials: serde_json::Map<String, serde_json::Value>
      = client.config().credential_status()
        .into_iter()
        .map(|(name, present)| (name.to_string(), json!(present)))
        .collect();

    Json(json!({
      "name": env!("CARGO_PKG_NAME"),
      "version": env!("CARGO_PKG_VERSION"),
      "endpoints": ENDPOINTS,
      "providers": {
        "groq": "text (primary), vision (primary), chat, ocr",
        "openrouter": "text (fallback)",
        "google": "vision (fallback, inline images)",
      },
      "credentials": credentials,
      "uptimeSecs": client.uptime().as_secs(),
      "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
