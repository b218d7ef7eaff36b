//! Provider adapters
//!
//! [`CompletionProvider`] is the seam between the fallback router and
//! the network. [`HttpProvider`] is the real implementation; tests
//! substitute scripted ones.

pub mod openai;
pub mod gemini;

use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};

use crate::config::{ProvidersConfig, StudyConfig};
use crate::error::Error;
use crate::request::{ChatMessage, Completion, ImageInput};
use crate::Provider;

/// One outbound completion call. Implementations must not retry;
/// retrying is the router's job.
#[async_trait]
pub trait CompletionProvider: Send + Sync
{   async fn invoke(
      &self
    , provider: Provider
    , model: &str
    , messages: &[ChatMessage]
    , image: Option<&ImageInput>
    ) -> Result<Completion, Error>;
}

/// Calls the hosted APIs over HTTPS
pub struct HttpProvider
{   http_client: reqwest::Client
  , providers: ProvidersConfig
}

impl HttpProvider
{   pub fn new(config: &StudyConfig) -> Result<Self, Error>
    {   debug!(
          "Creating HttpProvider with {}s timeout",
          config.timeout_secs
        );
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(HttpProvider
        {   http_client
          , providers: config.providers.clone()
        })
    }

    fn api_key(&self, provider: Provider) -> Result<&str, Error>
    {   self.providers.get(provider).api_key.as_deref()
          .ok_or_else(|| {
            Error::MissingApiKey(provider.api_key_var().to_string())
          })
    }
}

#[async_trait]
impl CompletionProvider for HttpProvider
{   async fn invoke(
      &self
    , provider: Provider
    , model: &str
    , messages: &[ChatMessage]
    , image: Option<&ImageInput>
    ) -> Result<Completion, Error>
    {   let api_key = self.api_key(provider)?;
        let api_base = self.providers.api_base(provider);
        debug!(
          "Invoking {}:{} (image: {})",
          provider, model, image.is_some()
        );

        let text = match provider
        {   Provider::Groq | Provider::OpenRouter => {
              openai::complete(
                &self.http_client
              , provider
              , &api_base
              , api_key
              , model
              , messages
              , image
              ).await?
            }
          , Provider::Google => {
              gemini::complete(
                &self.http_client
              , &api_base
              , api_key
              , model
              , messages
              , image
              ).await?
            }
        };

        Ok(Completion
        {   text
          , provider
          , model: model.to_string()
        })
    }
}

/// Read a failed response into an [`Error::ApiError`]
pub(crate) async fn api_error(
  provider: &str
, response: reqwest::Response
) -> Error
{   let status = response.status().as_u16();
    let body = response.text().await
      .unwrap_or_else(|_| "Unknown error".to_string());
    debug!("{} error body: {}", provider, body);
    Error::ApiError { status, body }
}
