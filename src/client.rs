use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};

use crate::config::StudyConfig;
use crate::error::Error;
use crate::failover::FallbackRouter;
use crate::normalize;
use crate::providers::{CompletionProvider, HttpProvider};
use crate::request::{
  ChatPayload, ChatReply, ChatReplyMessage, Completion,
  GeneratePayload, Role, UploadReceipt,
};
use crate::storage::{self, ObjectStore, SupabaseStorage};

pub const CHAT_SETUP_HINT: &str
  = "I'm almost ready! Please add GROQ_API_KEY to the server \
     environment and try again.";
pub const CHAT_UNAVAILABLE: &str
  = "I'm having trouble reaching the model right now. \
     Please try again shortly.";

struct ClientInner
{   config: StudyConfig
  , router: FallbackRouter
  , storage: Option<Arc<dyn ObjectStore>>
  , started: Instant
}

/// Entry point for every endpoint: normalizer, router and storage
/// behind one cheaply clonable handle.
#[derive(Clone)]
pub struct StudyClient
{   inner: Arc<ClientInner>
}

impl StudyClient
{   /// Wire the real HTTP adapter and, when configured, Supabase
    pub fn from_config(config: StudyConfig) -> Result<Self, Error>
    {   debug!("Creating StudyClient");
        let adapter: Arc<dyn CompletionProvider>
          = Arc::new(HttpProvider::new(&config)?);
        let storage = match &config.storage
        {   Some(storage_config) => {
              let store: Arc<dyn ObjectStore> = Arc::new(
                SupabaseStorage::new(
                  storage_config.clone()
                , config.timeout_secs
                )?
              );
              Some(store)
            }
          , None => None
        };
        Ok(Self::with_parts(config, adapter, storage))
    }

    pub fn with_parts(
      config: StudyConfig
    , adapter: Arc<dyn CompletionProvider>
    , storage: Option<Arc<dyn ObjectStore>>
    ) -> Self
    {   let router = FallbackRouter::new(&config, adapter);
        StudyClient
        {   inner: Arc::new(ClientInner
            {   config
              , router
              , storage
              , started: Instant::now()
            })
        }
    }

    pub fn config(&self) -> &StudyConfig
    {   &self.inner.config
    }

    pub fn router(&self) -> &FallbackRouter
    {   &self.inner.router
    }

    pub fn uptime(&self) -> Duration
    {   self.inner.started.elapsed()
    }

    /// Validate a feature request and route it
    pub async fn generate(
      &self
    , payload: &GeneratePayload
    ) -> Result<Completion, Error>
    {   let request = normalize::normalize_payload(payload)
          .map_err(|e| {
            debug!("Rejected generate payload: {}", e);
            e
          })?;
        self.inner.router.route(&request).await
    }

    /// One conversation turn. Failures become an assistant message
    /// rather than an error.
    pub async fn chat(&self, payload: &ChatPayload) -> ChatReply
    {   let messages = normalize::normalize_chat(payload.messages.as_ref());
        debug!("Chat turn with {} messages", messages.len());

        let reply = self.inner.router.route_chat(&messages).await;
        let (content, detail) = match reply
        {   Ok(completion) => (completion.text, None)
          , Err(Error::NoProvidersConfigured(_)) => {
              warn!("Chat requested without GROQ_API_KEY");
              (CHAT_SETUP_HINT.to_string(), None)
            }
          , Err(e) => {
              error!("Chat failed: {}", e);
              (CHAT_UNAVAILABLE.to_string(), Some(e.to_string()))
            }
        };

        ChatReply
        {   message: ChatReplyMessage
            {   id: chrono::Utc::now().timestamp_millis().to_string()
              , role: Role::Assistant
              , content
            }
          , detail
        }
    }

    /// Store an uploaded image and transcribe it
    pub async fn upload(
      &self
    , bytes: Vec<u8>
    , content_type: &str
    ) -> Result<UploadReceipt, Error>
    {   storage::validate_upload(bytes.len(), content_type)?;

        let store = self.inner.storage.as_ref().ok_or_else(|| {
          Error::InvalidConfiguration(
            "storage is not configured; set SUPABASE_URL and \
             SUPABASE_SERVICE_ROLE_KEY".to_string()
          )
        })?;
        if !self.inner.config.providers.groq.is_configured()
        {   return Err(Error::MissingApiKey("GROQ_API_KEY".to_string()));
        }

        let public_url = store.store(bytes, content_type).await?;
        let completion = self.inner.router.route_ocr(&public_url).await?;
        info!(
          "Transcribed {} via {}:{}",
          public_url, completion.provider, completion.model
        );
        Ok(UploadReceipt
        {   public_url
          , text: completion.text
        })
    }
}
