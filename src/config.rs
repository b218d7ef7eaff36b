//! Configuration for providers, storage and the HTTP server
//!
//! Everything is read once at process start into a [`StudyConfig`]
//! and passed down explicitly; nothing below reads the environment.

use serde::{Deserialize, Serialize};
use log::{debug, warn};

use crate::Provider;

/// Default per-candidate timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API key; `None` means the provider is not configured
    pub api_key: Option<String>
  , /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Raw model override, sanitized later by the router
    pub model: Option<String>
}

impl ProviderConfig
{   pub fn with_key(key: impl Into<String>) -> Self
    {   ProviderConfig
        {   api_key: Some(key.into())
          , api_base: None
          , model: None
        }
    }

    pub fn is_configured(&self) -> bool
    {   self.api_key.is_some()
    }
}

/// Credentials for every provider the router can call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig
{   pub groq: ProviderConfig
  , pub openrouter: ProviderConfig
  , pub google: ProviderConfig
}

impl ProvidersConfig
{   pub fn get(&self, provider: Provider) -> &ProviderConfig
    {   match provider
        {   Provider::Groq => &self.groq
          , Provider::OpenRouter => &self.openrouter
          , Provider::Google => &self.google
        }
    }

    pub fn api_base(&self, provider: Provider) -> String
    {   self.get(provider).api_base.clone()
          .unwrap_or_else(|| provider.default_api_base().to_string())
          .trim_end_matches('/')
          .to_string()
    }
}

/// Supabase Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig
{   /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String
  , /// Service-role key used for bucket management and uploads
    pub service_key: String
  , /// Bucket receiving uploaded images
    pub bucket: String
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   pub host: String
  , pub port: u16
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   host: "127.0.0.1".to_string()
          , port: 8080
        }
    }
}

/// studyrouter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig
{   /// Provider credentials and overrides
    pub providers: ProvidersConfig
  , /// Object storage; `None` disables `/upload`
    pub storage: Option<StorageConfig>
  , /// Listener address
    pub server: ServerConfig
  , /// Per-candidate request timeout in seconds
    pub timeout_secs: u64
}

impl Default for StudyConfig
{   fn default() -> Self
    {   StudyConfig
        {   providers: ProvidersConfig::default()
          , storage: None
          , server: ServerConfig::default()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }
}

impl StudyConfig
{   /// Build configuration from the process environment
    pub fn from_env() -> Self
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
    {   let var = |name: &str| {
          lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let provider = |p: Provider| ProviderConfig
        {   api_key: var(p.api_key_var())
          , api_base: None
          , model: var(p.model_var())
        };

        let storage = match (
          var("SUPABASE_URL")
        , var("SUPABASE_SERVICE_ROLE_KEY")
        )
        {   (Some(url), Some(service_key)) => Some(StorageConfig
            {   url: url.trim_end_matches('/').to_string()
              , service_key
              , bucket: var("SUPABASE_BUCKET")
                  .unwrap_or_else(|| "handwriting".to_string())
            })
          , (Some(_), None) | (None, Some(_)) => {
              warn!(
                "Storage disabled: SUPABASE_URL and \
                 SUPABASE_SERVICE_ROLE_KEY must both be set"
              );
              None
            }
          , (None, None) => None
        };

        let timeout_secs = match var("STUDYROUTER_TIMEOUT_SECS")
        {   Some(raw) => match raw.parse::<u64>()
            {   Ok(secs) if secs > 0 => secs
              , _ => {
                  warn!(
                    "Ignoring invalid STUDYROUTER_TIMEOUT_SECS={:?}",
                    raw
                  );
                  DEFAULT_TIMEOUT_SECS
                }
            }
          , None => DEFAULT_TIMEOUT_SECS
        };

        let config = StudyConfig
        {   providers: ProvidersConfig
            {   groq: provider(Provider::Groq)
              , openrouter: provider(Provider::OpenRouter)
              , google: provider(Provider::Google)
            }
          , storage
          , server: ServerConfig::default()
          , timeout_secs
        };
        debug!(
          "Loaded config: groq={} openrouter={} google={} storage={}",
          config.providers.groq.is_configured(),
          config.providers.openrouter.is_configured(),
          config.providers.google.is_configured(),
          config.storage.is_some()
        );
        config
    }

    /// Which credentials are present, by environment variable name.
    /// Values are never exposed.
    pub fn credential_status(&self) -> Vec<(&'static str, bool)>
    {   vec![
          ( Provider::Groq.api_key_var()
          , self.providers.groq.is_configured()
          )
        , ( Provider::OpenRouter.api_key_var()
          , self.providers.openrouter.is_configured()
          )
        , ( Provider::Google.api_key_var()
          , self.providers.google.is_configured()
          )
        , ("SUPABASE_URL", self.storage.is_some())
        , ("SUPABASE_SERVICE_ROLE_KEY", self.storage.is_some())
        ]
    }
}
