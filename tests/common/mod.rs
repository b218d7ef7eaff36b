#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use studyrouter::config::{ProviderConfig, StudyConfig};
use studyrouter::providers::CompletionProvider;
use studyrouter::{ChatMessage, Completion, Error, ImageInput, Provider};

type Script = dyn Fn(Provider, &str) -> Result<String, Error> + Send + Sync;

/// In-process provider answering from a closure and recording
/// every (provider, model) it was asked for
pub struct ScriptedProvider
{   script: Box<Script>
  , calls: Mutex<Vec<(Provider, String, bool)>>
}

impl ScriptedProvider
{   pub fn new<F>(script: F) -> Arc<Self>
    where F: Fn(Provider, &str) -> Result<String, Error> + Send + Sync + 'static
    {   Arc::new(ScriptedProvider
        {   script: Box::new(script)
          , calls: Mutex::new(vec![])
        })
    }

    /// Provider that answers `text` for everything
    pub fn always(text: &'static str) -> Arc<Self>
    {   Self::new(move |_, _| Ok(text.to_string()))
    }

    pub fn calls(&self) -> Vec<(Provider, String)>
    {   self.calls.lock().unwrap()
          .iter()
          .map(|(p, m, _)| (*p, m.clone()))
          .collect()
    }

    pub fn calls_to(&self, provider: Provider) -> usize
    {   self.calls.lock().unwrap()
          .iter()
          .filter(|(p, _, _)| *p == provider)
          .count()
    }

    pub fn saw_image(&self) -> bool
    {   self.calls.lock().unwrap().iter().any(|(_, _, img)| *img)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider
{   async fn invoke(
      &self
    , provider: Provider
    , model: &str
    , _messages: &[ChatMessage]
    , image: Option<&ImageInput>
    ) -> Result<Completion, Error>
    {   self.calls.lock().unwrap()
          .push((provider, model.to_string(), image.is_some()));
        let text = (self.script)(provider, model)?;
        if text.trim().is_empty()
        {   return Err(Error::EmptyCompletion);
        }
        Ok(Completion
        {   text
          , provider
          , model: model.to_string()
        })
    }
}

pub fn config_with(
  groq: bool
, openrouter: bool
, google: bool
) -> StudyConfig
{   let mut config = StudyConfig::default();
    if groq
    {   config.providers.groq = ProviderConfig::with_key("test-groq");
    }
    if openrouter
    {   config.providers.openrouter = ProviderConfig::with_key("test-openrouter");
    }
    if google
    {   config.providers.google = ProviderConfig::with_key("test-google");
    }
    config
}

pub fn decommissioned() -> Error
{   Error::ApiError
    {   status: 400
      , body: r#"{"error":{"message":"The model `llama3-70b-8192` has been decommissioned","code":"model_decommissioned"}}"#.to_string()
    }
}

pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";
