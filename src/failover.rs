//! Candidate planning and the fallback loop
//!
//! A request is served by walking an ordered list of
//! (provider, model) candidates, one outbound call at a time, until
//! one returns non-empty text:
//!
//! `Init -> TryingCandidate(i) -> Success | TryingCandidate(i+1) | Exhausted`
//!
//! with `NoProvidersConfigured` when the list is empty before the
//! first call.

use std::sync::Arc;
use log::{debug, info, warn};

use crate::config::{ProvidersConfig, StudyConfig};
use crate::error::Error;
use crate::prompts::OCR_INSTRUCTION;
use crate::providers::CompletionProvider;
use crate::request::{ChatMessage, Completion, GenerationRequest, ImageInput};
use crate::{Modality, Provider};

pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const OPENROUTER_DEFAULT_MODEL: &str
  = "meta-llama/llama-3.1-70b-instruct";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Groq vision models, best first
pub const GROQ_VISION_MODELS: &[&str] = &[
    "meta-llama/llama-4-scout-17b-16e-instruct"
  , "llama-3.2-90b-vision-preview"
  , "llama-3.2-11b-vision-preview"
];

/// Tried after the configured Gemini model
pub const GEMINI_FALLBACK_MODELS: &[&str] = &[
    "gemini-1.5-flash"
  , "gemini-1.5-pro"
  , "gemini-pro-vision"
];

/// Conversation models, tried after the configured Groq model
pub const GROQ_CHAT_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile"
  , "llama-3.1-70b-versatile"
  , "mixtral-8x7b-32768"
];

/// Models used to transcribe uploaded handwriting
pub const GROQ_OCR_MODELS: &[&str] = &[
    "llama-3.2-11b-vision-preview"
  , "llama-3.2-90b-vision-preview"
];

/// Key prefixes of the providers we talk to. A model override
/// starting with one of these is a key pasted into the wrong
/// variable.
pub const CREDENTIAL_PREFIXES: &[&str] = &["gsk_", "sk-or-", "sk-", "AIza"];

/// Error-body fragments meaning "this model id is gone"
pub const MODEL_UNAVAILABLE_MARKERS: &[&str] = &[
    "model_decommissioned"
  , "no longer supported"
  , "model_not_found"
];

pub fn looks_like_credential(value: &str) -> bool
{   CREDENTIAL_PREFIXES.iter().any(|p| value.starts_with(p))
}

/// Trim a model override and drop it when blank or when it looks
/// like an API key.
///
/// This is a workaround for misconfigured deployments, not a
/// validation of model names.
pub fn sanitize_model_override(raw: Option<&str>) -> Option<String>
{   let model = raw.map(str::trim).filter(|m| !m.is_empty())?;
    if looks_like_credential(model)
    {   warn!("Ignoring model override that looks like an API key");
        return None;
    }
    Some(model.to_string())
}

/// Whether a provider failure says the requested model id no longer
/// exists. Matches on upstream error wording, so keep every use of
/// the heuristic behind this function.
pub fn is_model_unavailable(err: &Error) -> bool
{   match err
    {   Error::ApiError { body, .. } => {
          MODEL_UNAVAILABLE_MARKERS.iter().any(|m| body.contains(m))
        }
      , _ => false
    }
}

/// A (provider, model) pair the router may attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCandidate
{   pub provider: Provider
  , pub model: String
  , pub supports_images: bool
  , /// Position in the chain, 0 first
    pub priority: usize
  , /// Same-provider model tried once if `model` is reported
    /// unavailable
    pub fallback_model: Option<String>
}

/// Ordered candidates and a cursor
#[derive(Debug, Clone)]
pub struct FailoverSequence
{   pub candidates: Vec<ProviderCandidate>
  , pub current_index: usize
}

impl FailoverSequence
{   /// Create a new failover sequence; priorities follow list order
    pub fn new(
      mut candidates: Vec<ProviderCandidate>
    ) -> Self
    {   debug!(
          "Creating failover sequence with {} candidates",
          candidates.len()
        );
        for (i, c) in candidates.iter_mut().enumerate()
        {   c.priority = i;
        }
        FailoverSequence
        {   candidates
          , current_index: 0
        }
    }

    /// Get the current candidate
    pub fn current(&self) -> Option<&ProviderCandidate>
    {   self.candidates.get(self.current_index)
    }

    /// Move to the next candidate
    pub fn advance(&mut self) -> Option<&ProviderCandidate>
    {   self.current_index += 1;
        self.current()
    }

    /// Check if we have more candidates to try
    pub fn has_next(&self) -> bool
    {   self.current_index + 1 < self.candidates.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.candidates.is_empty()
    }

    pub fn len(&self) -> usize
    {   self.candidates.len()
    }
}

fn candidate(
  provider: Provider
, model: impl Into<String>
, supports_images: bool
) -> ProviderCandidate
{   ProviderCandidate
    {   provider
      , model: model.into()
      , supports_images
      , priority: 0
      , fallback_model: None
    }
}

/// Order-preserving de-duplication
fn dedup(models: Vec<String>) -> Vec<String>
{   let mut seen: Vec<String> = Vec::with_capacity(models.len());
    for m in models
    {   if !seen.contains(&m)
        {   seen.push(m);
        }
    }
    seen
}

/// Text chain: Groq (override or default, with a one-shot default
/// retry when the override is gone), then OpenRouter.
pub fn plan_text(providers: &ProvidersConfig) -> Vec<ProviderCandidate>
{   let mut plan = vec![];
    if providers.groq.is_configured()
    {   let configured = sanitize_model_override(
          providers.groq.model.as_deref()
        );
        let mut c = candidate(
          Provider::Groq
        , configured.clone().unwrap_or_else(|| GROQ_DEFAULT_MODEL.to_string())
        , false
        );
        if configured.as_deref().is_some_and(|m| m != GROQ_DEFAULT_MODEL)
        {   c.fallback_model = Some(GROQ_DEFAULT_MODEL.to_string());
        }
        plan.push(c);
    }
    if providers.openrouter.is_configured()
    {   let model = sanitize_model_override(
          providers.openrouter.model.as_deref()
        ).unwrap_or_else(|| OPENROUTER_DEFAULT_MODEL.to_string());
        plan.push(candidate(Provider::OpenRouter, model, false));
    }
    plan
}

/// Vision chain: every Groq vision model, then Gemini. Gemini only
/// takes inline images, so it is skipped for remote URLs.
pub fn plan_vision(
  providers: &ProvidersConfig
, image: &ImageInput
) -> Vec<ProviderCandidate>
{   let mut plan = vec![];
    if providers.groq.is_configured()
    {   plan.extend(
          GROQ_VISION_MODELS.iter()
            .map(|m| candidate(Provider::Groq, *m, true))
        );
    }
    if providers.google.is_configured() && image.is_inline()
    {   let first = sanitize_model_override(
          providers.google.model.as_deref()
        ).unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string());
        let mut models = vec![first];
        models.extend(GEMINI_FALLBACK_MODELS.iter().map(|m| m.to_string()));
        plan.extend(
          dedup(models).into_iter()
            .map(|m| candidate(Provider::Google, m, true))
        );
    }
    plan
}

/// Conversation chain: Groq only
pub fn plan_chat(providers: &ProvidersConfig) -> Vec<ProviderCandidate>
{   if !providers.groq.is_configured()
    {   return vec![];
    }
    let mut models = vec![];
    if let Some(m) = sanitize_model_override(providers.groq.model.as_deref())
    {   models.push(m);
    }
    models.extend(GROQ_CHAT_MODELS.iter().map(|m| m.to_string()));
    dedup(models).into_iter()
      .map(|m| candidate(Provider::Groq, m, false))
      .collect()
}

/// Handwriting OCR chain: Groq vision models with a fetchable URL
pub fn plan_ocr(providers: &ProvidersConfig) -> Vec<ProviderCandidate>
{   if !providers.groq.is_configured()
    {   return vec![];
    }
    GROQ_OCR_MODELS.iter()
      .map(|m| candidate(Provider::Groq, *m, true))
      .collect()
}

const TEXT_HINT: &str
  = "Add one or more of: GROQ_API_KEY (text), OPENROUTER_API_KEY (text).";
const VISION_HINT: &str
  = "Image requests require a vision-capable model. Add GROQ_API_KEY, \
     or GOOGLE_GENERATIVE_AI_API_KEY for inline images.";
const CHAT_HINT: &str = "Add GROQ_API_KEY to enable chat.";
const OCR_HINT: &str = "Image OCR requires GROQ_API_KEY.";

/// Routes requests across providers, falling back on failure
#[derive(Clone)]
pub struct FallbackRouter
{   providers: ProvidersConfig
  , adapter: Arc<dyn CompletionProvider>
}

impl FallbackRouter
{   pub fn new(
      config: &StudyConfig
    , adapter: Arc<dyn CompletionProvider>
    ) -> Self
    {   FallbackRouter
        {   providers: config.providers.clone()
          , adapter
        }
    }

    /// Candidate chain for a feature request, by modality
    pub fn candidates_for(
      &self
    , request: &GenerationRequest
    ) -> Vec<ProviderCandidate>
    {   match &request.image
        {   Some(image) => plan_vision(&self.providers, image)
          , None => plan_text(&self.providers)
        }
    }

    /// Serve a feature request
    pub async fn route(
      &self
    , request: &GenerationRequest
    ) -> Result<Completion, Error>
    {   let modality = request.modality();
        let (messages, hint) = match modality
        {   Modality::Image => (request.vision_messages(), VISION_HINT)
          , Modality::Text => (request.text_messages(), TEXT_HINT)
        };
        debug!(
          "Routing {} ({:?})",
          request.feature_key, modality
        );
        let candidates = self.candidates_for(request);
        if candidates.is_empty()
          && self.providers.google.is_configured()
          && request.image.as_ref().is_some_and(|i| !i.is_inline())
        {   warn!("Remote image URL with only Gemini configured");
            return Err(Error::UnsupportedImage(
              "Gemini needs an inline data URL; set GROQ_API_KEY \
               to send image URLs".to_string()
            ));
        }
        self.run(
          FailoverSequence::new(candidates)
        , &messages
        , request.image.as_ref()
        , hint
        ).await
    }

    /// Serve a conversation turn
    pub async fn route_chat(
      &self
    , messages: &[ChatMessage]
    ) -> Result<Completion, Error>
    {   self.run(
          FailoverSequence::new(plan_chat(&self.providers))
        , messages
        , None
        , CHAT_HINT
        ).await
    }

    /// Transcribe an image reachable at `image_url`
    pub async fn route_ocr(
      &self
    , image_url: &str
    ) -> Result<Completion, Error>
    {   let image = ImageInput::Url(image_url.to_string());
        self.run(
          FailoverSequence::new(plan_ocr(&self.providers))
        , &[ChatMessage::user(OCR_INSTRUCTION)]
        , Some(&image)
        , OCR_HINT
        ).await
    }

    async fn run(
      &self
    , mut sequence: FailoverSequence
    , messages: &[ChatMessage]
    , image: Option<&ImageInput>
    , hint: &str
    ) -> Result<Completion, Error>
    {   if sequence.is_empty()
        {   warn!("No provider configured for request: {}", hint);
            return Err(Error::NoProvidersConfigured(hint.to_string()));
        }

        let mut attempts = 0;
        let mut last_error = Error::EmptyCompletion;

        while let Some(candidate) = sequence.current().cloned()
        {   attempts += 1;
            let result = self.attempt(
              &candidate, &candidate.model, messages, image
            ).await;
            match result
            {   Ok(completion) => {
                  info!(
                    "Served by {}:{} after {} attempt(s)",
                    completion.provider, completion.model, attempts
                  );
                  return Ok(completion);
                }
              , Err(e) if !e.is_retryable() => return Err(e)
              , Err(e) => {
                  last_error = e;
                }
            }

            if is_model_unavailable(&last_error)
            {   if let Some(fallback) = candidate.fallback_model.as_deref()
                {   info!(
                      "Retrying {} with default model {}",
                      candidate.provider, fallback
                    );
                    attempts += 1;
                    let retried = self.attempt(
                      &candidate, fallback, messages, image
                    ).await;
                    match retried
                    {   Ok(completion) => {
                          info!(
                            "Served by {}:{} after {} attempt(s)",
                            completion.provider, completion.model, attempts
                          );
                          return Ok(completion);
                        }
                      , Err(e) if !e.is_retryable() => return Err(e)
                      , Err(e) => {
                          last_error = e;
                        }
                    }
                }
            }

            if sequence.advance().is_none()
            {   break;
            }
        }

        warn!("All {} attempts failed: {}", attempts, last_error);
        Err(Error::Exhausted
        {   attempts
          , last: Box::new(last_error)
        })
    }

    async fn attempt(
      &self
    , candidate: &ProviderCandidate
    , model: &str
    , messages: &[ChatMessage]
    , image: Option<&ImageInput>
    ) -> Result<Completion, Error>
    {   debug!(
          "Trying candidate #{} {}:{}",
          candidate.priority, candidate.provider, model
        );
        let result = self.adapter
          .invoke(candidate.provider, model, messages, image)
          .await;
        if let Err(e) = &result
        {   warn!("{}:{} failed: {}", candidate.provider, model, e);
        }
        result
    }
}
