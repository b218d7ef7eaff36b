//! OpenAI-compatible chat-completions adapter (Groq, OpenRouter)

use serde::{Deserialize, Serialize};
use log::{debug, trace, warn};

use crate::error::Error;
use crate::request::{ChatMessage, ImageInput, Role};
use crate::Provider;

/// Sent to OpenRouter for app attribution
pub const OPENROUTER_TITLE: &str = "AI Study Suite";
pub const OPENROUTER_REFERER: &str = "https://v0.app";

/// Completion budget for Groq text calls. Without it some models
/// answer with an empty message.
pub const GROQ_TEXT_MAX_TOKENS: usize = 4096;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart
{   Text { text: String }
  , ImageUrl { image_url: ImageUrl }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageUrl
{   pub url: String
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent
{   Text(String)
  , Parts(Vec<ContentPart>)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WireMessage
{   pub role: Role
  , pub content: MessageContent
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<WireMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , /// Legacy completions shape
    #[serde(default)]
    pub text: Option<String>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

/// Convert router messages to the wire shape. With an image, the
/// last user turn becomes `[text, image_url]` content parts.
pub fn build_messages(
  messages: &[ChatMessage]
, image: Option<&ImageInput>
) -> Vec<WireMessage>
{   let mut wire: Vec<WireMessage> = messages.iter()
      .map(|m| WireMessage
      {   role: m.role
        , content: MessageContent::Text(m.content.clone())
      })
      .collect();

    if let Some(image) = image
    {   let image_part = ContentPart::ImageUrl
        {   image_url: ImageUrl { url: image.as_url().to_string() }
        };
        match wire.iter().rposition(|m| m.role == Role::User)
        {   Some(idx) => {
              let text = match &wire[idx].content
              {   MessageContent::Text(t) => t.clone()
                , MessageContent::Parts(_) => String::new()
              };
              wire[idx].content = MessageContent::Parts(vec![
                ContentPart::Text { text }
              , image_part
              ]);
            }
          , None => wire.push(WireMessage
            {   role: Role::User
              , content: MessageContent::Parts(vec![image_part])
            })
        }
    }
    wire
}

/// First choice's text; a missing or blank text is an empty completion
pub fn extract_text(
  response: ChatCompletionResponse
) -> Result<String, Error>
{   let choice = response.choices.into_iter().next()
      .ok_or(Error::EmptyCompletion)?;
    trace!("finish_reason: {:?}", choice.finish_reason);
    let text = choice.message
      .and_then(|m| m.content)
      .or(choice.text)
      .unwrap_or_default();
    if text.trim().is_empty()
    {   return Err(Error::EmptyCompletion);
    }
    Ok(text)
}

pub fn build_request(
  provider: Provider
, model: &str
, messages: &[ChatMessage]
, image: Option<&ImageInput>
) -> ChatCompletionRequest
{   ChatCompletionRequest
    {   model: model.to_string()
      , messages: build_messages(messages, image)
      , max_tokens: match (provider, image)
        {   (Provider::Groq, None) => Some(GROQ_TEXT_MAX_TOKENS)
          , _ => None
        }
      , temperature: match provider
        {   Provider::Groq => Some(0.7)
          , _ => None
        }
      , stream: Some(false)
    }
}

/// Single chat-completions call
pub async fn complete(
  http_client: &reqwest::Client
, provider: Provider
, api_base: &str
, api_key: &str
, model: &str
, messages: &[ChatMessage]
, image: Option<&ImageInput>
) -> Result<String, Error>
{   let request = build_request(provider, model, messages, image);
    trace!(
      "{} request for {}: {} messages",
      provider, model, request.messages.len()
    );

    let mut builder = http_client
      .post(format!("{}/chat/completions", api_base))
      .header("Authorization", format!("Bearer {}", api_key))
      .header("Content-Type", "application/json");
    if provider == Provider::OpenRouter
    {   builder = builder
          .header("HTTP-Referer", OPENROUTER_REFERER)
          .header("X-Title", OPENROUTER_TITLE);
    }

    let response = builder
      .json(&request)
      .send()
      .await
      .map_err(|e| {
        warn!("{} transport error: {}", provider, e);
        Error::from(e)
      })?;

    let status = response.status();
    trace!("{} response status: {}", provider, status);

    if !status.is_success()
    {   return Err(super::api_error(provider.as_str(), response).await);
    }

    let chat_response: ChatCompletionResponse
      = response.json().await.map_err(|e| {
        warn!("{} parse error: {}", provider, e);
        Error::ParseError(e.to_string())
      })?;

    let text = extract_text(chat_response)?;
    debug!("{}:{} returned {} chars", provider, model, text.len());
    Ok(text)
}
