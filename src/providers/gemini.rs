//! Google Gemini `generateContent` adapter

use serde::{Deserialize, Serialize};
use log::{debug, trace, warn};

use crate::error::Error;
use crate::request::{ChatMessage, ImageInput, Role};

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>
}

impl Part
{   fn text(text: impl Into<String>) -> Self
    {   Part { text: Some(text.into()), inline_data: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineData
{   pub mime_type: String
  , pub data: String
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate
{   #[serde(default)]
    pub content: Option<Content>
}

/// Map chat messages onto contents/parts. System turns are folded
/// into `system_instruction`, assistant turns become role `model`,
/// and an inline image is appended to the last user turn.
pub fn build_request(
  messages: &[ChatMessage]
, image: Option<&ImageInput>
) -> Result<GenerateContentRequest, Error>
{   let inline = match image
    {   Some(img) => {
          let data = img.base64_data().ok_or_else(|| {
            Error::UnsupportedImage(
              "Gemini needs an inline base64 data URL".to_string()
            )
          })?;
          Some(InlineData
          {   mime_type: img.mime_type().to_string()
            , data: data.to_string()
          })
        }
      , None => None
    };

    let system: Vec<Part> = messages.iter()
      .filter(|m| m.role == Role::System)
      .map(|m| Part::text(m.content.clone()))
      .collect();

    let mut contents: Vec<Content> = messages.iter()
      .filter(|m| m.role != Role::System)
      .map(|m| Content
      {   role: Some(match m.role
          {   Role::Assistant => "model".to_string()
            , _ => "user".to_string()
          })
        , parts: vec![Part::text(m.content.clone())]
      })
      .collect();

    if let Some(inline_data) = inline
    {   let part = Part { text: None, inline_data: Some(inline_data) };
        match contents.iter()
          .rposition(|c| c.role.as_deref() == Some("user"))
        {   Some(idx) => contents[idx].parts.push(part)
          , None => contents.push(Content
            {   role: Some("user".to_string())
              , parts: vec![part]
            })
        }
    }

    Ok(GenerateContentRequest
    {   contents
      , system_instruction: if system.is_empty()
        {   None
        } else
        {   Some(Content { role: None, parts: system })
        }
    })
}

/// Join the first candidate's text parts with newlines
pub fn extract_text(
  response: GenerateContentResponse
) -> Result<String, Error>
{   let text = response.candidates.into_iter().next()
      .and_then(|c| c.content)
      .map(|content| {
        content.parts.into_iter()
          .filter_map(|p| p.text)
          .filter(|t| !t.is_empty())
          .collect::<Vec<_>>()
          .join("\n")
      })
      .unwrap_or_default();
    if text.trim().is_empty()
    {   return Err(Error::EmptyCompletion);
    }
    Ok(text)
}

/// Single generateContent call
pub async fn complete(
  http_client: &reqwest::Client
, api_base: &str
, api_key: &str
, model: &str
, messages: &[ChatMessage]
, image: Option<&ImageInput>
) -> Result<String, Error>
{   let request = build_request(messages, image)?;
    trace!(
      "gemini request for {}: {} contents",
      model, request.contents.len()
    );

    let response = http_client
      .post(format!("{}/models/{}:generateContent", api_base, model))
      .query(&[("key", api_key)])
      .header("Content-Type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| {
        // reqwest includes the URL, and with it the key
        let e = e.without_url();
        warn!("gemini transport error: {}", e);
        Error::from(e)
      })?;

    let status = response.status();
    trace!("gemini response status: {}", status);

    if !status.is_success()
    {   return Err(super::api_error("gemini", response).await);
    }

    let content_response: GenerateContentResponse
      = response.json().await.map_err(|e| {
        warn!("gemini parse error: {}", e.without_url());
        Error::ParseError("invalid generateContent body".to_string())
      })?;

    let text = extract_text(content_response)?;
    debug!("gemini:{} returned {} chars", model, text.len());
    Ok(text)
}
