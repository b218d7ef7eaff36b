//! Inbound payload validation
//!
//! Pure functions: no I/O, no logging above `trace`.

use log::trace;
use serde_json::Value;

use crate::error::Error;
use crate::prompts;
use crate::request::{
  ChatMessage, GeneratePayload, GenerationRequest, ImageInput, Role,
};

/// Greeting used when a chat payload carries no messages
pub const DEFAULT_CHAT_OPENER: &str = "Hello!";

/// Validate a feature request.
///
/// The feature key is trimmed and resolved exactly, then through the
/// lower-cased alias table. The image counts as present only when it
/// is a non-empty string.
pub fn normalize(
  raw_feature_key: Option<&str>
, raw_user_input: Option<&str>
, raw_image: Option<&str>
) -> Result<GenerationRequest, Error>
{   let key = raw_feature_key
      .map(str::trim)
      .filter(|k| !k.is_empty())
      .ok_or(Error::MissingFeatureKey)?;

    let user_input = raw_user_input
      .map(str::trim)
      .filter(|u| !u.is_empty())
      .ok_or(Error::MissingUserInput)?;

    let template = prompts::resolve(key)
      .ok_or_else(|| Error::InvalidFeatureKey(key.to_string()))?;

    let image = raw_image
      .filter(|i| !i.is_empty())
      .map(ImageInput::parse);

    trace!(
      "Normalized {} -> {} (image: {})",
      key, template.key, image.is_some()
    );

    Ok(GenerationRequest
    {   feature_key: template.key.to_string()
      , system_prompt: template.system_text.to_string()
      , user_input: user_input.to_string()
      , image
    })
}

/// Validate a decoded `/generate` body. Fields that are present but
/// not strings are treated as absent.
pub fn normalize_payload(
  payload: &GeneratePayload
) -> Result<GenerationRequest, Error>
{   normalize(
      payload.feature_key.as_ref().and_then(Value::as_str)
    , payload.user_input.as_ref().and_then(Value::as_str)
    , payload.image_data.as_ref().and_then(Value::as_str)
    )
}

/// Coerce a raw chat message list.
///
/// Roles other than `assistant`/`system` become `user`; non-string
/// content is replaced by its JSON text, null content by "". An
/// absent, non-array or empty list becomes a single user greeting.
pub fn normalize_chat(raw: Option<&Value>) -> Vec<ChatMessage>
{   let items = match raw.and_then(Value::as_array)
    {   Some(items) if !items.is_empty() => items
      , _ => return vec![ChatMessage::user(DEFAULT_CHAT_OPENER)]
    };

    items.iter()
      .map(|m| {
        let role = Role::coerce(
          m.get("role").and_then(Value::as_str)
        );
        let content = match m.get("content")
        {   Some(Value::String(s)) => s.clone()
          , Some(Value::Null) | None => String::new()
          , Some(other) => other.to_string()
        };
        ChatMessage { role, content }
      })
      .collect()
}
