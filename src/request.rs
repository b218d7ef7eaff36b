//! Unified request and response types for studyrouter

use serde::{Deserialize, Serialize};

/// Chat role after coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

impl Role
{   /// Anything other than `assistant` or `system` becomes `user`
    pub fn coerce(raw: Option<&str>) -> Self
    {   match raw
        {   Some("assistant") => Role::Assistant
          , Some("system") => Role::System
          , _ => Role::User
        }
    }

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Role::System => "system"
          , Role::User => "user"
          , Role::Assistant => "assistant"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatMessage { role: Role::Assistant, content: content.into() }
    }
}

/// Image attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput
{   /// `data:<mime>;base64,<payload>` carried inline
    DataUrl(String)
  , /// Fetchable remote URL
    Url(String)
}

impl ImageInput
{   pub fn parse(raw: &str) -> Self
    {   if raw.starts_with("data:")
        {   ImageInput::DataUrl(raw.to_string())
        } else
        {   ImageInput::Url(raw.to_string())
        }
    }

    /// The value sent as an `image_url` to chat-completion APIs;
    /// both data URLs and remote URLs are accepted there.
    pub fn as_url(&self) -> &str
    {   match self
        {   ImageInput::DataUrl(s) | ImageInput::Url(s) => s
        }
    }

    pub fn is_inline(&self) -> bool
    {   matches!(self, ImageInput::DataUrl(_))
    }

    /// Mime type of an inline image, sniffed from the data URL
    /// header. Unknown types fall back to `image/png`.
    pub fn mime_type(&self) -> &'static str
    {   let s = self.as_url();
        if s.contains("image/jpeg")
        {   "image/jpeg"
        } else if s.contains("image/webp")
        {   "image/webp"
        } else
        {   "image/png"
        }
    }

    /// Base64 payload of an inline image (text after the first comma)
    pub fn base64_data(&self) -> Option<&str>
    {   match self
        {   ImageInput::DataUrl(s) => s.split_once(',').map(|(_, b)| b)
          , ImageInput::Url(_) => None
        }
    }
}

/// A validated feature request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest
{   /// Canonical feature key (aliases already resolved)
    pub feature_key: String
  , /// The feature's system prompt
    pub system_prompt: String
  , /// Trimmed, non-empty user input
    pub user_input: String
  , pub image: Option<ImageInput>
}

impl GenerationRequest
{   pub fn modality(&self) -> crate::Modality
    {   if self.image.is_some()
        {   crate::Modality::Image
        } else
        {   crate::Modality::Text
        }
    }

    /// System + user messages for text-only models
    pub fn text_messages(&self) -> Vec<ChatMessage>
    {   vec![
          ChatMessage::system(self.system_prompt.trim())
        , ChatMessage::user(self.user_input.trim())
        ]
    }

    /// Vision models get one user turn carrying prompt and input;
    /// the image is attached to it by the adapter.
    pub fn vision_messages(&self) -> Vec<ChatMessage>
    {   vec![
          ChatMessage::user(format!(
            "{}\n\nUser Input:\n{}",
            self.system_prompt.trim(),
            self.user_input.trim()
          ))
        ]
    }
}

/// Successful completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion
{   /// Generated text, never empty
    pub text: String
  , /// Provider that generated it
    pub provider: crate::Provider
  , /// Model that generated it
    pub model: String
}

// ===== HTTP payloads =====

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayload
{   #[serde(default)]
    pub feature_key: Option<serde_json::Value>
  , #[serde(default)]
    pub user_input: Option<serde_json::Value>
  , #[serde(default)]
    pub image_data: Option<serde_json::Value>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse
{   pub output: String
  , pub provider: crate::Provider
  , pub model: String
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatPayload
{   #[serde(default)]
    pub messages: Option<serde_json::Value>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReplyMessage
{   pub id: String
  , pub role: Role
  , pub content: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply
{   pub message: ChatReplyMessage
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt
{   pub public_url: String
  , pub text: String
}

/// Unified error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub error: String
}
