pub mod error;
pub mod config;
pub mod prompts;
pub mod providers;
pub mod request;
pub mod normalize;
pub mod failover;
pub mod storage;
pub mod client;
pub mod server;
use serde::{Deserialize, Serialize};
use std::fmt;

/*

studyrouter fronts a suite of student tools (OCR, math solving,
translation, summaries, quizzes ...) with one HTTP surface and
routes every request across hosted model providers, falling back
to the next (provider, model) pair when one fails or answers empty.

studyrouter/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Provider/Modality types and re-exports
│   ├── main.rs         # Binary: CLI, logging, serve
│   ├── error.rs        # Error taxonomy and status mapping
│   ├── config.rs       # Explicit config built once at start
│   ├── prompts.rs      # Feature key -> system prompt table
│   ├── request.rs      # Request/response value types
│   ├── normalize.rs    # Inbound payload validation
│   ├── providers/      # Provider adapters
│   │   ├── mod.rs      # CompletionProvider trait + HTTP adapter
│   │   ├── openai.rs   # Chat-completions schema (Groq, OpenRouter)
│   │   └── gemini.rs   # contents/parts schema (Google)
│   ├── failover.rs     # Candidate planning and fallback loop
│   ├── storage.rs      # Supabase object storage uploader
│   ├── client.rs       # Facade tying normalizer, router, storage
│   └── server.rs       # axum routes
└── tests/

*/

pub use client::StudyClient;
pub use config::StudyConfig;
pub use error::{Error, ErrorKind};
pub use failover::FallbackRouter;
pub use request::{
  ChatMessage, Completion, GenerationRequest, ImageInput, Role,
};

pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Hosted model providers the router knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider
{   /// Groq (Llama text and vision models, OpenAI-compatible API)
    Groq
  , /// OpenRouter (unified API over many providers)
    OpenRouter
  , /// Google AI Studio (Gemini)
    Google
}

impl Provider
{   /// Environment variable holding this provider's API key
    pub fn api_key_var(&self) -> &'static str
    {   match self
        {   Provider::Groq => "GROQ_API_KEY"
          , Provider::OpenRouter => "OPENROUTER_API_KEY"
          , Provider::Google => "GOOGLE_GENERATIVE_AI_API_KEY"
        }
    }

    /// Environment variable holding this provider's model override
    pub fn model_var(&self) -> &'static str
    {   match self
        {   Provider::Groq => "GROQ_MODEL"
          , Provider::OpenRouter => "OPENROUTER_MODEL"
          , Provider::Google => "GOOGLE_GEMINI_MODEL"
        }
    }

    pub fn default_api_base(&self) -> &'static str
    {   match self
        {   Provider::Groq => "https://api.groq.com/openai/v1"
          , Provider::OpenRouter => "https://openrouter.ai/api/v1"
          , Provider::Google
              => "https://generativelanguage.googleapis.com/v1beta"
        }
    }

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Provider::Groq => "groq"
          , Provider::OpenRouter => "openrouter"
          , Provider::Google => "google"
        }
    }
}

impl fmt::Display for Provider
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}

/// Input modality of a routed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality
{   Text
  , Image
}
