use std::fmt;

/// Broad category of an [`Error`], used by the router to decide
/// whether to move on to the next candidate and by the HTTP layer
/// to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   Validation
  , Transport
  , Upstream
  , EmptyCompletion
  , Configuration
  , Storage
  , Exhausted
  , Internal
}

/// Custom error type for studyrouter operations
/// Implements Clone so test doubles can replay scripted failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Feature key absent or blank
    MissingFeatureKey
  , /// Feature key did not resolve to a prompt, even via alias
    InvalidFeatureKey(String)
  , /// User input absent or blank after trimming
    MissingUserInput
  , /// Request body could not be decoded
    InvalidPayload(String)
  , /// Uploaded file rejected before storage (type, size, missing)
    InvalidUpload(String)
  , /// HTTP transport error (connect, reset, TLS, ...)
    HttpError(String)
  , /// Request timed out
    Timeout
  , /// Provider answered with a non-2xx status
    ApiError
    {   status: u16
      , body: String
    }
  , /// Failed to parse API response
    ParseError(String)
  , /// Provider answered 2xx but without usable text
    EmptyCompletion
  , /// Provider cannot accept this kind of image reference
    UnsupportedImage(String)
  , /// No credentials for any provider able to serve the request
    NoProvidersConfigured(String)
  , /// API key is missing for a specific provider
    MissingApiKey(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Object storage failure
    StorageError(String)
  , /// Every candidate was tried and none produced text
    Exhausted
    {   attempts: usize
      , last: Box<Error>
    }
  , /// Generic error
    Other(String)
}

impl Error
{   pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::MissingFeatureKey
          | Error::InvalidFeatureKey(_)
          | Error::MissingUserInput
          | Error::InvalidPayload(_)
          | Error::InvalidUpload(_) => ErrorKind::Validation
          , Error::HttpError(_)
          | Error::Timeout => ErrorKind::Transport
          , Error::ApiError { .. }
          | Error::ParseError(_)
          | Error::UnsupportedImage(_) => ErrorKind::Upstream
          , Error::EmptyCompletion => ErrorKind::EmptyCompletion
          , Error::NoProvidersConfigured(_)
          | Error::MissingApiKey(_)
          | Error::InvalidConfiguration(_) => ErrorKind::Configuration
          , Error::StorageError(_) => ErrorKind::Storage
          , Error::Exhausted { .. } => ErrorKind::Exhausted
          , Error::Other(_) => ErrorKind::Internal
        }
    }

    /// HTTP status the outer surface answers with for this error
    pub fn http_status(&self) -> u16
    {   match self.kind()
        {   ErrorKind::Validation => 400
          , ErrorKind::Transport
          | ErrorKind::Upstream
          | ErrorKind::EmptyCompletion
          | ErrorKind::Exhausted => 502
          , ErrorKind::Configuration
          | ErrorKind::Storage
          | ErrorKind::Internal => 500
        }
    }

    /// Message shown to end users. Raw provider bodies stay in the
    /// logs.
    pub fn user_message(&self) -> String
    {   match self
        {   Error::Exhausted { attempts, last } => match last.kind()
            {   ErrorKind::EmptyCompletion => format!(
                  "Empty response from the AI models ({} attempts).",
                  attempts
                )
              , ErrorKind::Transport => format!(
                  "Could not reach the AI providers ({} attempts). \
                   Please try again shortly.",
                  attempts
                )
              , _ => format!(
                  "The AI providers could not process this request \
                   ({} attempts). Please try again shortly.",
                  attempts
                )
            }
          , other => other.to_string()
        }
    }

    /// True for failures the router absorbs by trying the next
    /// candidate instead of surfacing them.
    pub fn is_retryable(&self) -> bool
    {   matches!(
          self.kind()
        , ErrorKind::Transport
          | ErrorKind::Upstream
          | ErrorKind::EmptyCompletion
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingFeatureKey => {
              write!(f, "Missing featureKey")
            }
          , Error::InvalidFeatureKey(key) => {
              write!(f, "Invalid featureKey: {}", key)
            }
          , Error::MissingUserInput => {
              write!(f, "Missing userInput")
            }
          , Error::InvalidPayload(msg) => {
              write!(f, "{}", msg)
            }
          , Error::InvalidUpload(msg) => {
              write!(f, "{}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::ApiError { status, body } => {
              write!(f, "API error ({}): {}", status, body)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::EmptyCompletion => {
              write!(f, "Empty response from model")
            }
          , Error::UnsupportedImage(msg) => {
              write!(f, "Unsupported image input: {}", msg)
            }
          , Error::NoProvidersConfigured(hint) => {
              write!(f, "No AI providers configured. {}", hint)
            }
          , Error::MissingApiKey(var) => {
              write!(f, "Missing API key: set {}", var)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::StorageError(msg) => {
              write!(f, "Storage error: {}", msg)
            }
          , Error::Exhausted { attempts, last } => {
              write!(f,
                "All {} model attempts failed; last error: {}",
                attempts, last
              )
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
