use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use studyrouter::config::StudyConfig;
use studyrouter::normalize::{normalize, normalize_chat, normalize_payload};
use studyrouter::prompts;
use studyrouter::request::GeneratePayload;
use studyrouter::{Error, ImageInput, Modality, Role};

#[test]
fn test_every_feature_key_resolves_to_itself()
{   for key in prompts::keys()
    {   let template = prompts::resolve(key)
          .unwrap_or_else(|| panic!("{} did not resolve", key));
        assert_eq!(template.key, key);
        assert!(!template.system_text.trim().is_empty());
    }
}

#[test]
fn test_aliases_resolve_case_insensitively()
{   let reader = prompts::get("aiReader").unwrap();
    for alias in ["reader", "READER", "ReadAloud", "readingassistant", "AI-Reader"]
    {   let template = prompts::resolve(alias)
          .unwrap_or_else(|| panic!("alias {} did not resolve", alias));
        assert_eq!(template, reader);
    }
}

#[test]
fn test_exact_key_wins_over_alias()
{   // readingAssistant is a prompt of its own as well as an alias
    let template = prompts::resolve("readingAssistant").unwrap();
    assert_eq!(template.key, "readingAssistant");
}

#[test]
fn test_missing_feature_key()
{   assert_eq!(
      normalize(Some(""), Some("hello"), None),
      Err(Error::MissingFeatureKey)
    );
    assert_eq!(
      normalize(None, Some("hello"), None),
      Err(Error::MissingFeatureKey)
    );
    assert_eq!(
      normalize(Some("   "), Some("hello"), None),
      Err(Error::MissingFeatureKey)
    );
}

#[test]
fn test_missing_user_input()
{   assert_eq!(
      normalize(Some("mathSolver"), Some("   "), None),
      Err(Error::MissingUserInput)
    );
    assert_eq!(
      normalize(Some("mathSolver"), None, None),
      Err(Error::MissingUserInput)
    );
}

#[test]
fn test_invalid_feature_key()
{   let err = assert_err!(normalize(Some("notAFeature"), Some("2+2"), None));
    assert_eq!(err, Error::InvalidFeatureKey("notAFeature".to_string()));
    assert_eq!(err.http_status(), 400);
}

#[test]
fn test_valid_request_is_trimmed_and_canonical()
{   let request = assert_ok!(
      normalize(Some("  reader "), Some("  some notes  "), Some(""))
    );
    assert_eq!(request.feature_key, "aiReader");
    assert_eq!(request.user_input, "some notes");
    assert_eq!(request.image, None);
    assert_eq!(request.modality(), Modality::Text);

    let messages = request.text_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[1].content, "some notes");
}

#[test]
fn test_image_detection()
{   let inline = assert_ok!(
      normalize(Some("mathSolver"), Some("solve"), Some("data:image/jpeg;base64,AAAA"))
    );
    assert_eq!(inline.modality(), Modality::Image);
    let image = inline.image.as_ref().unwrap();
    assert!(image.is_inline());
    assert_eq!(image.mime_type(), "image/jpeg");
    assert_eq!(image.base64_data(), Some("AAAA"));

    let remote = assert_ok!(
      normalize(Some("mathSolver"), Some("solve"), Some("https://cdn.example/x.png"))
    );
    assert_eq!(
      remote.image,
      Some(ImageInput::Url("https://cdn.example/x.png".to_string()))
    );

    let vision = inline.vision_messages();
    assert_eq!(vision.len(), 1);
    assert!(vision[0].content.ends_with("User Input:\nsolve"));
}

#[test]
fn test_payload_with_non_string_fields()
{   let payload: GeneratePayload = serde_json::from_value(json!({
      "featureKey": 42,
      "userInput": "hi",
    })).unwrap();
    assert_eq!(normalize_payload(&payload), Err(Error::MissingFeatureKey));

    let payload: GeneratePayload = serde_json::from_value(json!({
      "featureKey": "translator",
      "userInput": "hola",
      "imageData": null,
    })).unwrap();
    let request = assert_ok!(normalize_payload(&payload));
    assert!(request.image.is_none());
}

#[test]
fn test_chat_role_coercion()
{   let raw = json!([
      { "role": "system", "content": "be brief" },
      { "role": "assistant", "content": "hi" },
      { "role": "tool", "content": "x" },
      { "content": { "a": 1 } },
    ]);
    let messages = normalize_chat(Some(&raw));
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
      roles,
      vec![Role::System, Role::Assistant, Role::User, Role::User]
    );
    assert_eq!(messages[3].content, r#"{"a":1}"#);
}

#[test]
fn test_empty_chat_gets_greeting()
{   for raw in [None, Some(json!([])), Some(json!("nope"))]
    {   let messages = normalize_chat(raw.as_ref());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Hello!");
    }
}

#[test]
fn test_config_from_lookup()
{   let config = StudyConfig::from_lookup(|name| match name
    {   "GROQ_API_KEY" => Some("gsk_abc".to_string())
      , "GROQ_MODEL" => Some("  ".to_string())
      , "OPENROUTER_API_KEY" => Some("".to_string())
      , "SUPABASE_URL" => Some("https://proj.supabase.co/".to_string())
      , "SUPABASE_SERVICE_ROLE_KEY" => Some("service".to_string())
      , "STUDYROUTER_TIMEOUT_SECS" => Some("abc".to_string())
      , _ => None
    });
    assert!(config.providers.groq.is_configured());
    assert_eq!(config.providers.groq.model, None);
    assert!(!config.providers.openrouter.is_configured());
    assert!(!config.providers.google.is_configured());
    assert_eq!(config.timeout_secs, 30);

    let storage = config.storage.as_ref().unwrap();
    assert_eq!(storage.url, "https://proj.supabase.co");
    assert_eq!(storage.bucket, "handwriting");

    let status = config.credential_status();
    assert!(status.contains(&("GROQ_API_KEY", true)));
    assert!(status.contains(&("OPENROUTER_API_KEY", false)));
}

#[test]
fn test_half_configured_storage_is_disabled()
{   let config = StudyConfig::from_lookup(|name| match name
    {   "SUPABASE_URL" => Some("https://proj.supabase.co".to_string())
      , _ => None
    });
    assert!(config.storage.is_none());
}

#[test]
fn test_storage_bucket_override()
{   let config = StudyConfig::from_lookup(|name| match name
    {   "SUPABASE_URL" => Some("https://proj.supabase.co".to_string())
      , "SUPABASE_SERVICE_ROLE_KEY" => Some("service".to_string())
      , "SUPABASE_BUCKET" => Some("scans".to_string())
      , _ => None
    });
    assert_eq!(config.storage.unwrap().bucket, "scans");
}

#[test]
fn test_error_status_mapping()
{   assert_eq!(Error::MissingFeatureKey.http_status(), 400);
    assert_eq!(Error::NoProvidersConfigured("x".into()).http_status(), 500);
    let exhausted = Error::Exhausted
    {   attempts: 2
      , last: Box::new(Error::EmptyCompletion)
    };
    assert_eq!(exhausted.http_status(), 502);
    assert!(exhausted.user_message().contains("Empty response"));
}
