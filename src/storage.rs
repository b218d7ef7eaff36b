//! Object storage for uploaded images (Supabase Storage REST API)

use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, error, info, trace};

use crate::config::StorageConfig;
use crate::error::Error;

/// Upload ceiling, 10 MiB
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Reject an upload before any network call
pub fn validate_upload(
  len: usize
, content_type: &str
) -> Result<(), Error>
{   if !content_type.starts_with("image/")
    {   return Err(Error::InvalidUpload(
          "Only image files are supported".to_string()
        ));
    }
    if len > MAX_UPLOAD_BYTES
    {   return Err(Error::InvalidUpload(
          "Max file size is 10MB".to_string()
        ));
    }
    if len == 0
    {   return Err(Error::InvalidUpload(
          "Uploaded file is empty".to_string()
        ));
    }
    Ok(())
}

pub fn extension_for(content_type: &str) -> &'static str
{   if content_type.contains("png")
    {   "png"
    } else if content_type.contains("jpeg") || content_type.contains("jpg")
    {   "jpg"
    } else if content_type.contains("webp")
    {   "webp"
    } else
    {   "bin"
    }
}

/// Stores a blob and returns a URL vision models can fetch
#[async_trait]
pub trait ObjectStore: Send + Sync
{   async fn store(
      &self
    , bytes: Vec<u8>
    , content_type: &str
    ) -> Result<String, Error>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketInfo
{   #[serde(default)]
    pub id: Option<String>
  , pub name: String
  , #[serde(default)]
    pub public: bool
}

#[derive(Debug, Clone, Serialize)]
struct BucketSpec<'a>
{   id: &'a str
  , name: &'a str
  , public: bool
  , #[serde(skip_serializing_if = "Option::is_none")]
    file_size_limit: Option<usize>
}

pub struct SupabaseStorage
{   http_client: reqwest::Client
  , config: StorageConfig
}

impl SupabaseStorage
{   pub fn new(
      config: StorageConfig
    , timeout_secs: u64
    ) -> Result<Self, Error>
    {   debug!("Creating SupabaseStorage for bucket {}", config.bucket);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(timeout_secs))
          .build()
          .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        Ok(SupabaseStorage { http_client, config })
    }

    fn endpoint(&self, path: &str) -> String
    {   format!("{}/storage/v1/{}", self.config.url, path)
    }

    fn authed(
      &self
    , builder: reqwest::RequestBuilder
    ) -> reqwest::RequestBuilder
    {   builder
          .header("apikey", &self.config.service_key)
          .header(
            "Authorization"
          , format!("Bearer {}", self.config.service_key)
          )
    }

    pub fn public_url(&self, key: &str) -> String
    {   self.endpoint(&format!(
          "object/public/{}/{}",
          self.config.bucket, key
        ))
    }

    async fn check(
      response: reqwest::Response
    , what: &str
    ) -> Result<reqwest::Response, Error>
    {   let status = response.status();
        trace!("{} status: {}", what, status);
        if status.is_success()
        {   return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!("{} failed ({}): {}", what, status, body);
        Err(Error::StorageError(
          format!("{} failed ({}): {}", what, status.as_u16(), body)
        ))
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, Error>
    {   let url = self.endpoint("bucket");
        let response = self.authed(self.http_client.get(url))
          .send()
          .await
          .map_err(|e| Error::StorageError(e.to_string()))?;
        Self::check(response, "Bucket listing").await?
          .json()
          .await
          .map_err(|e| Error::StorageError(e.to_string()))
    }

    /// Make sure the bucket exists and is publicly readable
    pub async fn ensure_public_bucket(&self) -> Result<(), Error>
    {   let bucket = self.config.bucket.as_str();
        let buckets = self.list_buckets().await?;

        match buckets.iter().find(|b| b.name == bucket)
        {   None => {
              info!("Creating public bucket {}", bucket);
              let spec = BucketSpec
              {   id: bucket
                , name: bucket
                , public: true
                , file_size_limit: Some(MAX_UPLOAD_BYTES)
              };
              let response = self.authed(
                  self.http_client.post(self.endpoint("bucket"))
                )
                .json(&spec)
                .send()
                .await
                .map_err(|e| Error::StorageError(e.to_string()))?;
              Self::check(response, "Bucket creation").await?;
            }
          , Some(existing) if !existing.public => {
              info!("Making bucket {} public", bucket);
              let id = existing.id.as_deref().unwrap_or(bucket);
              let spec = BucketSpec
              {   id
                , name: bucket
                , public: true
                , file_size_limit: None
              };
              let response = self.authed(
                  self.http_client.put(
                    self.endpoint(&format!("bucket/{}", id))
                  )
                )
                .json(&spec)
                .send()
                .await
                .map_err(|e| Error::StorageError(e.to_string()))?;
              Self::check(response, "Bucket update").await?;
            }
          , Some(_) => {
              trace!("Bucket {} already public", bucket);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage
{   async fn store(
      &self
    , bytes: Vec<u8>
    , content_type: &str
    ) -> Result<String, Error>
    {   validate_upload(bytes.len(), content_type)?;
        self.ensure_public_bucket().await?;

        let key = format!(
          "{}.{}",
          uuid::Uuid::new_v4(),
          extension_for(content_type)
        );
        debug!("Uploading {} bytes as {}", bytes.len(), key);

        let response = self.authed(
            self.http_client.post(self.endpoint(&format!(
              "object/{}/{}",
              self.config.bucket, key
            )))
          )
          .header("Content-Type", content_type)
          .header("x-upsert", "false")
          .body(bytes)
          .send()
          .await
          .map_err(|e| Error::StorageError(e.to_string()))?;
        Self::check(response, "Upload").await?;

        let url = self.public_url(&key);
        info!("Stored upload at {}", url);
        Ok(url)
    }
}
