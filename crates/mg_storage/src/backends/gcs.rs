use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use mg_core::{Error, ObjectStorage, Result};
use reqwest::Client;
use url::Url;

pub const DEFAULT_UPLOAD_URL: &str = "https://storage.googleapis.com/upload/storage/v1";
pub const PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";

/// Google Cloud Storage through the JSON API media upload.
pub struct GcsStorage {
    client: Client,
    bucket: String,
    token: String,
    upload_url: String,
}

impl fmt::Debug for GcsStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsStorage")
            .field("bucket", &self.bucket)
            .field("token", &"<redacted>")
            .field("upload_url", &self.upload_url)
            .finish()
    }
}

impl GcsStorage {
    pub fn new(bucket: String, token: String, upload_url: Option<String>) -> Result<Self> {
        if bucket.is_empty() {
            return Err(Error::Config("GCS bucket is required".to_string()));
        }
        if token.is_empty() {
            return Err(Error::Config("GCS access token is required".to_string()));
        }
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            bucket,
            token,
            upload_url: upload_url
                .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn upload_endpoint(&self, key: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/b/{}/o", self.upload_url, self.bucket))
            .map_err(|e| Error::Config(format!("Invalid GCS upload URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        Ok(url)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", PUBLIC_BASE_URL, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for GcsStorage {
    fn name(&self) -> &str {
        "gcs"
    }

    async fn upload(&self, bytes: Vec<u8>, content_type: &str, key: &str) -> Result<String> {
        let response = self
            .client
            .post(self.upload_endpoint(key)?)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("GCS upload of {} failed with {}: {}", key, status, body)));
        }
        Ok(self.public_url(key))
    }
}
