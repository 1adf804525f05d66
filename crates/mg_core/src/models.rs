use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Parameters sent alongside the combined rewrite payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteParams {
    pub topic: String,
    pub language: String,
    pub requested_count: u32,
}

/// Parameters sent alongside the cover composition payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeParams {
    pub topic: String,
    pub language: String,
    pub article_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub count: u32,
    pub aspect_ratio: String,
}

impl Default for ImageRequest {
    fn default() -> Self {
        Self {
            count: 1,
            aspect_ratio: "3:4".to_string(),
        }
    }
}

/// One entry of an image generation response. Entries may carry only text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Option<Vec<u8>>,
    pub mime_type: Option<String>,
    pub text: Option<String>,
}

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Rewrite every article of the combined payload in one reply.
    async fn rewrite_articles(&self, payload: &str, params: &RewriteParams) -> Result<String>;

    /// Write cover copy for the rewritten articles in the payload.
    async fn compose_cover(&self, payload: &str, params: &ComposeParams) -> Result<String>;

    /// Generate images for a prompt.
    async fn generate_images(&self, prompt: &str, request: &ImageRequest) -> Result<Vec<GeneratedImage>>;
}
