use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use mg_core::{ComposeParams, Error, GeneratedImage, ImageRequest, InferenceModel, Result, RewriteParams};

use crate::prompts::{compose_prompt, rewrite_prompt};
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    candidate_count: u32,
    image_config: ImageConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateRequest {
    fn text(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt),
                    inline_data: None,
                }],
            }],
            generation_config: None,
        }
    }

    fn image(prompt: &str, request: &ImageRequest) -> Self {
        Self {
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
                candidate_count: request.count,
                image_config: ImageConfig {
                    aspect_ratio: request.aspect_ratio.clone(),
                },
            }),
            ..Self::text(prompt.to_string())
        }
    }
}

impl GenerateResponse {
    fn text(self) -> Result<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(Error::External(anyhow::anyhow!("Gemini returned no text")));
        }
        Ok(text)
    }

    fn images(self) -> Result<Vec<GeneratedImage>> {
        let mut images = Vec::new();
        for part in self.candidates.into_iter().flat_map(|candidate| candidate.content.parts) {
            let (bytes, mime_type) = match part.inline_data {
                Some(inline) => {
                    let bytes = BASE64
                        .decode(inline.data.as_bytes())
                        .map_err(|e| Error::image_generation(format!("invalid inline image data: {}", e)))?;
                    (Some(bytes), Some(inline.mime_type))
                }
                None => (None, None),
            };
            images.push(GeneratedImage {
                bytes,
                mime_type,
                text: part.text,
            });
        }
        Ok(images)
    }
}

/// Google Gemini over the `generateContent` REST endpoint.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("Gemini API key is required".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            text_model: config.text_model.clone().unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: config.image_model.clone().unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        })
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::External(anyhow::anyhow!("Gemini returned {}: {}", status, body)));
        }
        Ok(response.json::<GenerateResponse>().await?)
    }
}

#[async_trait]
impl InferenceModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn rewrite_articles(&self, payload: &str, params: &RewriteParams) -> Result<String> {
        let request = GenerateRequest::text(rewrite_prompt(payload, params));
        self.generate(&self.text_model, &request).await?.text()
    }

    async fn compose_cover(&self, payload: &str, params: &ComposeParams) -> Result<String> {
        let request = GenerateRequest::text(compose_prompt(payload, params));
        self.generate(&self.text_model, &request).await?.text()
    }

    async fn generate_images(&self, prompt: &str, request: &ImageRequest) -> Result<Vec<GeneratedImage>> {
        let request = GenerateRequest::image(prompt, request);
        self.generate(&self.image_model, &request).await?.images()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_request_shape() {
        let request = GenerateRequest::image("a cover", &ImageRequest::default());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"parts": [{"text": "a cover"}]}],
                "generationConfig": {
                    "responseModalities": ["TEXT", "IMAGE"],
                    "candidateCount": 1,
                    "imageConfig": {"aspectRatio": "3:4"}
                }
            })
        );
    }

    #[test]
    fn test_response_parts_become_images() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": BASE64.encode(b"png-bytes")}}
                ]}
            }]
        });
        let response: GenerateResponse = serde_json::from_value(body).unwrap();
        let images = response.images().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].text.as_deref(), Some("Here you go"));
        assert!(images[0].bytes.is_none());
        assert_eq!(images[1].bytes.as_deref(), Some(&b"png-bytes"[..]));
        assert_eq!(images[1].mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_empty_text_reply_is_error() {
        let response: GenerateResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(response.text().is_err());

        let response: GenerateResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": [{"text": "NEW_TITLE: A"}]}}]}))
                .unwrap();
        assert_eq!(response.text().unwrap(), "NEW_TITLE: A");
    }

    #[test]
    fn test_requires_api_key() {
        let err = GeminiModel::new(&Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Gemini API key is required");
    }
}
