use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use mg_core::{ComposeParams, Error, GeneratedImage, ImageRequest, InferenceModel, Result, RewriteParams};

use crate::prompts::{compose_prompt, rewrite_prompt};
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "deepseek-chat";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// OpenAI-compatible chat completions. Text only.
pub struct DeepSeekModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    text_model: String,
}

impl fmt::Debug for DeepSeekModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .finish()
    }
}

impl DeepSeekModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("DeepSeek API key is required".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            text_model: config.text_model.clone().unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
        })
    }

    async fn chat(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.text_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        first_choice(response)
    }
}

fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| Error::External(anyhow::anyhow!("DeepSeek returned no choices")))
}

#[async_trait]
impl InferenceModel for DeepSeekModel {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    async fn rewrite_articles(&self, payload: &str, params: &RewriteParams) -> Result<String> {
        self.chat(rewrite_prompt(payload, params)).await
    }

    async fn compose_cover(&self, payload: &str, params: &ComposeParams) -> Result<String> {
        self.chat(compose_prompt(payload, params)).await
    }

    async fn generate_images(&self, _prompt: &str, _request: &ImageRequest) -> Result<Vec<GeneratedImage>> {
        Err(Error::image_generation("DeepSeek does not generate images"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> Config {
        Config {
            model_name: "deepseek".to_string(),
            api_key: Some("test-key".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_model_requires_api_key() {
        let err = DeepSeekModel::new(&Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: DeepSeek API key is required");
        assert!(DeepSeekModel::new(&keyed()).is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = DeepSeekModel::new(&keyed()).unwrap();
        let debug = format!("{:?}", model);
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("deepseek-chat"));
    }

    #[test]
    fn test_empty_choices_is_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(first_choice(response).is_err());

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "MAIN_HEADLINE: X"}}]}"#).unwrap();
        assert_eq!(first_choice(response).unwrap(), "MAIN_HEADLINE: X");
    }

    #[tokio::test]
    async fn test_image_generation_unsupported() {
        let model = DeepSeekModel::new(&keyed()).unwrap();
        let err = model.generate_images("cover", &ImageRequest::default()).await.unwrap_err();
        assert_eq!(err.kind(), "ImageGenerationError");
    }
}
