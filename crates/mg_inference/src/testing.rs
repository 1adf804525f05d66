use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use mg_core::{ComposeParams, Error, GeneratedImage, ImageRequest, InferenceModel, Result, RewriteParams};

pub fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Replays canned replies and records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    rewrite_reply: String,
    compose_reply: String,
    images: Vec<GeneratedImage>,
    fail: bool,
    pub rewrite_calls: Mutex<Vec<(String, RewriteParams)>>,
    pub compose_calls: Mutex<Vec<(String, ComposeParams)>>,
    pub image_requests: Mutex<Vec<(String, ImageRequest)>>,
}

impl ScriptedModel {
    pub fn with_rewrite(mut self, reply: &str) -> Self {
        self.rewrite_reply = reply.to_string();
        self
    }

    pub fn with_compose(mut self, reply: &str) -> Self {
        self.compose_reply = reply.to_string();
        self
    }

    pub fn with_images(mut self, images: Vec<GeneratedImage>) -> Self {
        self.images = images;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(Error::External(anyhow::anyhow!("scripted failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl InferenceModel for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn rewrite_articles(&self, payload: &str, params: &RewriteParams) -> Result<String> {
        self.rewrite_calls.lock().unwrap().push((payload.to_string(), params.clone()));
        self.check()?;
        Ok(self.rewrite_reply.clone())
    }

    async fn compose_cover(&self, payload: &str, params: &ComposeParams) -> Result<String> {
        self.compose_calls.lock().unwrap().push((payload.to_string(), params.clone()));
        self.check()?;
        Ok(self.compose_reply.clone())
    }

    async fn generate_images(&self, prompt: &str, request: &ImageRequest) -> Result<Vec<GeneratedImage>> {
        self.image_requests.lock().unwrap().push((prompt.to_string(), request.clone()));
        self.check()?;
        Ok(self.images.clone())
    }
}
