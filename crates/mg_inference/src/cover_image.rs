use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;
use mg_core::{Error, ImageRequest, InferenceModel, Logger, Result};

/// Produces the magazine cover as a base64 PNG.
pub struct CoverImageGenerator {
    model: Arc<dyn InferenceModel>,
    request: ImageRequest,
    logger: Logger,
}

impl fmt::Debug for CoverImageGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverImageGenerator")
            .field("model", &self.model.name())
            .field("request", &self.request)
            .finish()
    }
}

impl CoverImageGenerator {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            request: ImageRequest::default(),
            logger: Logger::new().with_new_prefixes("[image]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.logger.info(&format!(
            "🖌️ Requesting cover image ({}, aspect {})",
            self.model.name(),
            self.request.aspect_ratio
        ));
        let images = self
            .model
            .generate_images(prompt, &self.request)
            .await
            .map_err(|e| Error::ImageGeneration(anyhow::Error::new(e).context("image generation request failed")))?;

        for image in &images {
            if let Some(text) = &image.text {
                self.logger.debug(&format!("Model commentary: {}", text));
            }
        }
        let bytes = images
            .into_iter()
            .find_map(|image| image.bytes)
            .ok_or_else(|| Error::image_generation("response contained no image payload"))?;

        let encoded = reencode_png(&bytes).map_err(Error::ImageGeneration)?;
        self.logger.info(&format!("✨ Cover image ready ({} base64 chars)", encoded.len()));
        Ok(encoded)
    }
}

/// Decodes any supported format and re-encodes it as base64 PNG.
pub fn reencode_png(bytes: &[u8]) -> anyhow::Result<String> {
    let decoded = image::load_from_memory(bytes).context("could not decode generated image")?;
    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, ImageFormat::Png)
        .context("could not encode cover as PNG")?;
    Ok(BASE64.encode(png.into_inner()))
}
