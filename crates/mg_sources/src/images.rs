use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::ImageReader;
use mg_core::{Error, ImageFetcher, Logger, Result};
use reqwest::Client;

/// Images narrower or shorter than this are treated as logos.
pub const MIN_IMAGE_DIMENSION: u32 = 300;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Downloads candidate images over HTTP with a bounded timeout.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl fmt::Debug for HttpImageFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpImageFetcher")
            .field("client", &"<reqwest::Client>")
            .finish()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Decodes only the header of an encoded image to read its size.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| Error::External(e.into()))
}

/// Picks the first candidate image that is probably not a site logo.
#[derive(Debug, Clone)]
pub struct ImageSelector {
    fetcher: Arc<dyn ImageFetcher>,
    min_dimension: u32,
    logger: Logger,
}

impl ImageSelector {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            min_dimension: MIN_IMAGE_DIMENSION,
            logger: Logger::new().with_new_prefixes("[images]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_min_dimension(mut self, min_dimension: u32) -> Self {
        self.min_dimension = min_dimension;
        self
    }

    /// Any fetch or decode failure counts as a logo.
    pub async fn is_likely_logo(&self, url: &str) -> bool {
        let dimensions = match self.fetcher.fetch_image(url).await {
            Ok(bytes) => image_dimensions(&bytes),
            Err(e) => Err(e),
        };
        match dimensions {
            Ok((width, height)) => {
                self.logger.debug(&format!("{} is {}x{}", url, width, height));
                width < self.min_dimension || height < self.min_dimension
            }
            Err(e) => {
                self.logger.debug(&format!("Skipping {}: {}", url, e));
                true
            }
        }
    }

    pub async fn pick_best_image(&self, candidates: &[String], fallback: Option<&str>) -> Option<String> {
        for candidate in candidates {
            if !self.is_likely_logo(candidate).await {
                self.logger.debug(&format!("🖼️ Best image: {}", candidate));
                return Some(candidate.clone());
            }
        }
        if fallback.is_none() {
            self.logger.debug("No suitable image found");
        }
        fallback.map(str::to_string)
    }
}
