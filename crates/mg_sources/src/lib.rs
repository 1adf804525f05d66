use std::sync::Arc;
use std::time::Duration;

use mg_core::{Error, Result, SearchBackend};

pub mod exa;
pub mod fetcher;
pub mod images;

pub use exa::ExaSearch;
pub use fetcher::{source_domain, SourceArticleFetcher};
pub use images::{HttpImageFetcher, ImageSelector};

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub backend: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub image_timeout_secs: u64,
    pub image_links: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: "exa".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 60,
            image_timeout_secs: images::DEFAULT_PROBE_TIMEOUT.as_secs(),
            image_links: fetcher::IMAGE_LINKS_PER_RESULT,
        }
    }
}

pub fn create_search_backend(config: &SearchConfig) -> Result<Arc<dyn SearchBackend>> {
    match config.backend.to_lowercase().as_str() {
        "exa" => Ok(Arc::new(ExaSearch::new(config)?)),
        other => Err(Error::Config(format!("Unknown search backend: {}", other))),
    }
}

/// Wires the configured search backend and an HTTP image selector together.
pub fn create_fetcher(config: &SearchConfig) -> Result<SourceArticleFetcher> {
    let backend = create_search_backend(config)?;
    let images = HttpImageFetcher::new(Duration::from_secs(config.image_timeout_secs))?;
    Ok(SourceArticleFetcher::new(backend, ImageSelector::new(Arc::new(images)))
        .with_image_links(config.image_links))
}

pub mod prelude {
    pub use super::{create_fetcher, SearchConfig, SourceArticleFetcher};
    pub use mg_core::{Error, Result, SourceArticle};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_search_backend() {
        let config = SearchConfig {
            api_key: Some("key".to_string()),
            ..SearchConfig::default()
        };
        assert_eq!(create_search_backend(&config).unwrap().name(), "Exa");

        let unknown = SearchConfig {
            backend: "bing".to_string(),
            ..config
        };
        assert!(matches!(create_search_backend(&unknown), Err(Error::Config(_))));
    }
}
